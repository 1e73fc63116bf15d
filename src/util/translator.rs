use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Per-batch pacing choices, in milliseconds.
const INTERVALS_MS: [u64; 5] = [100, 300, 500, 700, 1000];

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, dest: &str) -> Result<String>;
}

pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            endpoint: ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, dest: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        // Summaries can outgrow the URL limit, so the text goes in the body.
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", dest), ("dt", "t")])
            .form(&[("q", text)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("translation service returned HTTP {}", response.status()));
        }

        let body: Value = response.json().await?;
        sentences(&body)
    }
}

/// The response is `[[["translated", "original", ...], ...], ...]`.
fn sentences(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("unexpected translation response shape"))?;

    Ok(segments
        .iter()
        .filter_map(|s| s.get(0).and_then(Value::as_str))
        .collect())
}

pub fn pick_interval() -> Duration {
    let ms = INTERVALS_MS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(INTERVALS_MS[0]);
    Duration::from_millis(ms)
}

/// Translates each `(id, text)` pair in order, sleeping `interval` after every
/// call. The first error aborts the batch.
pub async fn translate_all(
    translator: &dyn Translator,
    texts: &[(String, String)],
    dest: &str,
    interval: Duration,
) -> Result<IndexMap<String, String>> {
    let mut translated = IndexMap::with_capacity(texts.len());

    for (id, text) in texts {
        let result = translator.translate(text, dest).await?;
        debug!("Translated {} ({} chars)", id, result.len());
        translated.insert(id.clone(), result);
        tokio::time::sleep(interval).await;
    }

    Ok(translated)
}
