use std::{sync::Arc, time::Instant};

use anyhow::Result;
use reqwest::Client;
use tracing::{error, info};
use url::Url;

use crate::{
    config::Config,
    data::{
        Storage,
        models::{FeedSnapshot, ScheduledEvent, SourceField, TranslatedText},
        report_key,
    },
    util::{
        fetcher,
        mailer::{Notifier, download_email},
        renderer,
        translator::{Translator, pick_interval, translate_all},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub count: usize,
    pub key: String,
    pub stored: bool,
    pub url: Option<Url>,
    pub notified: bool,
}

pub struct Pipeline {
    config: Arc<Config>,
    client: Client,
    translator: Arc<dyn Translator>,
    storage: Storage,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        client: Client,
        translator: Arc<dyn Translator>,
        storage: Storage,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            client,
            translator,
            storage,
            notifier,
        }
    }

    /// One scheduled invocation. Stops before translating if the feed can't be fetched.
    pub async fn run(&self, event: &ScheduledEvent) -> Result<Outcome> {
        let started = Instant::now();
        info!(
            "Invoked by {} event at {} ({})",
            event.source, event.time, event.detail_type
        );
        info!("start to get rss feed");

        let snapshot = match fetcher::snapshot(&self.client, &self.config.feed_url).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to fetch {}: {}", self.config.feed_url, e);
                return Err(e.into());
            }
        };

        let outcome = self.publish(snapshot).await?;
        info!(
            "Published {} entries to {} (stored={}, notified={})",
            outcome.count, outcome.key, outcome.stored, outcome.notified
        );

        info!("end");
        info!("run_time: {:.2}", started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    /// Everything after the fetch: translate, render, store, sign, notify.
    pub async fn publish(&self, mut snapshot: FeedSnapshot) -> Result<Outcome> {
        let config = &self.config;
        info!(
            "rss_feed: count={}, last_updated=\"{}\"",
            snapshot.count(),
            snapshot.last_updated()
        );

        info!("translate rss feed");
        let lang = config.target_lang.as_str();
        let titles: Vec<_> = snapshot
            .entries()
            .iter()
            .map(|e| (e.id.clone(), e.title.clone()))
            .collect();
        let title_trans = translate_all(&*self.translator, &titles, lang, pick_interval()).await?;

        let summaries: Vec<_> = snapshot
            .entries()
            .iter()
            .map(|e| (e.id.clone(), e.summary_parsed.text.clone()))
            .collect();
        let summary_trans =
            translate_all(&*self.translator, &summaries, lang, pick_interval()).await?;

        info!("add translated rss feed");
        for entry in snapshot.entries_mut() {
            entry.title_trans = Some(TranslatedText {
                field: SourceField::Title,
                text: title_trans.get(&entry.id).cloned().unwrap_or_default(),
                lang: lang.to_string(),
            });
            entry.summary_trans = Some(TranslatedText {
                field: SourceField::Summary,
                text: summary_trans.get(&entry.id).cloned().unwrap_or_default(),
                lang: lang.to_string(),
            });
        }

        let html = renderer::render(&snapshot, lang);

        info!("save translated rss feed in S3");
        let key = report_key(&config.key_prefix, snapshot.updated);
        let stored = self.storage.write(&key, &html).await;
        if stored {
            info!("Stored s3://{}/{}", self.storage.bucket(), key);
        }

        info!("send translated rss feed by email");
        let url = self.storage.presign(&key, config.url_expires_in()).await;

        let notified = match &url {
            Some(url) if config.dry_run => {
                info!("download-url: {}", url);
                false
            }
            Some(url) => {
                let email = download_email(&config.email_from, &config.email_to, url.as_str());
                self.notifier.send(&email).await?;
                info!("Sent download link to {} recipients", email.to.len());
                true
            }
            None => false,
        };

        Ok(Outcome {
            count: snapshot.count(),
            key,
            stored,
            url,
            notified,
        })
    }
}
