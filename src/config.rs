use std::{io::ErrorKind, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_FEED_URL: &str = "https://aws.amazon.com/about-aws/whats-new/recent/feed/";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub region: String,
    pub bucket: String,
    pub key_prefix: String,
    pub url_expires_in_secs: u64,
    pub email_from: String,
    pub email_to: Vec<String>,
    pub target_lang: String,
    pub dry_run: bool,
    /// Provisioned alongside the job but not read or written by it.
    pub cache_endpoint: Option<String>,
    pub feed_url: String,
    pub schedule: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            bucket: "your-bucket-name".to_string(),
            key_prefix: "whats-new".to_string(),
            url_expires_in_secs: 86400 * 7,
            email_from: "your-sender-email-addr".to_string(),
            email_to: recipients("your-receiver-email-addr-list"),
            target_lang: "ko".to_string(),
            dry_run: true,
            cache_endpoint: None,
            feed_url: DEFAULT_FEED_URL.to_string(),
            schedule: "0 0 * * * *".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `config.toml` if present, then environment variables.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("REGION_NAME") {
            self.region = v;
        }
        if let Some(v) = lookup("S3_BUCKET_NAME") {
            self.bucket = v;
        }
        if let Some(v) = lookup("S3_OBJ_KEY_PREFIX") {
            self.key_prefix = v;
        }
        if let Some(v) = lookup("PRESIGNED_URL_EXPIRES_IN") {
            self.url_expires_in_secs = v
                .trim()
                .parse()
                .with_context(|| format!("PRESIGNED_URL_EXPIRES_IN is not a number: {v}"))?;
        }
        if let Some(v) = lookup("EMAIL_FROM_ADDRESS") {
            self.email_from = v;
        }
        if let Some(v) = lookup("EMAIL_TO_ADDRESSES") {
            self.email_to = recipients(&v);
        }
        if let Some(v) = lookup("TRANS_DEST_LANG") {
            self.target_lang = v;
        }
        if let Some(v) = lookup("DRY_RUN") {
            self.dry_run = v == "true";
        }
        if let Some(v) = lookup("CACHE_ENDPOINT") {
            self.cache_endpoint = Some(v);
        }
        if let Some(v) = lookup("FEED_URL") {
            self.feed_url = v;
        }
        if let Some(v) = lookup("SCHEDULE_CRON") {
            self.schedule = v;
        }
        Ok(())
    }

    pub fn url_expires_in(&self) -> Duration {
        Duration::from_secs(self.url_expires_in_secs)
    }
}

fn recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
