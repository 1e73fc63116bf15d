pub mod models;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use object_store::{
    ObjectStore, PutPayload,
    aws::{AmazonS3, AmazonS3Builder},
    path::Path,
    signer::Signer,
};
use reqwest::Method;
use tracing::{error, warn};
use url::Url;

use crate::config::Config;

/// `{prefix}-html/anncmt-{YYYYMMDDHH}.html`; runs within the same hour share a key.
pub fn report_key(prefix: &str, updated: DateTime<Utc>) -> String {
    format!("{}-html/anncmt-{}.html", prefix, updated.format("%Y%m%d%H"))
}

#[async_trait]
pub trait LinkSigner: Send + Sync {
    async fn sign(&self, key: &Path, expires_in: Duration) -> Result<Url>;
}

#[async_trait]
impl LinkSigner for AmazonS3 {
    async fn sign(&self, key: &Path, expires_in: Duration) -> Result<Url> {
        Ok(self.signed_url(Method::GET, key, expires_in).await?)
    }
}

pub struct Storage {
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn LinkSigner>,
    bucket: String,
}

impl Storage {
    pub fn new(store: Arc<dyn ObjectStore>, signer: Arc<dyn LinkSigner>, bucket: &str) -> Self {
        Self {
            store,
            signer,
            bucket: bucket.to_string(),
        }
    }

    /// S3 bucket from the config; credentials come from the usual AWS environment.
    pub fn s3(config: &Config) -> Result<Self> {
        let s3 = Arc::new(
            AmazonS3Builder::from_env()
                .with_region(&config.region)
                .with_bucket_name(&config.bucket)
                .build()?,
        );
        Ok(Self::new(s3.clone(), s3, &config.bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Single put of the UTF-8 document. Failures are logged and reported as `false`.
    pub async fn write(&self, key: &str, doc: &str) -> bool {
        let payload = PutPayload::from(doc.as_bytes().to_vec());
        match self.store.put(&Path::from(key), payload).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to write s3://{}/{}: {}", self.bucket, key, e);
                false
            }
        }
    }

    /// Lines of a UTF-8 object. Missing, empty or unreadable objects yield no lines.
    pub async fn read_lines(&self, key: &str) -> Vec<String> {
        let bytes = match self.store.get(&Path::from(key)).await {
            Ok(result) => match result.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to read body of s3://{}/{}: {}", self.bucket, key, e);
                    return Vec::new();
                }
            },
            Err(e) => {
                warn!("Failed to get s3://{}/{}: {}", self.bucket, key, e);
                return Vec::new();
            }
        };

        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Time-limited GET link. Signing errors are logged and yield `None`.
    pub async fn presign(&self, key: &str, expires_in: Duration) -> Option<Url> {
        match self.signer.sign(&Path::from(key), expires_in).await {
            Ok(url) => Some(url),
            Err(e) => {
                error!("Failed to sign s3://{}/{}: {:?}", self.bucket, key, e);
                None
            }
        }
    }
}
