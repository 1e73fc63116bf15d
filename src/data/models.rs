use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub href: Option<String>,
    pub text: String,
}

/// Plain text of a summary plus the anchors found in its markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSummary {
    pub text: String,
    pub anchors: Vec<Anchor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceField {
    Title,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedText {
    pub field: SourceField,
    pub text: String,
    pub lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub link: String,
    pub title: String,
    pub summary: String,
    pub published: DateTime<Utc>,
    pub tags: Vec<String>,
    pub summary_parsed: ParsedSummary,
    pub title_trans: Option<TranslatedText>,
    pub summary_trans: Option<TranslatedText>,
}

impl FeedEntry {
    pub fn translated_title(&self) -> &str {
        self.title_trans.as_ref().map_or("", |t| t.text.as_str())
    }

    pub fn translated_summary(&self) -> &str {
        self.summary_trans.as_ref().map_or("", |t| t.text.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSnapshot {
    entries: Vec<FeedEntry>,
    pub updated: DateTime<Utc>,
}

impl FeedSnapshot {
    pub fn new(entries: Vec<FeedEntry>, updated: DateTime<Utc>) -> Self {
        Self { entries, updated }
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [FeedEntry] {
        &mut self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn last_updated(&self) -> String {
        self.updated.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Payload of a scheduled trigger. Accepted and logged, never branched on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "detail-type", default)]
    pub detail_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ScheduledEvent {
    pub fn now(region: &str) -> Self {
        Self {
            id: String::new(),
            detail_type: "Scheduled Event".to_string(),
            source: "feedtrans.scheduler".to_string(),
            account: String::new(),
            time: Utc::now().format("%Y-%m-%dT%H:00:00").to_string(),
            region: region.to_string(),
            resources: Vec::new(),
            detail: serde_json::json!({}),
        }
    }
}
