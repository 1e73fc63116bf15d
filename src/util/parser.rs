use chrono::{DateTime, Utc};
use feed_rs::{model, parser};

use crate::{
    data::models::{FeedEntry, FeedSnapshot},
    error::FeedError,
    util::stripper,
};

pub fn parse(content: &str) -> Result<FeedSnapshot, FeedError> {
    let feed = parser::parse(content.as_bytes()).map_err(|e| FeedError::Parse(e.to_string()))?;
    Ok(snapshot(feed))
}

fn snapshot(feed: model::Feed) -> FeedSnapshot {
    let updated = feed
        .updated
        .or(feed.published)
        .or_else(|| {
            feed.entries
                .iter()
                .filter_map(|e| e.published.or(e.updated))
                .max()
        })
        .unwrap_or_else(Utc::now);

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| convert(entry, updated))
        .collect();

    FeedSnapshot::new(entries, updated)
}

fn convert(entry: model::Entry, fallback: DateTime<Utc>) -> FeedEntry {
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    let tags = entry.categories.into_iter().map(|c| c.term).collect();
    let summary_parsed = stripper::strip(&summary);

    FeedEntry {
        id: entry.id,
        link,
        title,
        summary,
        published: entry.published.or(entry.updated).unwrap_or(fallback),
        tags,
        summary_parsed,
        title_trans: None,
        summary_trans: None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    pub(crate) const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Recent Announcements</title>
    <link>https://example.com/whats-new/</link>
    <description>Latest announcements</description>
    <lastBuildDate>Tue, 05 Mar 2024 14:00:00 GMT</lastBuildDate>
    <item>
      <guid isPermaLink="false">a</guid>
      <title>hello</title>
      <link>https://example.com/a</link>
      <description>&lt;p&gt;world&lt;/p&gt;</description>
      <pubDate>Tue, 05 Mar 2024 13:30:00 GMT</pubDate>
      <category>general:products/compute</category>
      <category>marketing:whats-new</category>
    </item>
    <item>
      <guid isPermaLink="false">b</guid>
      <title>world</title>
      <link>https://example.com/b</link>
      <description>&lt;a href="https://example.com/docs"&gt;hello&lt;/a&gt;</description>
      <pubDate>Mon, 04 Mar 2024 09:15:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_entries_in_feed_order() {
        let snapshot = parse(SAMPLE_FEED).unwrap();

        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.count(), snapshot.entries().len());

        let ids: Vec<_> = snapshot.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn extracts_bounded_fields() {
        let snapshot = parse(SAMPLE_FEED).unwrap();
        let first = &snapshot.entries()[0];

        assert_eq!(first.link, "https://example.com/a");
        assert_eq!(first.title, "hello");
        assert_eq!(first.summary, "<p>world</p>");
        assert_eq!(first.summary_parsed.text, "world");
        assert_eq!(
            first.tags,
            vec!["general:products/compute", "marketing:whats-new"]
        );
        assert_eq!(
            first.published,
            Utc.with_ymd_and_hms(2024, 3, 5, 13, 30, 0).unwrap()
        );

        let second = &snapshot.entries()[1];
        assert!(second.tags.is_empty());
        assert_eq!(second.summary_parsed.anchors.len(), 1);
    }

    #[test]
    fn uses_last_build_date_as_last_updated() {
        let snapshot = parse(SAMPLE_FEED).unwrap();
        assert_eq!(snapshot.last_updated(), "2024-03-05T14:00:00");
    }

    #[test]
    fn falls_back_to_newest_entry_date() {
        let feed = SAMPLE_FEED.replace(
            "<lastBuildDate>Tue, 05 Mar 2024 14:00:00 GMT</lastBuildDate>",
            "",
        );
        let snapshot = parse(&feed).unwrap();
        assert_eq!(snapshot.last_updated(), "2024-03-05T13:30:00");
    }

    #[test]
    fn empty_channel_has_zero_entries() {
        let feed = r#"<rss version="2.0"><channel><title>t</title>
            <lastBuildDate>Tue, 05 Mar 2024 14:00:00 GMT</lastBuildDate></channel></rss>"#;
        let snapshot = parse(feed).unwrap();
        assert_eq!(snapshot.count(), 0);
    }

    #[test]
    fn rejects_non_feed_documents() {
        assert!(matches!(
            parse("<html><body>not a feed</body></html>"),
            Err(FeedError::Parse(_))
        ));
    }
}
