use scraper::{Html, Selector};

use crate::data::models::{Anchor, ParsedSummary};

/// Best-effort markup removal. html5ever recovers from any input, so
/// malformed markup still yields whatever text could be extracted.
pub fn strip(html: &str) -> ParsedSummary {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<String>();

    let anchors = match Selector::parse("a") {
        Ok(selector) => fragment
            .select(&selector)
            .map(|a| Anchor {
                href: a.value().attr("href").map(str::to_string),
                text: a.text().collect(),
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    ParsedSummary { text, anchors }
}
