use crate::data::models::{FeedEntry, FeedSnapshot, TIMESTAMP_FORMAT};

const STYLE: &str = r#"table {
  font-family: arial, sans-serif;
  border-collapse: collapse;
  width: 100%;
}

td, th {
  border: 1px solid #dddddd;
  text-align: left;
  padding: 8px;
}

tr:nth-child(even) {
  background-color: #dddddd;
}"#;

/// Renders one table row per entry, in snapshot order. Missing translations
/// render as empty cells.
pub fn render(snapshot: &FeedSnapshot, default_lang: &str) -> String {
    let lang = snapshot
        .entries()
        .iter()
        .find_map(|e| e.title_trans.as_ref().or(e.summary_trans.as_ref()))
        .map_or(default_lang, |t| t.lang.as_str());

    let rows = snapshot
        .entries()
        .iter()
        .map(row)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
{style}
</style>
</head>
<body>

<h2>Recent Announcements ({last_updated})</h2>

<table>
  <tr>
    <th>doc_id</th>
    <th>link</th>
    <th>pub_date</th>
    <th>title</th>
    <th>summary</th>
    <th>title_{lang}</th>
    <th>summary_{lang}</th>
    <th>tags</th>
  </tr>
{rows}
</table>

</body>
</html>"#,
        style = STYLE,
        last_updated = snapshot.last_updated(),
        lang = escape(lang),
        rows = rows,
    )
}

fn row(entry: &FeedEntry) -> String {
    format!(
        r#"  <tr>
    <td>{id}</td>
    <td>{link}</td>
    <td>{pub_date}</td>
    <td>{title}</td>
    <td>{summary}</td>
    <td>{title_trans}</td>
    <td>{summary_trans}</td>
    <td>{tags}</td>
  </tr>"#,
        id = escape(&entry.id),
        link = escape(&entry.link),
        pub_date = entry.published.format(TIMESTAMP_FORMAT),
        title = escape(&entry.title),
        summary = escape(&entry.summary_parsed.text),
        title_trans = escape(entry.translated_title()),
        summary_trans = escape(entry.translated_summary()),
        tags = escape(&entry.tags.join(",")),
    )
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
