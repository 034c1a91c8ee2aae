//! "On this page" entries from a rendered lesson body.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// One heading of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    pub id: String,
    pub text: String,
    /// 2 or 3.
    pub level: u8,
}

/// Collect `h2`/`h3` headings in document order.
///
/// A heading without its own `id` gets one derived from its text.
/// Headings with no text are skipped.
pub fn extract_toc(html: &str) -> Vec<TocItem> {
    static HEADINGS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2, h3").expect("valid selector"));

    let doc = Html::parse_fragment(html);
    doc.select(&HEADINGS)
        .filter_map(|el| {
            let text = heading_text(el);
            if text.is_empty() {
                return None;
            }
            let id = heading_anchor(el)?;
            let level = if el.value().name() == "h2" { 2 } else { 3 };
            Some(TocItem { id, text, level })
        })
        .collect()
}

fn heading_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

/// Anchor of a heading element: its own non-blank `id`, else one derived
/// from its text. `None` for a heading with neither.
pub(crate) fn heading_anchor(el: ElementRef<'_>) -> Option<String> {
    if let Some(id) = el.value().attr("id").map(str::trim).filter(|id| !id.is_empty()) {
        return Some(id.to_owned());
    }
    let text = heading_text(el);
    (!text.is_empty()).then(|| heading_id(&text))
}

/// Anchor for a heading: lowercased, trimmed, whitespace runs as `-`.
pub fn heading_id(text: &str) -> String {
    static WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS.replace_all(text.trim(), "-").to_lowercase()
}
