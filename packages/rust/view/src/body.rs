//! Lesson and objective bodies: rich text versus plain text.
//!
//! CMS rich text is untrusted. Anything that looks like HTML goes through a
//! [`Sanitizer`] before it is handed to a renderer.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde::Serialize;

use crate::toc::heading_anchor;

/// True when `text` contains something shaped like an HTML tag.
pub fn looks_like_html(text: &str) -> bool {
    static TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</?[a-z][\s\S]*>").expect("valid regex"));

    TAG.is_match(text)
}

/// Turns untrusted HTML into markup that is safe to display.
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// Drops all markup and keeps the text, escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOnly;

impl Sanitizer for TextOnly {
    fn sanitize(&self, html: &str) -> String {
        let doc = Html::parse_fragment(html);
        escape(&doc.root_element().text().collect::<String>())
    }
}

/// Keeps a fixed set of formatting tags and attributes, drops the rest.
///
/// Disallowed elements are unwrapped (their children survive) except for
/// script-like elements, which are removed with their content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allowlist;

const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i",
    "img", "li", "ol", "p", "pre", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead",
    "tr", "u", "ul",
];

const DROPPED_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed", "noscript", "template"];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const ALLOWED_ATTRS: &[&str] = &["id", "href", "src", "alt", "title", "colspan", "rowspan"];

impl Sanitizer for Allowlist {
    fn sanitize(&self, html: &str) -> String {
        let doc = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        write_children(doc.root_element(), &mut out);
        out
    }
}

fn write_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape(text)),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    if DROPPED_TAGS.contains(&name) {
        return;
    }
    if !ALLOWED_TAGS.contains(&name) {
        write_children(el, out);
        return;
    }

    // Headings always carry the anchor the table of contents links to.
    let anchor = match name {
        "h2" | "h3" => heading_anchor(el),
        _ => None,
    };

    out.push('<');
    out.push_str(name);
    // Allowlist order, so output does not depend on attribute storage.
    for &attr in ALLOWED_ATTRS {
        let value = match (attr, anchor.as_deref()) {
            ("id", Some(anchor)) => Some(anchor),
            _ => el.value().attr(attr),
        };
        let Some(value) = value else {
            continue;
        };
        if !safe_attr_value(attr, value) {
            continue;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }
    write_children(el, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn safe_attr_value(attr: &str, value: &str) -> bool {
    if attr != "href" && attr != "src" {
        return true;
    }
    let scheme: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(11)
        .collect::<String>()
        .to_ascii_lowercase();
    !(scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") || scheme.starts_with("data:"))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// A body ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RenderedBody {
    /// Sanitized markup.
    Html(String),
    /// Text shown as-is, line breaks preserved.
    Plain(String),
}

impl RenderedBody {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Html(s) | Self::Plain(s) => s,
        }
    }
}

/// Classify `text` and sanitize it when it carries markup. Blank input is `None`.
pub fn render_body(text: &str, sanitizer: &impl Sanitizer) -> Option<RenderedBody> {
    if text.trim().is_empty() {
        return None;
    }
    Some(if looks_like_html(text) {
        RenderedBody::Html(sanitizer.sanitize(text))
    } else {
        RenderedBody::Plain(text.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::extract_toc;

    #[test]
    fn detects_tags() {
        assert!(looks_like_html("<p>hi</p>"));
        assert!(looks_like_html("before <BR> after"));
        assert!(looks_like_html("</div>"));
        assert!(!looks_like_html("a < b and c > d"));
        assert!(!looks_like_html("x <3 y"));
        assert!(!looks_like_html("plain text"));
    }

    #[test]
    fn plain_text_passes_through() {
        let body = render_body("line one\nline two", &Allowlist).unwrap();
        assert_eq!(body, RenderedBody::Plain("line one\nline two".into()));
    }

    #[test]
    fn blank_is_none() {
        assert!(render_body("   \n", &Allowlist).is_none());
    }

    #[test]
    fn allowlist_strips_scripts_and_handlers() {
        let html = r#"<p onclick="evil()">Hi <script>alert(1)</script><b>there</b></p>"#;
        let body = render_body(html, &Allowlist).unwrap();
        assert_eq!(body, RenderedBody::Html("<p>Hi <b>there</b></p>".into()));
    }

    #[test]
    fn allowlist_unwraps_unknown_tags() {
        let out = Allowlist.sanitize(r#"<div class="x"><span>kept</span> text</div>"#);
        assert_eq!(out, "kept text");
    }

    #[test]
    fn allowlist_filters_link_schemes() {
        let out = Allowlist.sanitize(r#"<a href="javascript:alert(1)">x</a><a href="/ok">y</a>"#);
        assert_eq!(out, r#"<a>x</a><a href="/ok">y</a>"#);
    }

    #[test]
    fn allowlist_keeps_heading_ids() {
        let out = Allowlist.sanitize(r#"<h2 id="intro">Intro</h2><br><img src="/a.png" alt="A">"#);
        assert_eq!(out, r#"<h2 id="intro">Intro</h2><br><img src="/a.png" alt="A">"#);
    }

    #[test]
    fn allowlist_anchors_headings_without_ids() {
        let out = Allowlist.sanitize("<h2>Isolate the  body</h2><h3 id=\" \">Sign conventions</h3><h4>Deep</h4>");
        assert_eq!(
            out,
            r#"<h2 id="isolate-the-body">Isolate the  body</h2><h3 id="sign-conventions">Sign conventions</h3><h4>Deep</h4>"#
        );
    }

    #[test]
    fn every_toc_entry_has_a_target_in_the_body() {
        let html = "<h2>Isolate the body</h2><p>x</p><h3>Sign conventions</h3><h2 id=\"given\">Given data</h2>";
        let Some(RenderedBody::Html(body)) = render_body(html, &Allowlist) else {
            panic!("expected an html body");
        };

        let toc = extract_toc(&body);
        assert_eq!(toc.len(), 3);
        for item in &toc {
            assert!(
                body.contains(&format!("id=\"{}\"", item.id)),
                "#{} has no target in {body}",
                item.id
            );
        }
        assert_eq!(toc[2].id, "given");
    }

    #[test]
    fn text_only_escapes() {
        assert_eq!(TextOnly.sanitize("<p>a &amp; b</p><i>c</i>"), "a &amp; bc");
    }
}
