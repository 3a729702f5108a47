// ABOUTME: Turns runs of <br> tags into paragraphs and renames stray html/body wrappers to div.
// ABOUTME: Works on serialized markup so it can run after the cleaner's final write.

use once_cell::sync::Lazy;
use regex::Regex;

static BR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:<br\s*/?>\s*){2,}").unwrap());
static BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<(p|div|article|section|h[1-6]|ul|ol|blockquote|pre|table|figure)\b")
        .unwrap()
});
static TOP_LEVEL_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)(?:html|body)\b").unwrap());

/// Splits on two or more consecutive `<br>`s, wrapping each inline segment
/// in `<p>`. Segments that already start with a block element are kept as is.
pub fn brs_to_ps(html: &str) -> String {
    if !BR_RUN.is_match(html) {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    for segment in BR_RUN.split(html) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if BLOCK_START.is_match(segment) {
            out.push_str(segment);
        } else {
            out.push_str("<p>");
            out.push_str(segment);
            out.push_str("</p>");
        }
    }
    out
}

/// Renames `<html>` and `<body>` tags to `<div>`.
pub fn rewrite_top_level(html: &str) -> String {
    TOP_LEVEL_TAG.replace_all(html, "<${1}div").into_owned()
}
