// ABOUTME: Generic full-page article extraction used when a site config does not say where things are.
// ABOUTME: Produces title, byline, date, cleaned content, sanitized content and plain-text paragraphs.

//! Readability fallback.
//!
//! [`parse_to_article`] scores the page for its main content block, cleans
//! it, and reads title, byline and date from the usual metadata locations.
//! It never fails: missing pieces are `None`, and an empty page yields
//! all-`None` output.

pub mod brs;
pub mod cleaners;
pub mod scoring;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use crate::extractors::datetime;
use crate::extractors::postprocess::{simplify_byline, simplify_title};
use crate::result::Paragraph;

/// Markup standing in for a page without an article body.
pub const EMPTY_CONTENT: &str = "<div></div>";

/// Where a metadata value is read from: a selector and the attribute to
/// read, or its text when no attribute is given.
type Sources = Vec<(Selector, Option<&'static str>)>;

fn sources(list: &[(&str, Option<&'static str>)]) -> Sources {
    list.iter()
        .map(|(css, attr)| (Selector::parse(css).unwrap(), *attr))
        .collect()
}

static TITLE_SOURCES: Lazy<Sources> = Lazy::new(|| {
    sources(&[
        (r#"meta[property="og:title"]"#, Some("content")),
        (r#"meta[name="twitter:title"]"#, Some("content")),
        ("title", None),
        ("h1.entry-title", None),
        ("h1", None),
    ])
});

static BYLINE_SOURCES: Lazy<Sources> = Lazy::new(|| {
    sources(&[
        (r#"meta[name="author"]"#, Some("content")),
        (r#"meta[property="article:author"]"#, Some("content")),
        (r#"meta[itemprop="author"]"#, Some("content")),
        (r#"[itemprop="author"]"#, None),
        (".byline", None),
        (r#"a[rel="author"]"#, None),
        (".author", None),
    ])
});

static DATE_SOURCES: Lazy<Sources> = Lazy::new(|| {
    sources(&[
        (r#"meta[property="article:published_time"]"#, Some("content")),
        (r#"meta[itemprop="datePublished"]"#, Some("content")),
        (r#"meta[name="date"]"#, Some("content")),
        ("time[datetime]", Some("datetime")),
        ("time", None),
    ])
});

static TEXT_BLOCKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, li, h1, h2, h3, h4, h5, h6, blockquote, pre, td, th, dt, dd, figcaption")
        .unwrap()
});
static MEDIA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img, picture, video, audio, iframe").unwrap());

const PLAIN_TAGS: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
    "li", "blockquote", "pre", "code", "img", "a", "div", "table", "thead", "tbody", "tr", "td",
    "th", "figure", "figcaption", "dl", "dt", "dd",
];

/// The fallback's view of a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadabilityArticle {
    pub title: Option<String>,
    pub byline: Option<String>,
    /// ISO-8601 without an offset.
    pub date: Option<String>,
    /// Cleaned content as a single `<div>` element.
    pub content: Option<String>,
    pub plain_content: Option<String>,
    pub plain_text: Option<Vec<Paragraph>>,
}

/// Runs the fallback over a page or page fragment.
pub fn parse_to_article(html: &str) -> ReadabilityArticle {
    if html.trim().is_empty() {
        return ReadabilityArticle::default();
    }

    let doc = Html::parse_document(html);
    let title = first_value(&doc, &TITLE_SOURCES).and_then(|t| simplify_title(&t));
    let byline = first_value(&doc, &BYLINE_SOURCES).and_then(|b| simplify_byline(&b));
    let date = first_value(&doc, &DATE_SOURCES).and_then(|d| datetime::normalize(&d, &[], false));

    let best = scoring::extract_best_content(&doc).unwrap_or_default();
    let cleaned = cleaners::clean_article(&best, title.as_deref().unwrap_or(""));
    let content = wrap_content(&cleaned);
    let plain_content = sanitize_plain(&content);
    let plain_text = plain_paragraphs(&content);

    ReadabilityArticle {
        title,
        byline,
        date,
        content: Some(content),
        plain_content: Some(plain_content),
        plain_text: if plain_text.is_empty() {
            None
        } else {
            Some(plain_text)
        },
    }
}

fn first_value(doc: &Html, sources: &Sources) -> Option<String> {
    sources.iter().find_map(|(selector, attr)| {
        doc.select(selector).find_map(|element| {
            let value = match attr {
                Some(attr) => element.value().attr(attr).unwrap_or("").to_string(),
                None => element.text().collect::<String>(),
            };
            let value = scoring::normalize_spaces(&value);
            (!value.is_empty()).then_some(value)
        })
    })
}

/// Normalizes cleaned markup to exactly one `<div>` root, or
/// [`EMPTY_CONTENT`] when nothing readable is left.
fn wrap_content(cleaned: &str) -> String {
    let fragment = Html::parse_fragment(cleaned);
    let root = fragment.root_element();
    let has_text = root.text().any(|t| !t.trim().is_empty());
    if !has_text && root.select(&MEDIA).next().is_none() {
        return EMPTY_CONTENT.to_string();
    }

    let cleaned = cleaned.trim();
    let mut top_elements = root.children().filter_map(ElementRef::wrap);
    let stray_text = root.children().any(|child| {
        child
            .value()
            .as_text()
            .is_some_and(|t| !t.trim().is_empty())
    });
    match (top_elements.next(), top_elements.next()) {
        (Some(only), None) if only.value().name() == "div" && !stray_text => cleaned.to_string(),
        _ => format!("<div>{}</div>", cleaned),
    }
}

/// Returns true when `content` is an empty container such as `<div></div>`.
pub fn is_empty_content(content: &str) -> bool {
    content.split_whitespace().collect::<String>() == EMPTY_CONTENT
}

/// Strips content down to structural tags, keeping only link targets and
/// image sources.
pub fn sanitize_plain(html: &str) -> String {
    let mut builder = ammonia::Builder::new();
    builder
        .tags(PLAIN_TAGS.iter().copied().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(Default::default())
        .add_tag_attributes("a", &["href"])
        .add_tag_attributes("img", &["src", "alt"])
        .link_rel(None)
        .url_schemes(["http", "https", "mailto"].iter().copied().collect());
    builder.clean(html).to_string()
}

/// One paragraph per innermost text block, falling back to the whole text
/// when the content has no block elements.
pub fn plain_paragraphs(html: &str) -> Vec<Paragraph> {
    let fragment = Html::parse_fragment(html);
    let blocks: Vec<ElementRef> = fragment.select(&TEXT_BLOCKS).collect();

    let mut paragraphs: Vec<Paragraph> = blocks
        .iter()
        .filter(|block| block.select(&TEXT_BLOCKS).next().is_none())
        .map(|block| scoring::normalize_spaces(&block.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .map(Paragraph::new)
        .collect();

    if blocks.is_empty() {
        let text = scoring::normalize_spaces(&fragment.root_element().text().collect::<String>());
        if !text.is_empty() {
            paragraphs.push(Paragraph::new(text));
        }
    }
    paragraphs
}
