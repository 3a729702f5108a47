// ABOUTME: Article and Paragraph records produced by the extraction engine.
// ABOUTME: Every field is always serialized; absent values are null, never empty strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One block of plain text from the article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The structured record for one article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub site_name: String,
    pub article_url: String,
    pub title: Option<String>,
    pub byline: Option<String>,
    /// ISO-8601, with a UTC offset only when the site config asks for one.
    pub publication_datetime: Option<String>,
    pub content: Option<String>,
    pub plain_content: Option<String>,
    pub plain_text: Option<Vec<Paragraph>>,
    /// One entry per configured metadata key; values are strings, lists or null.
    pub metadata: Option<IndexMap<String, serde_json::Value>>,
    pub crawl_id: Option<String>,
    pub crawl_datetime: Option<String>,
}

impl Article {
    /// Returns true if an article body was found on the page.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// The plain text paragraphs joined by blank lines.
    pub fn text(&self) -> String {
        self.plain_text
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
