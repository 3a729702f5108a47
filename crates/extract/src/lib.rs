// ABOUTME: Library entry point for the misinfo article extraction engine.
// ABOUTME: Re-exports site configs, the registry, the article assembler and the crawl helpers.

//! Configurable news-article extraction.
//!
//! Each site is described by a [`SiteConfig`] that says how to crawl it and
//! where its article fields live. Pages are parsed into a [`Document`],
//! fields are selected with XPath [`ExtractionSpec`]s, and anything a site
//! config leaves out is filled by a generic readability pass.
//!
//! # Example
//!
//! ```no_run
//! use misinfo_extract::{extract_article, load_registry, CrawlInfo, Document};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = load_registry("sites.yml")?;
//!     let config = registry.get("example").expect("site is configured");
//!     let html = std::fs::read_to_string("page.html")?;
//!     let doc = Document::parse(&html, "https://example.com/2020/01/story")?;
//!     let article = extract_article(&doc, config, Some(&CrawlInfo::new()))?;
//!     println!("{}", serde_json::to_string_pretty(&article)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawl;
pub mod document;
pub mod error;
pub mod extractors;
pub mod loader;
pub mod logging;
pub mod readability;
pub mod registry;
pub mod result;

pub use crate::config::{ArticleConfig, CrawlMethod, CrawlStrategyConfig, SiteConfig};
pub use crate::crawl::{
    canonical_link, is_front_page, CrawlInfo, CrawlPlan, CrawlStrategy, HandledPage, PageHandler,
    PageResponse, RawResponse,
};
pub use crate::document::Document;
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractors::article::extract_article;
pub use crate::extractors::datetime::DatetimeNormalizer;
pub use crate::extractors::select::{extract_element, Extracted};
pub use crate::extractors::spec::{DatetimeSpec, ExtractionSpec, MatchRule, SelectMethod};
pub use crate::loader::{load_registry, load_site_configs, parse_site_configs};
pub use crate::readability::{parse_to_article, ReadabilityArticle};
pub use crate::registry::SiteRegistry;
pub use crate::result::{Article, Paragraph};
