// ABOUTME: Assembles an Article from a page: readability defaults overridden by site-specific specs.
// ABOUTME: Optional field failures are logged and isolated; a broken content spec fails the page.

//! Article assembly.
//!
//! The readability fallback always runs on the whole page first. A site's
//! `article.content` spec then narrows the content, and once content is
//! known the configured title, byline and date specs replace the fallback
//! values. Metadata specs are evaluated independently of content.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ArticleConfig, SiteConfig};
use crate::crawl::CrawlInfo;
use crate::document::Document;
use crate::error::ExtractError;
use crate::extractors::datetime::DatetimeNormalizer;
use crate::extractors::postprocess::{simplify_byline, simplify_bylines, simplify_title};
use crate::extractors::select::{extract_element, Extracted};
use crate::extractors::spec::{ExtractionSpec, MatchRule};
use crate::readability::{self, parse_to_article, ReadabilityArticle};
use crate::result::{Article, Paragraph};

/// Builds the article record for `doc` using `config`.
///
/// Fails only when the `article.content` spec is unusable.
pub fn extract_article(
    doc: &Document,
    config: &SiteConfig,
    crawl_info: Option<&CrawlInfo>,
) -> Result<Article, ExtractError> {
    let mut article = Article {
        site_name: config.site_name.clone(),
        article_url: doc.url().to_string(),
        crawl_id: crawl_info.map(|c| c.crawl_id.clone()),
        crawl_datetime: crawl_info.map(|c| c.crawl_datetime.clone()),
        ..Default::default()
    };

    let page_spec = ExtractionSpec::xpath("/html", MatchRule::Largest).warn_if_missing(false);
    let page_html = extract_element(doc, &page_spec, None)?
        .map(|page| page.join(""))
        .unwrap_or_default();
    let fallback = parse_to_article(&page_html);
    article.title = fallback.title;
    article.byline = fallback.byline;
    article.publication_datetime = fallback.date;
    set_content(&mut article, fallback.content, fallback.plain_content, fallback.plain_text);

    if config.article.is_some() {
        let content_spec = config
            .content_spec()
            .ok_or_else(|| ExtractError::missing_key("article.content", "ExtractArticle"))?
            .clone()
            .warn_if_missing(false);
        if let Some(found) = extract_element(doc, &content_spec, None)? {
            let ReadabilityArticle {
                content,
                plain_content,
                plain_text,
                ..
            } = parse_to_article(&found.join(""));
            set_content(&mut article, content, plain_content, plain_text);
        }
    }

    if article
        .content
        .as_deref()
        .is_some_and(readability::is_empty_content)
    {
        debug!(url = doc.url(), "page has an empty article body");
        article.content = None;
        article.plain_content = None;
        article.plain_text = None;
        article.title = None;
        article.byline = None;
        article.publication_datetime = None;
    }

    if let (Some(article_config), true) = (&config.article, article.has_content()) {
        apply_overrides(doc, article_config, &mut article);
    }

    if let Some(specs) = &config.metadata {
        article.metadata = Some(extract_metadata(doc, specs));
    }

    Ok(article)
}

fn set_content(
    article: &mut Article,
    content: Option<String>,
    plain_content: Option<String>,
    plain_text: Option<Vec<Paragraph>>,
) {
    article.content = content;
    article.plain_content = plain_content;
    article.plain_text = plain_text;
}

/// Applies the configured title, byline and date specs. Each field that
/// has a usable spec replaces the fallback value, even with null.
fn apply_overrides(doc: &Document, config: &ArticleConfig, article: &mut Article) {
    if let Some(spec) = &config.title {
        let title = extract_element(doc, spec, Some(&simplify_title));
        if let Some(title) = field_result(doc, "title", title) {
            article.title = title.map(|t| t.join(" "));
        }
    }

    if let Some(spec) = &config.byline {
        let byline = extract_element(doc, spec, Some(&simplify_byline));
        if let Some(byline) = field_result(doc, "byline", byline) {
            article.byline = byline.and_then(|b| {
                let names = simplify_bylines(&b.into_vec());
                (!names.is_empty()).then(|| names.join(", "))
            });
        }
    }

    if let Some(spec) = &config.publication_datetime {
        let raw = extract_element(doc, &spec.spec, None);
        if let Some(raw) = field_result(doc, "publication_datetime", raw) {
            let normalizer = DatetimeNormalizer::from_spec(spec);
            article.publication_datetime = raw.and_then(|r| normalizer.normalize(&r.join(" ")));
        }
    }
}

/// Unwraps an optional field's extraction, logging and discarding errors.
fn field_result(
    doc: &Document,
    field: &str,
    result: Result<Option<Extracted>, ExtractError>,
) -> Option<Option<Extracted>> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(url = doc.url(), field, error = %err, "skipping misconfigured article field");
            None
        }
    }
}

fn extract_metadata(
    doc: &Document,
    specs: &IndexMap<String, ExtractionSpec>,
) -> IndexMap<String, Value> {
    specs
        .iter()
        .map(|(key, spec)| {
            let value = match extract_element(doc, spec, None) {
                Ok(Some(Extracted::Single(value))) => Value::String(value),
                Ok(Some(Extracted::All(values))) => {
                    Value::Array(values.into_iter().map(Value::String).collect())
                }
                Ok(None) => Value::Null,
                Err(err) => {
                    warn!(url = doc.url(), field = %key, error = %err, "metadata extraction failed");
                    Value::Null
                }
            };
            (key.clone(), value)
        })
        .collect()
}
