// ABOUTME: Typed per-site configuration: start URLs, crawl strategy settings and extraction specs.
// ABOUTME: Mirrors the YAML site-config layout; optional sections deserialize to None or defaults.

//! Site configuration data models.
//!
//! A [`SiteConfig`] is read once per run and never changes. The crawl
//! strategy section is kept in its on-disk shape here; [`crate::crawl`]
//! compiles it into a runtime plan.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extractors::spec::{one_or_many, DatetimeSpec, ExtractionSpec};

fn default_true() -> bool {
    true
}

/// Everything the engine knows about one site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Filled from the mapping key when the body omits it.
    #[serde(default)]
    pub site_name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub start_url: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub article_list: Vec<String>,
    /// When non-empty, exactly these article URLs are visited.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub article_override_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_domains: Vec<String>,
    #[serde(default = "default_true")]
    pub obey_robots_txt: bool,
    #[serde(default)]
    pub crawl_strategy: CrawlStrategyConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Kept in file order, which is also the output order.
    pub metadata: Option<IndexMap<String, ExtractionSpec>>,
}

impl SiteConfig {
    /// Creates a config for `site_name` with a single start URL.
    pub fn new(site_name: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            start_url: vec![start_url.into()],
            obey_robots_txt: true,
            ..Default::default()
        }
    }

    /// Sets the article extraction section.
    pub fn with_article(mut self, article: ArticleConfig) -> Self {
        self.article = Some(article);
        self
    }

    /// Adds a metadata field spec.
    pub fn with_metadata(mut self, key: impl Into<String>, spec: ExtractionSpec) -> Self {
        self.metadata
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), spec);
        self
    }

    /// The content spec, when one is configured.
    pub fn content_spec(&self) -> Option<&ExtractionSpec> {
        self.article.as_ref().and_then(|a| a.content.as_ref())
    }
}

/// Where each article field lives on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<ExtractionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byline: Option<ExtractionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_datetime: Option<DatetimeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ExtractionSpec>,
    /// Regex an article URL must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_must_contain: Option<String>,
    /// Regex an article URL must not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_must_not_contain: Option<String>,
}

/// How the crawler discovers article pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlMethod {
    IndexPage,
    #[default]
    Scattergun,
    Sitemap,
    InfiniteIndex,
}

/// The `crawl_strategy` section as written in the site config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlStrategyConfig {
    pub method: CrawlMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_page: Option<IndexPageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scattergun: Option<LinkFilterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<SitemapConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infinite_index: Option<InfiniteIndexConfig>,
    pub strip_query_strings: bool,
    pub use_shallow_crawlers: bool,
}

/// Require/reject regexes applied to discovered links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkFilterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_must_contain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_must_not_contain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_must_contain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_must_not_contain: Option<String>,
    /// XPath limiting where on an index page article links are taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_links: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Regexes selecting which sitemap index entries to follow.
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub url_must_contain: Vec<String>,
}

fn default_load_buttons() -> Vec<String> {
    vec![
        r#"//button[text()="Show More"]"#.to_string(),
        r#"//button[text()="Load More"]"#.to_string(),
    ]
}

fn default_max_button_clicks() -> u32 {
    10000
}

/// Index pages that grow by pressing a "load more" button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfiniteIndexConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_must_contain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_must_not_contain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_links: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub load_button_xpaths: Vec<String>,
    pub max_button_clicks: u32,
}

impl Default for InfiniteIndexConfig {
    fn default() -> Self {
        Self {
            url_must_contain: None,
            url_must_not_contain: None,
            article_links: None,
            load_button_xpaths: default_load_buttons(),
            max_button_clicks: default_max_button_clicks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::spec::MatchRule;
    use pretty_assertions::assert_eq;

    const YAML: &str = r#"
site_name: example.com
start_url:
  - https://example.com/news
  - https://example.com/opinion
additional_domains: [cdn.example.com]
crawl_strategy:
  method: index_page
  index_page:
    url_must_contain: /page/
    article_links: //div[@class='list']
  strip_query_strings: true
article:
  url_must_contain: /\d{4}/\d{2}/
  content:
    select_method: xpath
    select_expression: //div[@class='story']
    match_rule: single
    remove_expressions:
      - //div[@class='social']
  byline:
    select_method: xpath
    select_expression: //span[@class='author']/text()
    match_rule: all
  publication_datetime:
    select_method: xpath
    select_expression: //time/@datetime
    datetime_formats: ["YYYY-MM-DDTHH:mm:ssZZ"]
    timezone: true
metadata:
  section:
    select_method: xpath
    select_expression: //meta[@property='article:section']/@content
"#;

    #[test]
    fn parses_full_site_config() {
        let config: SiteConfig = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(config.site_name, "example.com");
        assert_eq!(config.start_url.len(), 2);
        assert!(config.obey_robots_txt);
        assert_eq!(config.crawl_strategy.method, CrawlMethod::IndexPage);
        assert!(config.crawl_strategy.strip_query_strings);
        assert_eq!(
            config.crawl_strategy.index_page.as_ref().unwrap().url_must_contain.as_deref(),
            Some("/page/")
        );

        let article = config.article.as_ref().unwrap();
        assert_eq!(article.byline.as_ref().unwrap().match_rule, MatchRule::All);
        assert_eq!(
            config.content_spec().unwrap().remove_expressions,
            vec!["//div[@class='social']".to_string()]
        );
        let date = article.publication_datetime.as_ref().unwrap();
        assert!(date.timezone);
        assert_eq!(date.datetime_formats, vec!["YYYY-MM-DDTHH:mm:ssZZ".to_string()]);
        assert!(config.metadata.as_ref().unwrap().contains_key("section"));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config: SiteConfig =
            serde_yaml::from_str("start_url: https://example.com/\n").unwrap();
        assert_eq!(config.start_url, vec!["https://example.com/".to_string()]);
        assert_eq!(config.crawl_strategy.method, CrawlMethod::Scattergun);
        assert!(config.obey_robots_txt);
        assert!(config.article.is_none());
        assert!(config.metadata.is_none());
    }

    #[test]
    fn infinite_index_defaults() {
        let config: CrawlStrategyConfig =
            serde_yaml::from_str("method: infinite_index\ninfinite_index:\n  url_must_contain: /news\n")
                .unwrap();
        let infinite = config.infinite_index.unwrap();
        assert_eq!(infinite.max_button_clicks, 10000);
        assert_eq!(infinite.load_button_xpaths, default_load_buttons());
    }

    #[test]
    fn builders() {
        let config = SiteConfig::new("example", "https://example.com/")
            .with_article(ArticleConfig::default())
            .with_metadata("tags", ExtractionSpec::xpath("//a[@rel='tag']/text()", MatchRule::All));
        assert!(config.article.is_some());
        assert_eq!(config.metadata.unwrap().len(), 1);
    }
}
