// ABOUTME: Crawl-side helpers around the extraction core: crawl plans, URL classification, page handling.
// ABOUTME: Compiles a site's crawl_strategy section into a tagged strategy with ready-to-use regexes.

//! Crawl planning and page handling.
//!
//! Nothing here performs network I/O. A [`CrawlPlan`] describes what a
//! crawler should fetch and follow for one site, and a [`PageHandler`]
//! turns fetched pages into articles plus the raw-response records that
//! are archived alongside them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::{CrawlMethod, SiteConfig};
use crate::document::Document;
use crate::error::ExtractError;
use crate::extractors::article::extract_article;
use crate::result::Article;

/// Requests per shallow crawler before a per-crawler limit is hit.
const SHALLOW_CRAWLER_REQUESTS: u32 = 1000;

/// Paths that identify a site's front page.
const FRONT_PAGE_PATHS: &[&str] = &["", "/", "index.html", "/index.html"];

/// Identifies one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlInfo {
    pub crawl_id: String,
    /// ISO-8601 UTC, whole seconds, `+00:00` offset.
    pub crawl_datetime: String,
}

impl CrawlInfo {
    /// A fresh crawl id stamped with the current time.
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(at: DateTime<Utc>) -> Self {
        Self {
            crawl_id: Uuid::new_v4().to_string(),
            crawl_datetime: at.format("%Y-%m-%dT%H:%M:%S+00:00").to_string(),
        }
    }
}

impl Default for CrawlInfo {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_pattern<S: Serializer>(regex: &Option<Regex>, s: S) -> Result<S::Ok, S::Error> {
    match regex {
        Some(regex) => s.serialize_some(regex.as_str()),
        None => s.serialize_none(),
    }
}

fn serialize_patterns<S: Serializer>(regexes: &[Regex], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(regexes.iter().map(Regex::as_str))
}

fn compile(pattern: &str, field: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|e| ExtractError::config(field, "CompileCrawlPlan", Some(e.into())))
}

fn compile_opt(pattern: Option<&str>, field: &str) -> Result<Option<Regex>, ExtractError> {
    pattern.map(|p| compile(p, field)).transpose()
}

/// Require/reject regexes tested anywhere in a URL.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UrlFilter {
    #[serde(serialize_with = "serialize_pattern")]
    pub require: Option<Regex>,
    #[serde(serialize_with = "serialize_pattern")]
    pub reject: Option<Regex>,
}

impl UrlFilter {
    fn compile(
        require: Option<&str>,
        reject: Option<&str>,
        field: &str,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            require: compile_opt(require, &format!("{}.url_must_contain", field))?,
            reject: compile_opt(reject, &format!("{}.url_must_not_contain", field))?,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.require.as_ref().map_or(true, |re| re.is_match(url))
            && !self.reject.as_ref().is_some_and(|re| re.is_match(url))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.require.is_none() && self.reject.is_none()
    }
}

/// Which links on a page a rule picks up, and what happens to them.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRule {
    #[serde(flatten)]
    pub filter: UrlFilter,
    /// XPath limiting the page regions links are taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_xpath: Option<String>,
    /// Crawl onwards from the linked page.
    pub follow: bool,
    /// Try to extract an article from the linked page.
    pub parse: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexPageStrategy {
    pub index_page_rule: LinkRule,
    pub article_rule: LinkRule,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScattergunStrategy {
    pub link_rule: LinkRule,
}

#[derive(Debug, Clone, Serialize)]
pub struct SitemapStrategy {
    /// Sitemap index entries to descend into.
    #[serde(serialize_with = "serialize_patterns")]
    pub follow: Vec<Regex>,
    /// Sitemap entries treated as articles.
    #[serde(serialize_with = "serialize_patterns")]
    pub article_rules: Vec<Regex>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfiniteIndexStrategy {
    pub index_page_rule: LinkRule,
    pub article_rule: LinkRule,
    pub load_button_xpaths: Vec<String>,
    pub max_button_clicks: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleListStrategy {
    pub article_urls: Vec<String>,
}

/// The compiled crawl strategy for a site.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CrawlStrategy {
    IndexPage(IndexPageStrategy),
    Scattergun(ScattergunStrategy),
    Sitemap(SitemapStrategy),
    InfiniteIndex(InfiniteIndexStrategy),
    ArticleList(ArticleListStrategy),
}

impl CrawlStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            CrawlStrategy::IndexPage(_) => "index_page",
            CrawlStrategy::Scattergun(_) => "scattergun",
            CrawlStrategy::Sitemap(_) => "sitemap",
            CrawlStrategy::InfiniteIndex(_) => "infinite_index",
            CrawlStrategy::ArticleList(_) => "article_list",
        }
    }
}

/// What to crawl for one site.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlPlan {
    pub site_name: String,
    pub start_urls: Vec<String>,
    pub allowed_domains: Vec<String>,
    pub obey_robots_txt: bool,
    pub strip_query_strings: bool,
    /// Concurrent request cap for shallow crawlers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrent_requests: Option<u32>,
    pub article_filter: UrlFilter,
    pub strategy: CrawlStrategy,
}

impl CrawlPlan {
    /// Compiles a site config. `max_articles` of 0 means unlimited.
    pub fn from_config(config: &SiteConfig, max_articles: u32) -> Result<Self, ExtractError> {
        let article = config.article.clone().unwrap_or_default();
        let article_filter = UrlFilter::compile(
            article.url_must_contain.as_deref(),
            article.url_must_not_contain.as_deref(),
            "article",
        )?;
        let strategy_config = &config.crawl_strategy;

        let (start_urls, strategy) = if !config.article_override_list.is_empty() {
            let urls = config.article_override_list.clone();
            (
                urls.clone(),
                CrawlStrategy::ArticleList(ArticleListStrategy { article_urls: urls }),
            )
        } else {
            let urls: Vec<String> = config
                .start_url
                .iter()
                .chain(&config.article_list)
                .filter(|u| !u.is_empty())
                .cloned()
                .collect();
            (urls, build_strategy(config, &article_filter)?)
        };

        if start_urls.is_empty() {
            return Err(ExtractError::config(
                &config.site_name,
                "CompileCrawlPlan",
                Some(anyhow::anyhow!("no start_url or article_override_list")),
            ));
        }

        let mut domains: BTreeSet<String> = config
            .additional_domains
            .iter()
            .map(|d| d.to_lowercase())
            .collect();
        domains.extend(
            start_urls
                .iter()
                .filter_map(|u| Url::parse(u).ok())
                .filter_map(|u| u.host_str().map(str::to_lowercase)),
        );

        let concurrent_requests = strategy_config.use_shallow_crawlers.then(|| {
            if max_articles > 0 {
                SHALLOW_CRAWLER_REQUESTS.min(max_articles)
            } else {
                SHALLOW_CRAWLER_REQUESTS
            }
        });

        Ok(Self {
            site_name: config.site_name.clone(),
            start_urls,
            allowed_domains: domains.into_iter().collect(),
            obey_robots_txt: config.obey_robots_txt,
            strip_query_strings: strategy_config.strip_query_strings,
            concurrent_requests,
            article_filter,
            strategy,
        })
    }

    /// Returns true if `url` passes the article URL rules.
    pub fn is_article(&self, url: &str) -> bool {
        self.article_filter.matches(url)
    }

    /// Returns true if `url` is a page of links to crawl onwards from.
    ///
    /// Start URLs are always index pages for the index strategies; the other
    /// strategies have no index pages.
    pub fn is_index_page(&self, url: &str) -> bool {
        match &self.strategy {
            CrawlStrategy::IndexPage(IndexPageStrategy {
                index_page_rule, ..
            })
            | CrawlStrategy::InfiniteIndex(InfiniteIndexStrategy {
                index_page_rule, ..
            }) => self.start_urls.iter().any(|s| s == url) || index_page_rule.filter.matches(url),
            _ => false,
        }
    }

    /// Returns true if links to `url` should be crawled onwards.
    pub fn follows(&self, url: &str) -> bool {
        if !self.is_allowed_domain(url) {
            return false;
        }
        match &self.strategy {
            CrawlStrategy::IndexPage(s) => s.index_page_rule.filter.matches(url),
            CrawlStrategy::InfiniteIndex(s) => s.index_page_rule.filter.matches(url),
            CrawlStrategy::Scattergun(s) => s.link_rule.filter.matches(url),
            CrawlStrategy::Sitemap(s) => s.follow.iter().any(|re| re.is_match(url)),
            CrawlStrategy::ArticleList(_) => false,
        }
    }

    /// Returns true if `url` is on one of the crawl's domains or their subdomains.
    pub fn is_allowed_domain(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return false;
        };
        self.allowed_domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
    }

    /// Drops the fragment, and the query string when configured.
    pub fn canonical_link(&self, url: &str) -> String {
        canonical_link(url, self.strip_query_strings)
    }
}

fn build_strategy(
    config: &SiteConfig,
    article_filter: &UrlFilter,
) -> Result<CrawlStrategy, ExtractError> {
    let strategy = &config.crawl_strategy;
    let article_rule = |restrict_xpath: Option<String>| LinkRule {
        filter: article_filter.clone(),
        restrict_xpath,
        follow: false,
        parse: true,
    };

    Ok(match strategy.method {
        CrawlMethod::IndexPage => {
            let index = strategy.index_page.clone().unwrap_or_default();
            CrawlStrategy::IndexPage(IndexPageStrategy {
                index_page_rule: index_page_rule(
                    index.url_must_contain.as_deref(),
                    index.url_must_not_contain.as_deref(),
                    &config.site_name,
                    "crawl_strategy.index_page",
                )?,
                article_rule: article_rule(index.article_links),
            })
        }
        CrawlMethod::InfiniteIndex => {
            let index = strategy.infinite_index.clone().unwrap_or_default();
            CrawlStrategy::InfiniteIndex(InfiniteIndexStrategy {
                index_page_rule: index_page_rule(
                    index.url_must_contain.as_deref(),
                    index.url_must_not_contain.as_deref(),
                    &config.site_name,
                    "crawl_strategy.infinite_index",
                )?,
                article_rule: article_rule(index.article_links),
                load_button_xpaths: index.load_button_xpaths,
                max_button_clicks: index.max_button_clicks,
            })
        }
        CrawlMethod::Scattergun => {
            let links = strategy.scattergun.clone().unwrap_or_default();
            CrawlStrategy::Scattergun(ScattergunStrategy {
                link_rule: LinkRule {
                    filter: UrlFilter::compile(
                        links.url_must_contain.as_deref(),
                        links.url_must_not_contain.as_deref(),
                        "crawl_strategy.scattergun",
                    )?,
                    restrict_xpath: None,
                    follow: true,
                    parse: true,
                },
            })
        }
        CrawlMethod::Sitemap => {
            let sitemap = strategy.sitemap.clone().unwrap_or_default();
            let mut follow = sitemap
                .url_must_contain
                .iter()
                .map(|p| compile(p, "crawl_strategy.sitemap.url_must_contain"))
                .collect::<Result<Vec<_>, _>>()?;
            if follow.is_empty() {
                follow.push(compile("", "crawl_strategy.sitemap")?);
            }
            let article_rules = match &article_filter.require {
                Some(re) => vec![re.clone()],
                None => vec![compile("", "article.url_must_contain")?],
            };
            CrawlStrategy::Sitemap(SitemapStrategy {
                follow,
                article_rules,
            })
        }
    })
}

/// An index page rule with neither pattern rejects every link, leaving the
/// start URLs as the only index pages.
fn index_page_rule(
    require: Option<&str>,
    reject: Option<&str>,
    site_name: &str,
    field: &str,
) -> Result<LinkRule, ExtractError> {
    let mut filter = UrlFilter::compile(require, reject, field)?;
    if filter.is_unrestricted() {
        warn!(
            site = site_name,
            "index page strategy without url_must_contain or url_must_not_contain; only start URLs are index pages"
        );
        filter.reject = Some(compile(".*", field)?);
    }
    Ok(LinkRule {
        filter,
        restrict_xpath: None,
        follow: true,
        parse: false,
    })
}

/// Returns true for a site's front page, which changes over time and is
/// never an article.
pub fn is_front_page(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => return false,
    };
    FRONT_PAGE_PATHS.contains(&path.as_str())
}

/// Drops the URL fragment, and the query string when `strip_query` is set.
/// Unparseable URLs are returned unchanged.
pub fn canonical_link(url: &str, strip_query: bool) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            if strip_query {
                parsed.set_query(None);
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// A fetched page as handed over by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    pub request_url: String,
    pub response_url: String,
    pub status: u16,
    pub body: String,
}

/// The archival record kept for every page an article came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub site_name: String,
    pub crawl_datetime: String,
    pub request_url: String,
    pub response_url: String,
    pub status: u16,
    pub body: String,
}

/// An extracted article together with its raw response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandledPage {
    pub article: Article,
    pub raw: RawResponse,
}

/// Turns fetched pages from one site into articles.
#[derive(Debug, Clone)]
pub struct PageHandler {
    config: SiteConfig,
    plan: CrawlPlan,
    crawl_info: CrawlInfo,
}

impl PageHandler {
    pub fn new(
        config: SiteConfig,
        crawl_info: CrawlInfo,
        max_articles: u32,
    ) -> Result<Self, ExtractError> {
        let plan = CrawlPlan::from_config(&config, max_articles)?;
        Ok(Self {
            config,
            plan,
            crawl_info,
        })
    }

    pub fn plan(&self) -> &CrawlPlan {
        &self.plan
    }

    pub fn crawl_info(&self) -> &CrawlInfo {
        &self.crawl_info
    }

    /// Extracts an article from `response`.
    ///
    /// Returns `None` for front pages, URLs that fail the article rules and
    /// pages where no article content is found.
    pub fn handle(&self, response: &PageResponse) -> Result<Option<HandledPage>, ExtractError> {
        let url = response.response_url.as_str();
        info!(site = %self.config.site_name, url, "searching for an article");

        if is_front_page(url) {
            debug!(url, "skipping front page");
            return Ok(None);
        }
        if !self.plan.is_article(url) {
            debug!(url, "URL does not match article rules");
            return Ok(None);
        }

        let doc = Document::parse(&response.body, url)?;
        let article = extract_article(&doc, &self.config, Some(&self.crawl_info))?;
        if !article.has_content() {
            return Ok(None);
        }

        info!(url, "article identification was successful");
        Ok(Some(HandledPage {
            article,
            raw: RawResponse {
                site_name: self.config.site_name.clone(),
                crawl_datetime: self.crawl_info.crawl_datetime.clone(),
                request_url: response.request_url.clone(),
                response_url: response.response_url.clone(),
                status: response.status,
                body: response.body.clone(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ArticleConfig, CrawlStrategyConfig, IndexPageConfig, LinkFilterConfig, SitemapConfig,
    };
    use crate::extractors::spec::{ExtractionSpec, MatchRule};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn site(method: CrawlMethod) -> SiteConfig {
        let mut config = SiteConfig::new("example", "https://www.example.com/news");
        config.additional_domains = vec!["cdn.example.net".into()];
        config.crawl_strategy = CrawlStrategyConfig {
            method,
            ..Default::default()
        };
        config.article = Some(ArticleConfig {
            url_must_contain: Some(r"/\d{4}/\d{2}/".into()),
            url_must_not_contain: Some("/video/".into()),
            content: Some(ExtractionSpec::xpath("//div[@class='story']", MatchRule::Single)),
            ..Default::default()
        });
        config
    }

    #[test]
    fn crawl_info_format() {
        let at = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 5).unwrap();
        let info = CrawlInfo::started_at(at);
        assert_eq!(info.crawl_datetime, "2020-05-17T08:30:05+00:00");
        assert_eq!(Uuid::parse_str(&info.crawl_id).unwrap().get_version_num(), 4);
        assert_ne!(CrawlInfo::new().crawl_id, CrawlInfo::new().crawl_id);
    }

    #[test]
    fn plan_collects_start_urls_and_domains() {
        let mut config = site(CrawlMethod::Scattergun);
        config.article_list = vec!["https://blog.example.org/2020/01/post".into()];
        let plan = CrawlPlan::from_config(&config, 0).unwrap();
        assert_eq!(plan.start_urls.len(), 2);
        assert_eq!(
            plan.allowed_domains,
            vec!["blog.example.org", "cdn.example.net", "www.example.com"]
        );
        assert!(plan.obey_robots_txt);
        assert_eq!(plan.concurrent_requests, None);
        assert_eq!(plan.strategy.name(), "scattergun");
    }

    #[test]
    fn article_rules() {
        let plan = CrawlPlan::from_config(&site(CrawlMethod::Scattergun), 0).unwrap();
        assert!(plan.is_article("https://www.example.com/2020/01/story"));
        assert!(!plan.is_article("https://www.example.com/about"));
        assert!(!plan.is_article("https://www.example.com/2020/01/video/clip"));
    }

    #[test]
    fn index_page_without_patterns_only_uses_start_urls() {
        let plan = CrawlPlan::from_config(&site(CrawlMethod::IndexPage), 0).unwrap();
        assert!(plan.is_index_page("https://www.example.com/news"));
        assert!(!plan.is_index_page("https://www.example.com/news?page=2"));
        assert!(!plan.follows("https://www.example.com/news?page=2"));
    }

    #[test]
    fn index_page_patterns() {
        let mut config = site(CrawlMethod::IndexPage);
        config.crawl_strategy.index_page = Some(IndexPageConfig {
            url_must_contain: Some(r"/news/page/\d+".into()),
            article_links: Some("//div[@class='list']".into()),
            ..Default::default()
        });
        let plan = CrawlPlan::from_config(&config, 0).unwrap();
        assert!(plan.is_index_page("https://www.example.com/news/page/2"));
        assert!(plan.follows("https://www.example.com/news/page/2"));
        assert!(!plan.follows("https://elsewhere.com/news/page/2"));
        match &plan.strategy {
            CrawlStrategy::IndexPage(s) => {
                assert_eq!(s.article_rule.restrict_xpath.as_deref(), Some("//div[@class='list']"));
                assert!(s.article_rule.parse);
                assert!(!s.index_page_rule.parse);
            }
            other => panic!("unexpected strategy {}", other.name()),
        }
    }

    #[test]
    fn sitemap_defaults_follow_everything() {
        let plan = CrawlPlan::from_config(&site(CrawlMethod::Sitemap), 0).unwrap();
        assert!(plan.follows("https://www.example.com/sitemap-2020.xml"));
        let mut config = site(CrawlMethod::Sitemap);
        config.crawl_strategy.sitemap = Some(SitemapConfig {
            url_must_contain: vec!["2020".into()],
        });
        let plan = CrawlPlan::from_config(&config, 0).unwrap();
        assert!(!plan.follows("https://www.example.com/sitemap-2019.xml"));
    }

    #[test]
    fn infinite_index_carries_button_settings() {
        let plan = CrawlPlan::from_config(&site(CrawlMethod::InfiniteIndex), 0).unwrap();
        match plan.strategy {
            CrawlStrategy::InfiniteIndex(s) => {
                assert_eq!(s.max_button_clicks, 10000);
                assert_eq!(s.load_button_xpaths.len(), 2);
            }
            other => panic!("unexpected strategy {}", other.name()),
        }
    }

    #[test]
    fn override_list_replaces_start_urls() {
        let mut config = site(CrawlMethod::IndexPage);
        config.start_url = vec![String::new()];
        config.article_override_list = vec!["https://www.example.com/2020/01/a".into()];
        let plan = CrawlPlan::from_config(&config, 0).unwrap();
        assert_eq!(plan.start_urls, config.article_override_list);
        assert_eq!(plan.strategy.name(), "article_list");
        assert!(!plan.follows("https://www.example.com/2020/01/b"));
    }

    #[test]
    fn shallow_crawlers_cap_concurrency() {
        let mut config = site(CrawlMethod::Scattergun);
        config.crawl_strategy.use_shallow_crawlers = true;
        assert_eq!(
            CrawlPlan::from_config(&config, 0).unwrap().concurrent_requests,
            Some(1000)
        );
        assert_eq!(
            CrawlPlan::from_config(&config, 50).unwrap().concurrent_requests,
            Some(50)
        );
    }

    #[test]
    fn invalid_regex_is_config_error() {
        let mut config = site(CrawlMethod::Scattergun);
        config.crawl_strategy.scattergun = Some(LinkFilterConfig {
            url_must_contain: Some("(".into()),
            url_must_not_contain: None,
        });
        let err = CrawlPlan::from_config(&config, 0).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.field, "crawl_strategy.scattergun.url_must_contain");
    }

    #[test]
    fn missing_start_url_is_config_error() {
        let mut config = site(CrawlMethod::Scattergun);
        config.start_url.clear();
        assert!(CrawlPlan::from_config(&config, 0).unwrap_err().is_config());
    }

    #[test]
    fn url_helpers() {
        assert!(is_front_page("https://example.com"));
        assert!(is_front_page("https://example.com/"));
        assert!(is_front_page("https://example.com/index.html"));
        assert!(!is_front_page("https://example.com/news"));
        assert_eq!(
            canonical_link("https://example.com/a?utm=1#top", true),
            "https://example.com/a"
        );
        assert_eq!(
            canonical_link("https://example.com/a?id=1#top", false),
            "https://example.com/a?id=1"
        );
        assert_eq!(canonical_link("not a url", true), "not a url");
    }

    #[test]
    fn handler_extracts_articles_and_raw_records() {
        let info = CrawlInfo::started_at(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap());
        let handler = PageHandler::new(site(CrawlMethod::Scattergun), info, 0).unwrap();
        let body = r#"<html><body><div class="story"><p>A powerful storm struck the coast on Friday, flooding streets and cutting power.</p></div></body></html>"#;
        let response = PageResponse {
            request_url: "https://www.example.com/2020/01/story?ref=home".into(),
            response_url: "https://www.example.com/2020/01/story".into(),
            status: 200,
            body: body.into(),
        };

        let handled = handler.handle(&response).unwrap().unwrap();
        assert_eq!(handled.article.crawl_id, Some(handler.crawl_info().crawl_id.clone()));
        assert_eq!(handled.raw.crawl_datetime, "2020-01-02T03:04:05+00:00");
        assert_eq!(handled.raw.status, 200);
        assert_eq!(handled.raw.request_url, response.request_url);

        let front = PageResponse {
            response_url: "https://www.example.com/".into(),
            ..response.clone()
        };
        assert!(handler.handle(&front).unwrap().is_none());

        let not_article = PageResponse {
            response_url: "https://www.example.com/about".into(),
            ..response.clone()
        };
        assert!(handler.handle(&not_article).unwrap().is_none());

        let empty = PageResponse {
            body: r#"<html><body><div class="story"></div></body></html>"#.into(),
            ..response
        };
        assert!(handler.handle(&empty).unwrap().is_none());
    }
}
