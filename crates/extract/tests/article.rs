// ABOUTME: End-to-end extraction tests against the fixture site configs and saved pages.
// ABOUTME: Covers configured overrides, readability fallback, empty pages and broken configs.

use misinfo_extract::{
    extract_article, load_registry, parse_to_article, Article, CrawlInfo, CrawlPlan, Document,
    PageHandler, PageResponse, SiteRegistry,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;

const STORY_URL: &str = "https://news.example.com/2020/03/storm-floods-coastal-towns";

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path, e))
}

fn registry() -> SiteRegistry {
    load_registry(format!("{}/tests/fixtures/sites.yml", env!("CARGO_MANIFEST_DIR"))).unwrap()
}

fn extract(site: &str, page: &str, url: &str) -> Article {
    let registry = registry();
    let config = registry.get(site).unwrap();
    let doc = Document::parse(&fixture(page), url).unwrap();
    extract_article(&doc, config, None).unwrap()
}

#[test]
fn registry_loads_every_site() {
    let registry = registry();
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["bare-blog", "broken-site", "example-news", "fallback-only"]
    );
    assert_eq!(
        registry.for_url(STORY_URL).map(|c| c.site_name.as_str()),
        Some("example-news")
    );
    assert_eq!(
        registry
            .for_url("https://static.example.com/img.png")
            .map(|c| c.site_name.as_str()),
        Some("example-news")
    );
}

#[test]
fn configured_site_extracts_every_field() {
    let article = extract("example-news", "story.html", STORY_URL);

    assert_eq!(article.site_name, "example-news");
    assert_eq!(article.article_url, STORY_URL);
    assert_eq!(article.title.as_deref(), Some("Storm floods coastal towns"));
    assert_eq!(article.byline.as_deref(), Some("Jane Doe, John Smith"));
    assert_eq!(
        article.publication_datetime.as_deref(),
        Some("2020-03-14T09:30:00")
    );

    let content = article.content.as_deref().unwrap();
    assert!(content.starts_with("<div"));
    assert!(content.contains("Café du Port"));
    assert!(!content.contains("Share this article"));
    assert!(!content.contains("newsletter"));
    assert!(!content.contains("Sport"));

    let paragraphs = article.plain_text.as_ref().unwrap();
    assert_eq!(paragraphs.len(), 3);
    assert!(paragraphs[2].text.starts_with("Officials said"));

    let metadata = article.metadata.as_ref().unwrap();
    assert_eq!(metadata["section"], json!("Weather"));
    assert_eq!(metadata["tags"], json!(["storms", "flooding"]));
    assert_eq!(metadata["paywall"], Value::Null);
    assert_eq!(
        metadata.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["section", "tags", "paywall"]
    );
}

#[test]
fn extraction_is_idempotent() {
    let first = extract("example-news", "story.html", STORY_URL);
    let second = extract("example-news", "story.html", STORY_URL);
    assert_eq!(first, second);
}

#[test]
fn article_json_has_every_field() {
    let article = extract("example-news", "story.html", STORY_URL);
    let value = serde_json::to_value(&article).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 11);
    assert!(value["crawl_id"].is_null());
    assert!(value["plain_text"][0]["text"].is_string());

    let back: Article = serde_json::from_value(value).unwrap();
    assert_eq!(back, article);
}

#[test]
fn site_without_field_specs_uses_readability() {
    let article = extract(
        "fallback-only",
        "story.html",
        "https://fallback.example.net/2020/03/storm",
    );
    assert_eq!(article.title.as_deref(), Some("Storm floods coastal towns"));
    assert_eq!(article.byline.as_deref(), Some("Example News Staff"));
    assert_eq!(
        article.publication_datetime.as_deref(),
        Some("2020-03-14T09:00:00")
    );
    assert!(article.content.as_deref().unwrap().contains("harbour wall"));
    assert!(article.metadata.is_none());
}

#[test]
fn empty_story_container_yields_no_article() {
    let article = extract(
        "example-news",
        "section.html",
        "https://news.example.com/2020/03/latest",
    );
    assert_eq!(article.content, None);
    assert_eq!(article.plain_content, None);
    assert_eq!(article.plain_text, None);
    assert_eq!(article.title, None);
    assert_eq!(article.byline, None);
    assert_eq!(article.publication_datetime, None);
    assert_eq!(article.metadata.unwrap()["tags"], json!(["news"]));
}

#[test]
fn broken_content_spec_fails_the_page() {
    let registry = registry();
    let config = registry.get("broken-site").unwrap();
    let doc = Document::parse(&fixture("story.html"), "https://broken.example.com/a").unwrap();
    let err = extract_article(&doc, config, None).unwrap_err();
    assert!(err.is_missing_key());
    assert!(err.to_string().contains("select_expression"));
}

#[test]
fn readability_is_stable_on_fixture() {
    let html = fixture("story.html");
    assert_eq!(parse_to_article(&html), parse_to_article(&html));
}

#[test]
fn page_handler_stamps_crawl_info() {
    let registry = registry();
    let config = registry.get("example-news").unwrap().clone();
    let info = CrawlInfo::new();
    let handler = PageHandler::new(config, info.clone(), 0).unwrap();

    let page = PageResponse {
        request_url: format!("{}?utm_source=home", STORY_URL),
        response_url: STORY_URL.to_string(),
        status: 200,
        body: fixture("story.html"),
    };
    let handled = handler.handle(&page).unwrap().unwrap();
    assert_eq!(handled.article.crawl_id.as_deref(), Some(info.crawl_id.as_str()));
    assert_eq!(
        handled.article.crawl_datetime.as_deref(),
        Some(info.crawl_datetime.as_str())
    );
    assert_eq!(handled.raw.site_name, "example-news");
    assert_eq!(handled.raw.body, page.body);

    let video = PageResponse {
        response_url: "https://news.example.com/2020/03/video/storm".into(),
        ..page
    };
    assert!(handler.handle(&video).unwrap().is_none());
}

#[test]
fn crawl_plans_follow_site_strategies() {
    let registry = registry();

    let news = CrawlPlan::from_config(registry.get("example-news").unwrap(), 0).unwrap();
    assert_eq!(news.strategy.name(), "index_page");
    assert_eq!(
        news.allowed_domains,
        vec!["news.example.com", "static.example.com"]
    );
    assert!(news.is_index_page("https://news.example.com/latest/page/3"));
    assert_eq!(
        news.canonical_link("https://news.example.com/2020/03/a?utm=x#c"),
        "https://news.example.com/2020/03/a"
    );

    let blog = CrawlPlan::from_config(registry.get("bare-blog").unwrap(), 0).unwrap();
    assert_eq!(blog.strategy.name(), "sitemap");
    assert!(blog.follows("https://blog.example.org/sitemap-posts.xml"));
    assert!(!blog.follows("https://blog.example.org/sitemap-pages.xml"));

    let fallback = CrawlPlan::from_config(registry.get("fallback-only").unwrap(), 25).unwrap();
    assert!(!fallback.obey_robots_txt);
    assert_eq!(fallback.concurrent_requests, Some(25));
}
