// ABOUTME: Cleans the readability content block: unlikely candidates, low-content containers, stray headers.
// ABOUTME: Removal is decided up front as a skip set of node ids, then applied while re-serializing.

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet};

use super::brs::{brs_to_ps, rewrite_top_level};
use super::scoring::{get_weight, link_density, normalize_spaces};
use crate::document::{escape_attr, escape_text, is_void_element};

/// Embedded players that survive cleaning even inside low-scoring blocks.
const KEEP_SELECTORS: &[&str] = &[
    r#"iframe[src^="https://www.youtube.com"]"#,
    r#"iframe[src^="https://www.youtube-nocookie.com"]"#,
    r#"iframe[src^="https://player.vimeo"]"#,
];

/// Dropped along with their content.
const STRIP_TAGS: &[&str] = &[
    "title", "script", "noscript", "link", "style", "hr", "embed", "object", "form", "button",
    "input", "select", "textarea",
];

static SPACER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)transparent|spacer|blank").unwrap());

static CANDIDATES_BLACKLIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(ad-break|ad-banner|adbox|advert|addthis|agegate|aux|blogger-labels|combx|comment|conversation|disqus|entry-unrelated|extra|foot|header|hidden|loader|login|menu|meta|nav|outbrain|pager|pagination|predicta|popup|printfriendly|related|remove|remark|rss|share|shoutbox|sidebar|sociable|sponsor|taboola|tools)").unwrap()
});
static CANDIDATES_WHITELIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(and|article|body|blogindex|column|content|entry-content-asset|format|hfeed|hentry|hatom|main|page|posts|shadow)").unwrap()
});

static WHITELIST_ATTRS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(src|srcset|sizes|type|href|class|id|alt|xlink:href|width|height)$").unwrap()
});

static DIV_TO_P_BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a, blockquote, dl, div, img, p, pre, table").unwrap());
static CLEAN_CONDITIONALLY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul, ol, table, div").unwrap());
static HEADERS: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3, h4, h5, h6").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static ANY: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());
static INPUTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, textarea, select, button").unwrap());
static SCRIPTS: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

fn count(element: &ElementRef, selector: &Selector) -> usize {
    element.select(selector).count()
}

fn element_text(element: &ElementRef) -> String {
    normalize_spaces(&element.text().collect::<String>())
}

/// Returns true when a conditionally-cleaned container lacks real content.
fn remove_unless_content(element: &ElementRef, weight: i32) -> bool {
    if element.value().classes().any(|c| c == "entry-content-asset") {
        return false;
    }

    let content = element_text(element);
    if content.matches(',').count() >= 10 {
        return false;
    }

    let p_count = count(element, &P);
    let input_count = count(element, &INPUTS);
    if input_count as f64 > p_count as f64 / 3.0 {
        return true;
    }

    let content_length = content.chars().count();
    if content_length < 25 && count(element, &IMG) == 0 {
        return true;
    }

    let density = link_density(element);
    if weight < 25 && density > 0.2 && content_length > 75 {
        return true;
    }
    if weight >= 25 && density > 0.5 {
        let is_list = matches!(element.value().name(), "ol" | "ul");
        let introduced = element
            .prev_siblings()
            .find_map(ElementRef::wrap)
            .map(|prev| element_text(&prev).ends_with(':'))
            .unwrap_or(false);
        return !(is_list && introduced);
    }

    count(element, &SCRIPTS) > 0 && content_length < 150
}

pub fn is_unlikely_candidate(element: &ElementRef) -> bool {
    if element.value().name().eq_ignore_ascii_case("a") {
        return false;
    }
    let class = element.value().attr("class").unwrap_or("");
    let id = element.value().attr("id").unwrap_or("");
    if class.is_empty() && id.is_empty() {
        return false;
    }
    let class_and_id = format!("{} {}", class, id);
    !CANDIDATES_WHITELIST.is_match(&class_and_id) && CANDIDATES_BLACKLIST.is_match(&class_and_id)
}

pub fn should_remove_header(element: &ElementRef, title: &str, seen_paragraph: bool) -> bool {
    if !seen_paragraph {
        return true;
    }
    let text = element_text(element);
    (!title.is_empty() && text == normalize_spaces(title))
        || get_weight(element) < 0
        || text.chars().count() < 3
}

/// Spacer images and images declared smaller than 10px.
pub fn should_remove_image(element: &ElementRef) -> bool {
    let Some(src) = element.value().attr("src") else {
        return true;
    };
    if SPACER_RE.is_match(src) {
        return true;
    }
    let dimension = |name: &str| {
        element
            .value()
            .attr(name)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(20)
    };
    dimension("height") < 10 || dimension("width") < 10
}

pub fn is_empty_paragraph(element: &ElementRef) -> bool {
    element.text().all(|t| t.trim().is_empty()) && count(element, &IMG) == 0
}

/// How nodes are written back out.
#[derive(Default)]
struct Rewrite {
    skip: HashSet<NodeId>,
    rename: HashMap<NodeId, &'static str>,
    filter_attrs: bool,
}

impl Rewrite {
    fn write_children(&self, fragment: &Html) -> String {
        let mut out = String::new();
        for child in fragment.root_element().children() {
            self.write(child, &mut out);
        }
        out
    }

    fn write(&self, node: NodeRef<Node>, out: &mut String) {
        if self.skip.contains(&node.id()) {
            return;
        }
        match node.value() {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(el) => {
                let name = self.rename.get(&node.id()).copied().unwrap_or(el.name());
                out.push('<');
                out.push_str(name);
                for (key, value) in el.attrs() {
                    if self.filter_attrs && !WHITELIST_ATTRS_RE.is_match(key) {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(name) {
                    return;
                }
                for child in node.children() {
                    self.write(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            _ => {}
        }
    }
}

/// Divs holding only inline content become paragraphs.
fn convert_divs_to_paragraphs(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut rewrite = Rewrite::default();
    for element in fragment.select(&ANY) {
        if element.value().name() == "div"
            && !element
                .children()
                .filter_map(ElementRef::wrap)
                .any(|c| DIV_TO_P_BLOCKS.matches(&c))
        {
            rewrite.rename.insert(element.id(), "p");
        }
    }
    rewrite.write_children(&fragment)
}

fn keep_ids(fragment: &Html) -> HashSet<NodeId> {
    let mut keep: HashSet<NodeId> = fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .map(|el| el.id())
        .collect();
    for css in KEEP_SELECTORS {
        if let Ok(selector) = Selector::parse(css) {
            for el in fragment.select(&selector) {
                keep.insert(el.id());
                keep.extend(el.ancestors().map(|a| a.id()));
            }
        }
    }
    keep
}

fn mark_stripped(fragment: &Html, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&ANY) {
        if STRIP_TAGS.contains(&el.value().name()) {
            skip.insert(el.id());
        }
    }
}

fn mark_unlikely(fragment: &Html, keep: &HashSet<NodeId>, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&ANY) {
        if !keep.contains(&el.id()) && is_unlikely_candidate(&el) {
            skip.insert(el.id());
        }
    }
}

fn mark_clean_conditionally(fragment: &Html, keep: &HashSet<NodeId>, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&CLEAN_CONDITIONALLY) {
        if keep.contains(&el.id()) {
            continue;
        }
        let weight = get_weight(&el);
        if weight < 0 || remove_unless_content(&el, weight) {
            skip.insert(el.id());
        }
    }
}

fn mark_headers(fragment: &Html, title: &str, skip: &mut HashSet<NodeId>) {
    let mut seen_paragraph = false;
    for el in fragment.tree.root().descendants().filter_map(ElementRef::wrap) {
        if el.value().name() == "p" {
            seen_paragraph = true;
        } else if HEADERS.matches(&el) && should_remove_header(&el, title, seen_paragraph) {
            skip.insert(el.id());
        }
    }
}

/// Fewer than three h1s are page titles and go; more are section heads.
fn mark_h1s(fragment: &Html, rewrite: &mut Rewrite) {
    let h1s: Vec<NodeId> = fragment.select(&H1).map(|el| el.id()).collect();
    if h1s.len() < 3 {
        rewrite.skip.extend(h1s);
    } else {
        rewrite.rename.extend(h1s.into_iter().map(|id| (id, "h2")));
    }
}

fn mark_images(fragment: &Html, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&IMG) {
        if should_remove_image(&el) {
            skip.insert(el.id());
        }
    }
}

fn mark_empty(fragment: &Html, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&P) {
        if is_empty_paragraph(&el) {
            skip.insert(el.id());
        }
    }
}

/// Cleans candidate markup. The top-level elements of `html` are never
/// removed, only their descendants.
pub fn clean_article(html: &str, title: &str) -> String {
    let converted = convert_divs_to_paragraphs(html);
    let fragment = Html::parse_fragment(&converted);
    let keep = keep_ids(&fragment);

    let mut rewrite = Rewrite {
        filter_attrs: true,
        ..Default::default()
    };
    mark_stripped(&fragment, &mut rewrite.skip);
    mark_unlikely(&fragment, &keep, &mut rewrite.skip);
    mark_clean_conditionally(&fragment, &keep, &mut rewrite.skip);
    mark_headers(&fragment, title, &mut rewrite.skip);
    mark_h1s(&fragment, &mut rewrite);
    mark_images(&fragment, &mut rewrite.skip);
    mark_empty(&fragment, &mut rewrite.skip);

    let cleaned = rewrite.write_children(&fragment);
    rewrite_top_level(&brs_to_ps(&cleaned))
}
