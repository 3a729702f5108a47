// ABOUTME: Content scoring for the readability fallback: paragraph scores, class/id weights, link density.
// ABOUTME: Picks the best-scoring container and merges qualifying siblings into one content block.

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Class/id fragments that suggest article content.
const POSITIVE_HINTS: &[&str] = &[
    "article", "articlecontent", "instapaper_body", "blog", "body", "content", "entry", "hentry",
    "main", "Normal", "page", "pagination", "permalink", "post", "story", "text", "[-_]copy",
    r"\Bcopy",
];

/// Class/id fragments that suggest page furniture.
const NEGATIVE_HINTS: &[&str] = &[
    "adbox", "advert", "author", "bio", "bookmark", "bottom", "byline", "clear", "com-", "combx",
    "comment", "contact", "copy", "credit", "crumb", "date", "deck", "excerpt", "featured", "foot",
    "graf", "head", "info", "instapaper_ignore", "jump", "linebreak", "link", "masthead", "media",
    "meta", "modal", "outbrain", "promo", "pr_", "related", "respond", "roundcontent", "scroll",
    "secondary", "share", "shopping", "shoutbox", "side", "sponsor", "stamp", "sub", "summary",
    "tags", "tools", "widget",
];

fn hint_regex(hints: &[&str]) -> Regex {
    Regex::new(&format!("(?i){}", hints.join("|"))).unwrap()
}

static POSITIVE: Lazy<Regex> = Lazy::new(|| hint_regex(POSITIVE_HINTS));
static NEGATIVE: Lazy<Regex> = Lazy::new(|| hint_regex(NEGATIVE_HINTS));
static PHOTO: Lazy<Regex> = Lazy::new(|| hint_regex(&["figure", "photo", "image", "caption"]));
static ASSET: Lazy<Regex> = Lazy::new(|| hint_regex(&["entry-content-asset"]));

static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, pre").unwrap());
static ALL: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Containers known to hold an article in hNews markup, with the element
/// that marks them.
static HNEWS: Lazy<Vec<(Selector, Selector)>> = Lazy::new(|| {
    [
        (".hentry", ".entry-content"),
        (".entry", ".entry-content"),
        (".entry", ".entry_content"),
        (".post", ".postbody"),
        (".post", ".post_body"),
        (".post", ".post-body"),
        ("article", "[itemprop=articleBody]"),
    ]
    .iter()
    .map(|(container, marker)| {
        (
            Selector::parse(container).unwrap(),
            Selector::parse(&format!("{} {}", container, marker)).unwrap(),
        )
    })
    .collect()
});

const HNEWS_BOOST: i32 = 80;
const HINT_WEIGHT: i32 = 25;

/// Tags that never hold an article body on their own.
fn is_inline_or_void(tag: &str) -> bool {
    matches!(
        tag,
        "br" | "b" | "i" | "label" | "hr" | "area" | "base" | "basefont" | "input" | "img"
            | "link" | "meta"
    )
}

/// Prior score of an element from its tag alone; text-bearing tags are
/// scored by their text.
fn tag_score(element: &ElementRef) -> i32 {
    match element.value().name().to_lowercase().as_str() {
        "p" | "li" | "span" | "pre" => text_score(&element.text().collect::<String>()),
        "div" => 5,
        "td" | "blockquote" | "ol" | "ul" | "dl" => 3,
        "address" | "form" => -3,
        "th" => -5,
        _ => 0,
    }
}

/// Commas and length count for a paragraph; very short text counts against it.
fn text_score(text: &str) -> i32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }
    let chars = text.chars().count();
    let mut score = text.matches(',').count() as i32 + (chars / 50) as i32;
    match chars {
        0..=19 => score -= 10,
        50..=200 => score += 5,
        _ => {}
    }
    score
}

/// Class and id weighting from content and furniture hints.
pub fn get_weight(element: &ElementRef) -> i32 {
    let hinted = |value: &str| match (POSITIVE.is_match(value), NEGATIVE.is_match(value)) {
        (true, false) => HINT_WEIGHT,
        (false, true) => -HINT_WEIGHT,
        _ => 0,
    };
    let id = element.value().attr("id").unwrap_or_default();
    let class = element.value().attr("class").unwrap_or_default();

    let mut weight = if id.is_empty() { 0 } else { hinted(id) };
    if !class.is_empty() {
        // A decisive id wins over the class.
        if weight == 0 {
            weight = hinted(class);
        }
        if PHOTO.is_match(class) {
            weight += 10;
        }
        if ASSET.is_match(class) {
            weight += HINT_WEIGHT;
        }
    }
    weight
}

/// Share of an element's text that sits inside links.
pub fn link_density(element: &ElementRef) -> f64 {
    let text_len: usize = element.text().map(str::len).sum();
    if text_len == 0 {
        return 0.0;
    }
    let link_len: usize = element
        .select(&LINKS)
        .flat_map(|link| link.text())
        .map(str::len)
        .sum();
    link_len as f64 / text_len as f64
}

pub fn has_sentence_end(text: &str) -> bool {
    text.trim_end()
        .ends_with(['.', '!', '?', ':', ';'])
}

/// Collapses runs of whitespace to single spaces and trims.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accumulated scores for the elements of one page.
#[derive(Debug, Default)]
pub struct Scorer {
    scores: HashMap<NodeId, i32>,
    weighted: bool,
}

impl Scorer {
    /// With `weighted`, class and id hints add to every element's prior.
    pub fn new(weighted: bool) -> Self {
        Self {
            scores: HashMap::new(),
            weighted,
        }
    }

    pub fn get(&self, element: &ElementRef) -> i32 {
        self.scores.get(&element.id()).copied().unwrap_or(0)
    }

    fn is_scored(&self, element: &ElementRef) -> bool {
        self.scores.contains_key(&element.id())
    }

    /// The element's current score, or its prior when unscored. Computing a
    /// prior leaks a quarter of it into the parent.
    fn prior(&mut self, element: &ElementRef) -> i32 {
        let current = self.get(element);
        if current != 0 {
            return current;
        }
        let mut prior = tag_score(element);
        if self.weighted {
            prior += get_weight(element);
        }
        if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
            let leaked = self.get(&parent) + (prior as f64 * 0.25) as i32;
            self.scores.insert(parent.id(), leaked);
        }
        prior
    }

    fn add(&mut self, element: &ElementRef, amount: i32) {
        let total = self.prior(element) + amount;
        self.scores.insert(element.id(), total);
    }

    /// Scores a whole page: hNews containers first, then each paragraph
    /// feeds its parent in full and its grandparent by half.
    pub fn score_page(mut self, doc: &Html) -> Self {
        for (container, marked) in HNEWS.iter() {
            for marker in doc.select(marked) {
                if let Some(found) = marker
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|ancestor| container.matches(ancestor))
                {
                    self.add(&found, HNEWS_BOOST);
                }
            }
        }

        // Two rounds so parents scored late in the first round still feed up.
        for _ in 0..2 {
            for paragraph in doc.select(&PARAGRAPHS) {
                if self.is_scored(&paragraph) {
                    continue;
                }
                let own = self.prior(&paragraph);
                self.scores.insert(paragraph.id(), own);

                let contribution = tag_score(&paragraph);
                let Some(parent) = paragraph.parent().and_then(ElementRef::wrap) else {
                    continue;
                };
                self.add(&parent, contribution);
                if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                    self.add(&grandparent, contribution / 2);
                }
            }
        }
        self
    }

    /// Highest scorer after discounting link-heavy elements, else `<body>`.
    pub fn top_candidate<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        let mut best: Option<(ElementRef<'a>, i32)> = None;
        for element in doc.select(&ALL) {
            let Some(&score) = self.scores.get(&element.id()) else {
                continue;
            };
            let tag = element.value().name().to_lowercase();
            if tag == "body" || is_inline_or_void(&tag) {
                continue;
            }
            let density = link_density(&element);
            let adjusted = if density > 0.5 {
                (score as f64 * (1.0 - density)).round() as i32
            } else {
                score
            };
            if adjusted > best.map_or(0, |(_, top)| top) {
                best = Some((element, adjusted));
            }
        }
        best.map(|(element, _)| element)
            .or_else(|| doc.select(&BODY).next())
    }

    /// Returns true if `sibling` of `candidate` reads like more of the same article.
    fn belongs_with(&self, sibling: &ElementRef, candidate: &ElementRef, top: i32) -> bool {
        let tag = sibling.value().name().to_lowercase();
        let score = self.get(sibling);
        if is_inline_or_void(&tag) || score <= 0 {
            return false;
        }
        let density = link_density(sibling);
        if density >= 0.5 {
            return false;
        }

        let mut bonus = if density < 0.05 { 20 } else { 0 };
        let class = sibling.value().attr("class").unwrap_or_default();
        if !class.is_empty() && Some(class) == candidate.value().attr("class") {
            bonus += (top as f64 * 0.2) as i32;
        }
        let threshold = 10.max((top as f64 * 0.25) as i32);
        if score + bonus >= threshold {
            return true;
        }

        tag == "p" && {
            let text = sibling.text().collect::<String>();
            let len = normalize_spaces(&text).chars().count();
            if len > 80 {
                density < 0.25
            } else {
                density == 0.0 && has_sentence_end(&text)
            }
        }
    }

    /// Markup of `candidate` plus its article-like siblings, wrapped in a
    /// `<div>` when any siblings joined.
    pub fn merge_siblings(&self, candidate: ElementRef) -> String {
        let Some(parent) = candidate.parent() else {
            return candidate.html();
        };
        let top = self.get(&candidate);
        let merged: Vec<ElementRef> = parent
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|sibling| {
                sibling.id() == candidate.id() || self.belongs_with(sibling, &candidate, top)
            })
            .collect();

        if merged.len() <= 1 {
            return candidate.html();
        }
        let inner: String = merged.iter().map(|element| element.html()).collect();
        format!("<div>{}</div>", inner)
    }
}

/// Scores the page and returns the merged markup of its main content.
pub fn extract_best_content(doc: &Html) -> Option<String> {
    let scorer = Scorer::new(true).score_page(doc);
    let candidate = scorer.top_candidate(doc)?;
    Some(scorer.merge_siblings(candidate))
}
