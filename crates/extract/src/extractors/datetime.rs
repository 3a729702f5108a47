// ABOUTME: Normalizes extracted date text to ISO-8601 using configured format hints.
// ABOUTME: Falls back to ISO parsing and a fuzzy scan; unparseable dates become None.

//! Publication datetime normalization.
//!
//! Site configurations describe dates with arrow-style tokens (`YYYY`, `MMMM`,
//! `Do`, `hh:mm A`). These are translated to chrono format strings and tried
//! in order, first against the whole text and then against any substring
//! shaped like the hint. When none match, the raw text is scanned for
//! anything that looks like a date before giving up.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::spec::DatetimeSpec;

const AWARE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());

/// Date-looking fragments inside longer text.
static DATE_FRAGMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{4}-\d{1,2}-\d{1,2}(?:[T ]\d{1,2}:\d{2}(?::\d{2})?(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?)?",
        r"(?i)\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+\d{4}",
        r"(?i)(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}",
        r"\d{1,2}/\d{1,2}/\d{4}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Loose human-readable patterns tried before the generic parser.
const LOOSE_PATTERNS: &[&str] = &[
    "%b %e, %Y",
    "%e %b %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %e, %Y",
    "%e %B %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// A parsed instant, with or without a known UTC offset.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Parsed {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Parsed {
    fn year(&self) -> i32 {
        use chrono::Datelike;
        match self {
            Parsed::Aware(dt) => dt.year(),
            Parsed::Naive(dt) => dt.year(),
        }
    }

    /// Aware values keep their wall-clock time when the offset is dropped;
    /// naive values are taken to be UTC when an offset is requested.
    fn render(&self, timezone: bool) -> String {
        match (self, timezone) {
            (Parsed::Aware(dt), true) => dt.format(AWARE_FORMAT).to_string(),
            (Parsed::Aware(dt), false) => dt.naive_local().format(NAIVE_FORMAT).to_string(),
            (Parsed::Naive(dt), true) => format!("{}+00:00", dt.format(NAIVE_FORMAT)),
            (Parsed::Naive(dt), false) => dt.format(NAIVE_FORMAT).to_string(),
        }
    }
}

/// Normalizes date text from a page using a set of configured formats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatetimeNormalizer {
    pub formats: Vec<String>,
    pub timezone: bool,
}

impl DatetimeNormalizer {
    pub fn new(formats: Vec<String>, timezone: bool) -> Self {
        Self { formats, timezone }
    }

    pub fn from_spec(spec: &DatetimeSpec) -> Self {
        Self::new(spec.datetime_formats.clone(), spec.timezone)
    }

    pub fn normalize(&self, raw: &str) -> Option<String> {
        normalize(raw, &self.formats, self.timezone)
    }
}

/// Parses `raw` and renders it as ISO-8601.
///
/// With `timezone` the output carries a `+HH:MM` offset; without it the
/// output is the wall-clock time with no offset. Returns `None` when the text
/// cannot be read as a date in any configured or fallback format.
pub fn normalize(raw: &str, formats: &[String], timezone: bool) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = if formats.is_empty() {
        parse_iso(raw)
    } else {
        formats.iter().find_map(|format| parse_with_format(raw, format))
    };

    match parsed.or_else(|| parse_fuzzy(raw)) {
        Some(parsed) => Some(parsed.render(timezone)),
        None => {
            tracing::debug!(raw, ?formats, "unable to parse datetime");
            None
        }
    }
}

fn parse_iso(raw: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Parsed::Aware(dt));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, pattern) {
            return Some(Parsed::Aware(dt));
        }
    }
    for pattern in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(Parsed::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Parsed::Naive(date.and_time(NaiveTime::MIN)))
}

fn parse_with_format(raw: &str, format: &str) -> Option<Parsed> {
    match format {
        "X" | "unix" => return parse_unix(raw, 0),
        "x" | "unix_ms" => return parse_unix(raw, 3),
        _ => {}
    }

    // A two-digit-year hint also accepts four-digit years, tried first so
    // `2005` is not read as `20` followed by junk.
    if let Some(wide) = widen_two_digit_year(format) {
        if let Some(parsed) = parse_hinted(raw, &compile_hint(&wide)) {
            if parsed.year() >= 1000 {
                return Some(parsed);
            }
        }
    }
    parse_hinted(raw, &compile_hint(format))
}

/// Parses the whole text with the hint, else the first run of text that
/// has the hint's shape.
fn parse_hinted(raw: &str, hint: &Hint) -> Option<Parsed> {
    let input = if hint.ordinals {
        ORDINAL_SUFFIX.replace_all(raw, "$1").into_owned()
    } else {
        raw.to_string()
    };
    let input = input.trim();

    parse_pattern(input, &hint.pattern).or_else(|| {
        hint.search.as_ref()?.captures_iter(input).find_map(|caps| {
            let found = caps.get(1)?;
            parse_pattern(found.as_str(), &hint.pattern)
        })
    })
}

fn parse_unix(raw: &str, drop_digits: usize) -> Option<Parsed> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let secs = &digits[..digits.len().saturating_sub(drop_digits)];
    let secs: i64 = if secs.is_empty() { 0 } else { secs.parse().ok()? };
    DateTime::from_timestamp(secs, 0).map(|dt| Parsed::Aware(dt.fixed_offset()))
}

fn parse_pattern(input: &str, pattern: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_str(input, pattern) {
        return Some(Parsed::Aware(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, pattern) {
        return Some(Parsed::Naive(dt));
    }
    NaiveDate::parse_from_str(input, pattern)
        .ok()
        .map(|date| Parsed::Naive(date.and_time(NaiveTime::MIN)))
}

/// Rewrites a `YY` at the start or end of a hint, next to a date
/// separator, as `YYYY`.
fn widen_two_digit_year(format: &str) -> Option<String> {
    let is_sep = |c: char| matches!(c, '/' | '-' | '.' | ' ');
    if let Some(rest) = format.strip_prefix("YY") {
        if rest.starts_with(is_sep) {
            return Some(format!("YYYY{}", rest));
        }
    }
    if let Some(head) = format.strip_suffix("YY") {
        if head.ends_with(is_sep) {
            return Some(format!("{}YYYY", head));
        }
    }
    None
}

/// Token table, longest tokens first so `MMMM` wins over `MM`: the arrow
/// token, its chrono specifier and the text shape it matches.
const TOKENS: &[(&str, &str, &str)] = &[
    ("YYYY", "%Y", r"\d{4}"),
    ("YY", "%y", r"\d{2}"),
    ("MMMM", "%B", r"[A-Za-z]+"),
    ("MMM", "%b", r"[A-Za-z]{3}"),
    ("MM", "%m", r"\d{2}"),
    ("M", "%m", r"\d{1,2}"),
    ("DDDD", "%j", r"\d{3}"),
    ("DDD", "%j", r"\d{1,3}"),
    ("DD", "%d", r"\d{2}"),
    ("Do", "%d", r"\d{1,2}"),
    ("D", "%d", r"\d{1,2}"),
    ("dddd", "%A", r"[A-Za-z]+"),
    ("ddd", "%a", r"[A-Za-z]{3}"),
    ("d", "%u", r"\d"),
    ("HH", "%H", r"\d{2}"),
    ("H", "%H", r"\d{1,2}"),
    ("hh", "%I", r"\d{2}"),
    ("h", "%I", r"\d{1,2}"),
    ("mm", "%M", r"\d{2}"),
    ("m", "%M", r"\d{1,2}"),
    ("ss", "%S", r"\d{2}"),
    ("s", "%S", r"\d{1,2}"),
    ("A", "%p", r"[AaPp][Mm]"),
    ("a", "%p", r"[AaPp][Mm]"),
    ("ZZ", "%:z", r"(?:Z|[+-]\d{2}:?\d{2})"),
    ("Z", "%z", r"(?:Z|[+-]\d{2}:?\d{2})"),
];

/// A format hint translated for chrono, plus a regex finding text of the
/// same shape inside a longer string.
#[derive(Debug, Clone)]
struct Hint {
    pattern: String,
    search: Option<Regex>,
    /// Set for ordinal days (`Do`), whose suffixes are stripped from the input.
    ordinals: bool,
}

fn compile_hint(format: &str) -> Hint {
    let mut pattern = String::with_capacity(format.len() * 2);
    let mut shape = String::new();
    let mut ordinals = false;
    let mut rest = format;

    'outer: while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                push_literal(&mut pattern, &mut shape, &rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }
        if c == 'S' {
            let run = rest.chars().take_while(|&ch| ch == 'S').count();
            pattern.push_str("%f");
            shape.push_str(r"\d+");
            rest = &rest[run..];
            continue;
        }
        for (token, specifier, token_shape) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                ordinals |= *token == "Do";
                pattern.push_str(specifier);
                shape.push_str(token_shape);
                rest = tail;
                continue 'outer;
            }
        }
        push_literal(&mut pattern, &mut shape, &rest[..c.len_utf8()]);
        rest = &rest[c.len_utf8()..];
    }

    // Digits on either side would mean the match is part of a longer number.
    let search = Regex::new(&format!(r"(?:^|\D)({})(?:\D|$)", shape)).ok();
    Hint {
        pattern,
        search,
        ordinals,
    }
}

fn push_literal(pattern: &mut String, shape: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '%' {
            pattern.push_str("%%");
        } else {
            pattern.push(c);
        }
        if c.is_whitespace() {
            shape.push_str(r"\s+");
        } else {
            shape.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
}

/// Last-chance parsing for free text that contains a date somewhere.
fn parse_fuzzy(raw: &str) -> Option<Parsed> {
    let cleaned = ORDINAL_SUFFIX.replace_all(raw, "$1");
    let cleaned = cleaned.trim();

    if let Some(parsed) = parse_loose(cleaned) {
        return Some(parsed);
    }
    if let Some(parsed) = parse_generic(cleaned) {
        return Some(parsed);
    }

    DATE_FRAGMENTS.iter().find_map(|pattern| {
        pattern.find(cleaned).and_then(|m| {
            let fragment = m.as_str().trim_end_matches(['.', ',']);
            parse_iso(fragment)
                .or_else(|| parse_loose(fragment))
                .or_else(|| parse_generic(fragment))
        })
    })
}

fn parse_loose(value: &str) -> Option<Parsed> {
    let value = value.replace('.', "");
    LOOSE_PATTERNS.iter().find_map(|pattern| {
        NaiveDate::parse_from_str(&value, pattern)
            .ok()
            .map(|date| Parsed::Naive(date.and_time(NaiveTime::MIN)))
    })
}

fn parse_generic(value: &str) -> Option<Parsed> {
    dateparser::parse_with(value, &Utc, NaiveTime::MIN)
        .ok()
        .map(|dt| Parsed::Naive(dt.naive_utc()))
}
