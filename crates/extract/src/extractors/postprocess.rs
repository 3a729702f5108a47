// ABOUTME: Text postprocessors applied to extracted bylines and titles.
// ABOUTME: Strips attribution tokens and site-name suffixes, dropping values that are not real authors.

/// Leading tokens that introduce an author rather than being part of a name.
const BYLINE_PREFIXES: &[&str] = &["by ", "By ", "and "];

/// Separators that precede a site name or an annotation after the author.
const BYLINE_SEPARATORS: &[char] = &['/', '(', '|'];

/// Values that come out of a mis-extraction rather than a real byline.
const NON_AUTHOR_TOKENS: &[&str] = &["and", "By", ","];

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduces a raw byline to an author name.
///
/// Returns `None` when nothing usable remains.
pub fn simplify_byline(raw: &str) -> Option<String> {
    let mut byline = raw.trim_start();
    while let Some(rest) = BYLINE_PREFIXES
        .iter()
        .find_map(|prefix| byline.strip_prefix(prefix))
    {
        byline = rest.trim_start();
    }

    let byline = byline.trim_end();
    let byline = byline.strip_suffix(',').unwrap_or(byline);
    let byline = match byline.find(BYLINE_SEPARATORS) {
        Some(idx) => &byline[..idx],
        None => byline,
    };

    let simplified = normalize_whitespace(byline);
    if simplified.is_empty() || NON_AUTHOR_TOKENS.contains(&simplified.as_str()) {
        return None;
    }
    Some(simplified)
}

/// Simplifies every candidate, dropping rejects and repeated names.
pub fn simplify_bylines<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for candidate in raw {
        if let Some(name) = simplify_byline(candidate.as_ref()) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}

/// Drops a `| Site Name` suffix from a page title.
pub fn simplify_title(raw: &str) -> Option<String> {
    let title = match raw.find('|') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_attribution_prefixes() {
        assert_eq!(simplify_byline("By Jane Doe"), Some("Jane Doe".into()));
        assert_eq!(simplify_byline("by Jane Doe"), Some("Jane Doe".into()));
        assert_eq!(simplify_byline("and John Smith"), Some("John Smith".into()));
    }

    #[test]
    fn truncates_at_separators() {
        assert_eq!(
            simplify_byline("Jane Doe (Staff Writer)"),
            Some("Jane Doe".into())
        );
        assert_eq!(simplify_byline("Jane Doe / Reuters"), Some("Jane Doe".into()));
        assert_eq!(simplify_byline("Jane Doe | Example News"), Some("Jane Doe".into()));
    }

    #[test]
    fn strips_trailing_comma_and_collapses_whitespace() {
        assert_eq!(simplify_byline("  Jane \n  Doe,"), Some("Jane Doe".into()));
    }

    #[test]
    fn rejects_non_author_tokens() {
        assert_eq!(simplify_byline("By"), None);
        assert_eq!(simplify_byline("and"), None);
        assert_eq!(simplify_byline(","), None);
        assert_eq!(simplify_byline("   "), None);
    }

    #[test]
    fn byline_list_is_simplified_and_deduplicated() {
        let raw = ["By Jane Doe", "and John Smith", "By", "Jane Doe (Staff Writer)"];
        assert_eq!(
            simplify_bylines(&raw),
            vec!["Jane Doe".to_string(), "John Smith".to_string()]
        );
    }

    #[test]
    fn title_drops_site_suffix() {
        assert_eq!(
            simplify_title("Big News Today | Example News"),
            Some("Big News Today".into())
        );
        assert_eq!(simplify_title("  Plain title "), Some("Plain title".into()));
        assert_eq!(simplify_title("| Example News"), None);
    }
}
