// ABOUTME: Evaluates one ExtractionSpec against a Document and reduces the matches by match rule.
// ABOUTME: Expected absence and unsupported rules yield None; only missing required keys are errors.

//! Rule-based element selection.
//!
//! Key behaviors:
//! - Matches are serialized in document order and trimmed.
//! - Removal expressions operate on copies of each match; the document is
//!   never mutated.
//! - An optional postprocessor runs on every item, dropping rejects.
//! - Zero matches, empty results, unknown select methods or match rules and
//!   invalid expressions all produce `None`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::ExtractError;
use crate::extractors::spec::{ExtractionSpec, MatchRule, SelectMethod};

/// A text postprocessor; returning `None` drops the item.
pub type Postprocess<'a> = &'a dyn Fn(&str) -> Option<String>;

/// The reduced value of a spec: one string, or a list for `match_rule: all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extracted {
    Single(String),
    All(Vec<String>),
}

impl Extracted {
    /// The single value, or the list joined with `sep`.
    pub fn join(&self, sep: &str) -> String {
        match self {
            Extracted::Single(value) => value.clone(),
            Extracted::All(values) => values.join(sep),
        }
    }

    /// Every value as a list.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Extracted::Single(value) => vec![value],
            Extracted::All(values) => values,
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Extracted::Single(value) => Some(value),
            Extracted::All(_) => None,
        }
    }
}

/// Extracts the value described by `spec` from `doc`.
///
/// Returns an error only when `select_method` or `select_expression` is
/// missing from the spec.
pub fn extract_element(
    doc: &Document,
    spec: &ExtractionSpec,
    postprocess: Option<Postprocess<'_>>,
) -> Result<Option<Extracted>, ExtractError> {
    let method = spec.method()?;
    let expression = spec.expression()?;

    if let SelectMethod::Unknown(name) = method {
        debug!(select_method = %name, expression, "unsupported select method");
        return Ok(None);
    }

    let items = match doc.select(expression, &spec.remove_expressions) {
        Ok(items) => items,
        Err(err) if err.is_expression() => {
            debug!(url = doc.url(), expression, error = %err, "invalid select expression");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let mut items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
    if let Some(postprocess) = postprocess {
        items = items
            .iter()
            .filter_map(|item| postprocess(item))
            .filter(|item| !item.is_empty())
            .collect();
    }

    if items.is_empty() {
        if spec.warn_if_missing {
            warn!(
                url = doc.url(),
                expression,
                match_rule = %spec.match_rule,
                "no element found"
            );
        }
        return Ok(None);
    }

    Ok(reduce(items, spec, doc.url()))
}

fn reduce(mut items: Vec<String>, spec: &ExtractionSpec, url: &str) -> Option<Extracted> {
    let value = match &spec.match_rule {
        MatchRule::Single => {
            if items.len() != 1 && spec.warn_if_missing {
                warn!(
                    url,
                    expression = spec.select_expression.as_deref().unwrap_or_default(),
                    count = items.len(),
                    "expected a single element"
                );
            }
            items.swap_remove(0)
        }
        MatchRule::First => items.swap_remove(0),
        MatchRule::Last => items.pop()?,
        MatchRule::Largest => {
            // Longest by characters, not bytes; ties go to the first.
            let mut best = 0;
            let mut best_len = 0;
            for (idx, item) in items.iter().enumerate() {
                let len = item.chars().count();
                if len > best_len {
                    best = idx;
                    best_len = len;
                }
            }
            items.swap_remove(best)
        }
        MatchRule::Concatenate => items.concat(),
        MatchRule::CommaJoin => non_empty(&items).join(", "),
        MatchRule::ConcatenateWithSpace => non_empty(&items).join(" "),
        MatchRule::Group => format!("<div>{}</div>", items.concat()),
        MatchRule::All => return Some(Extracted::All(items)),
        MatchRule::Unknown(name) => {
            debug!(
                url,
                match_rule = %name,
                "unknown match rule"
            );
            return None;
        }
    };

    if value.is_empty() {
        None
    } else {
        Some(Extracted::Single(value))
    }
}

fn non_empty(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(String::as_str)
        .filter(|item| !item.is_empty())
        .collect()
}
