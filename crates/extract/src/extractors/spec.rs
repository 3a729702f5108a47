// ABOUTME: Declarative extraction rule data models: ExtractionSpec, SelectMethod and MatchRule.
// ABOUTME: Unknown rule names are retained so extraction can fail closed instead of refusing the config.

//! Extraction rule definitions.
//!
//! An [`ExtractionSpec`] selects nodes with an expression, optionally removes
//! sub-nodes from copies of each match, and reduces the matches to a final
//! value according to its [`MatchRule`]. Specs are deserialized from site
//! configuration files, so the required keys are kept optional here and
//! validated when the spec is used.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ExtractError;

/// How a spec's expression addresses nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectMethod {
    Xpath,
    /// Any method name this engine does not support.
    Unknown(String),
}

impl From<String> for SelectMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "xpath" => SelectMethod::Xpath,
            _ => SelectMethod::Unknown(value),
        }
    }
}

impl From<SelectMethod> for String {
    fn from(value: SelectMethod) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SelectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectMethod::Xpath => write!(f, "xpath"),
            SelectMethod::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// Policy for collapsing the list of matches into the final value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchRule {
    /// First match, warning when there is not exactly one.
    #[default]
    Single,
    First,
    Last,
    /// Longest serialized match; the earliest wins a tie.
    Largest,
    Concatenate,
    CommaJoin,
    ConcatenateWithSpace,
    /// All matches wrapped in one `<div>`.
    Group,
    /// Every match as a list.
    All,
    /// Any rule name this engine does not support.
    Unknown(String),
}

impl From<String> for MatchRule {
    fn from(value: String) -> Self {
        match value.as_str() {
            "single" => MatchRule::Single,
            "first" => MatchRule::First,
            "last" => MatchRule::Last,
            "largest" => MatchRule::Largest,
            "concatenate" => MatchRule::Concatenate,
            "comma_join" => MatchRule::CommaJoin,
            "concatenate_with_space" => MatchRule::ConcatenateWithSpace,
            "group" => MatchRule::Group,
            "all" => MatchRule::All,
            _ => MatchRule::Unknown(value),
        }
    }
}

impl From<MatchRule> for String {
    fn from(value: MatchRule) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchRule::Single => "single",
            MatchRule::First => "first",
            MatchRule::Last => "last",
            MatchRule::Largest => "largest",
            MatchRule::Concatenate => "concatenate",
            MatchRule::CommaJoin => "comma_join",
            MatchRule::ConcatenateWithSpace => "concatenate_with_space",
            MatchRule::Group => "group",
            MatchRule::All => "all",
            MatchRule::Unknown(name) => name,
        };
        write!(f, "{}", s)
    }
}

fn default_true() -> bool {
    true
}

/// Configuration for extracting a single value from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSpec {
    /// Required; absence is a configuration error reported at extraction time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_method: Option<SelectMethod>,
    /// Required; absence is a configuration error reported at extraction time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_expression: Option<String>,
    #[serde(default)]
    pub match_rule: MatchRule,
    /// Log when nothing (or, for `single`, more than one thing) matches.
    #[serde(default = "default_true")]
    pub warn_if_missing: bool,
    /// Expressions whose hits are removed from copies of each match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_expressions: Vec<String>,
}

impl Default for ExtractionSpec {
    fn default() -> Self {
        Self {
            select_method: None,
            select_expression: None,
            match_rule: MatchRule::default(),
            warn_if_missing: true,
            remove_expressions: Vec::new(),
        }
    }
}

impl ExtractionSpec {
    /// Builds an XPath spec with the given rule, warning on missing matches.
    pub fn xpath(expression: impl Into<String>, match_rule: MatchRule) -> Self {
        Self {
            select_method: Some(SelectMethod::Xpath),
            select_expression: Some(expression.into()),
            match_rule,
            ..Default::default()
        }
    }

    /// Sets `warn_if_missing`.
    pub fn warn_if_missing(mut self, warn: bool) -> Self {
        self.warn_if_missing = warn;
        self
    }

    /// Appends a removal expression.
    pub fn remove(mut self, expression: impl Into<String>) -> Self {
        self.remove_expressions.push(expression.into());
        self
    }

    /// Returns the select method or a MissingKey error.
    pub fn method(&self) -> Result<&SelectMethod, ExtractError> {
        self.select_method
            .as_ref()
            .ok_or_else(|| ExtractError::missing_key("select_method", "ExtractElement"))
    }

    /// Returns the select expression or a MissingKey error.
    pub fn expression(&self) -> Result<&str, ExtractError> {
        self.select_expression
            .as_deref()
            .ok_or_else(|| ExtractError::missing_key("select_expression", "ExtractElement"))
    }
}

/// A spec for the publication date with the formats its text is written in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatetimeSpec {
    #[serde(flatten)]
    pub spec: ExtractionSpec,
    /// Format hints tried in order; empty means ISO-8601.
    #[serde(
        default,
        alias = "datetime-format",
        alias = "datetime_format",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub datetime_formats: Vec<String>,
    /// Keep the UTC offset in the normalized value.
    #[serde(default)]
    pub timezone: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts either a single string or a list of strings.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) if value.is_empty() => Vec::new(),
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
