// ABOUTME: Error types for the extraction engine including ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A required key is missing from an extraction spec.
    MissingKey,
    /// A site configuration could not be read, parsed or compiled.
    Config,
    /// A document could not be built from the given input.
    Document,
    /// An XPath expression could not be evaluated.
    Expression,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MissingKey => "missing key",
            ErrorCode::Config => "config error",
            ErrorCode::Document => "document error",
            ErrorCode::Expression => "expression error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction operations.
///
/// `field` names the thing that failed: a spec key, a site name, a URL or an
/// expression, depending on the code.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub field: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "misinfo: {} {}: {}", self.op, self.field, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    /// Create a MissingKey error.
    pub fn missing_key(field: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::MissingKey,
            field: field.into(),
            op: op.into(),
            source: None,
        }
    }

    /// Create a Config error.
    pub fn config(
        field: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Config,
            field: field.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Document error.
    pub fn document(
        field: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Document,
            field: field.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an Expression error.
    pub fn expression(
        field: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Expression,
            field: field.into(),
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a MissingKey error.
    pub fn is_missing_key(&self) -> bool {
        self.code == ErrorCode::MissingKey
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is a Document error.
    pub fn is_document(&self) -> bool {
        self.code == ErrorCode::Document
    }

    /// Returns true if this is an Expression error.
    pub fn is_expression(&self) -> bool {
        self.code == ErrorCode::Expression
    }
}
