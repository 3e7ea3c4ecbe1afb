//! # Common Foundation Crate
//!
//! Shared value model and error types for the styling engine. Every other
//! crate in the workspace maps its failures into [`StyleError`].

#![forbid(unsafe_code)]

pub mod value;

pub use value::{PropMap, Value};

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// ParseError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur when parsing selector or context path text.
///
/// Offsets are byte offsets into the original input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or contained only whitespace.
    #[error("selector is empty")]
    EmptySelector,
    /// A term started with a qualifier instead of a name (`.active`).
    #[error("missing name at offset {offset}")]
    MissingName { offset: usize },
    /// A `.` was not followed by a qualifier name (`Button.` or `Button..x`).
    #[error("empty variant qualifier at offset {offset}")]
    EmptyVariant { offset: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleError: top-level error type
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level error type every fallible engine operation returns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// A rule selector could not be parsed.
    #[error("invalid selector `{selector}`: {source}")]
    Selector {
        selector: String,
        #[source]
        source: ParseError,
    },
    /// A textual context path could not be parsed.
    #[error("invalid context path `{path}`: {source}")]
    Context {
        path: String,
        #[source]
        source: ParseError,
    },
    /// Mixin expansion re-entered a mixin that is still being expanded.
    #[error("cyclic mixin reference: {}", chain.join(" -> "))]
    CyclicMixin { chain: Vec<String> },
    /// Mixin expansion nested deeper than the configured limit.
    #[error("mixin expansion exceeded depth {limit} at `{name}`")]
    MixinDepthExceeded { name: String, limit: usize },
    /// Engine configuration was malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StyleError {
    pub fn selector(selector: impl Into<String>, source: ParseError) -> Self {
        Self::Selector {
            selector: selector.into(),
            source,
        }
    }

    pub fn context(path: impl Into<String>, source: ParseError) -> Self {
        Self::Context {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_mixin_message_lists_chain() {
        let err = StyleError::CyclicMixin {
            chain: vec!["bold".into(), "heavy".into(), "bold".into()],
        };
        assert_eq!(err.to_string(), "cyclic mixin reference: bold -> heavy -> bold");
    }

    #[test]
    fn selector_error_wraps_parse_error() {
        let err = StyleError::selector("Button.", ParseError::EmptyVariant { offset: 7 });
        assert_eq!(
            err.to_string(),
            "invalid selector `Button.`: empty variant qualifier at offset 7"
        );
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("empty variant qualifier at offset 7"));
    }
}
