//! Source of the path-matching expression a router uses for a route pattern.
//!
//! Routers rarely expose the regular expression they compile a route into, so
//! this is the one seam that depends on router internals. Everything
//! downstream only sees [`PathRegexSource`]; switching routers or derivation
//! strategies means providing another implementation.

use aealanlys_mux::PatternError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The pattern is not valid syntax for the router.
    #[error(transparent)]
    Syntax(#[from] PatternError),
    /// The pattern is valid but its expression could not be obtained.
    #[error("{0}")]
    Introspection(String),
}

pub trait PathRegexSource {
    /// Returns the expression, including its leading `^`, that the router
    /// matches request paths against for `pattern`.
    fn path_regex(&self, pattern: &str) -> Result<String, ExtractError>;
}

/// Derives expressions with gorilla/mux's path template rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct MuxPathRegex;

impl PathRegexSource for MuxPathRegex {
    fn path_regex(&self, pattern: &str) -> Result<String, ExtractError> {
        Ok(aealanlys_mux::path_regex(pattern)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_path_regex() {
        assert_eq!(
            MuxPathRegex.path_regex("/{id:[0-9]+}").unwrap(),
            "^/(?P<v0>[0-9]+)$"
        );
    }

    #[test]
    fn test_mux_syntax_error() {
        assert!(matches!(
            MuxPathRegex.path_regex("/{id"),
            Err(ExtractError::Syntax(PatternError::UnbalancedBraces(_)))
        ));
    }
}
