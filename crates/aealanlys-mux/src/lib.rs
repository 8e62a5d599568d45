//! Path-matching regular expressions for gorilla/mux route templates.
//!
//! A route template such as `/users/{id:[0-9]+}` is matched by gorilla/mux
//! against request paths through a regular expression it builds internally and
//! never exposes. This crate derives the same expression from the same rules,
//! so the result can be reused outside the router (for instance inside a
//! BigQuery `REGEXP_REPLACE`).
//!
//! # Example
//!
//! ```
//! use aealanlys_mux::path_regex;
//!
//! assert_eq!(path_regex("/").unwrap(), "^/$");
//! assert_eq!(
//!     path_regex("/users/{id:[0-9]+}").unwrap(),
//!     "^/users/(?P<v0>[0-9]+)$"
//! );
//! assert_eq!(path_regex("/{slug}").unwrap(), "^/(?P<v0>[^/]+)$");
//! ```

mod template;

pub use template::{parse_segments, quote_meta, Segment, DEFAULT_PATTERN};

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("path must start with a slash, got {0:?}")]
    NotAbsolute(String),
    #[error("unbalanced braces in {0:?}")]
    UnbalancedBraces(String),
    #[error("missing name or pattern in {0:?}")]
    MissingNameOrPattern(String),
    #[error("capture groups in {0:?}, only non-capturing groups are accepted")]
    CaptureGroups(String),
    #[error("invalid regular expression {regex:?}: {source}")]
    InvalidRegex {
        regex: String,
        #[source]
        source: regex::Error,
    },
}

/// Builds the expression gorilla/mux uses to match a request path against
/// `template`: anchored at both ends, literals quoted, the i-th variable as the
/// named group `v{i}`.
pub fn path_regex(template: &str) -> Result<String, PatternError> {
    if !template.is_empty() && !template.starts_with('/') {
        return Err(PatternError::NotAbsolute(template.to_string()));
    }

    let mut regex_str = String::from("^");
    let mut index = 0;

    for segment in parse_segments(template)? {
        match segment {
            Segment::Literal(text) => regex_str.push_str(&quote_meta(&text)),
            Segment::Variable { pattern, .. } => {
                check_regex(&format!("^{}$", pattern))?;
                regex_str.push_str(&format!("(?P<v{}>{})", index, pattern));
                index += 1;
            }
        }
    }
    regex_str.push('$');

    // Group 0 is the whole match.
    if check_regex(&regex_str)?.captures_len() - 1 != index {
        return Err(PatternError::CaptureGroups(template.to_string()));
    }
    Ok(regex_str)
}

fn check_regex(regex: &str) -> Result<Regex, PatternError> {
    Regex::new(regex).map_err(|source| PatternError::InvalidRegex {
        regex: regex.to_string(),
        source,
    })
}
