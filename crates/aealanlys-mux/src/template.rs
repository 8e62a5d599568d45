//! Splitting of route templates into literal text and `{name:pattern}` variables.

use crate::PatternError;

/// A segment of a route template - either literal text or a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Variable { name: String, pattern: String },
}

/// Pattern used for `{name}` variables that carry no explicit pattern.
pub const DEFAULT_PATTERN: &str = "[^/]+";

/// Locates the outermost `{...}` pairs as `(start, end)` byte ranges, `end`
/// exclusive. Braces nested inside a variable belong to that variable.
fn brace_indices(template: &str) -> Result<Vec<(usize, usize)>, PatternError> {
    let mut level = 0usize;
    let mut start = 0;
    let mut indices = Vec::new();

    for (i, c) in template.char_indices() {
        match c {
            '{' => {
                level += 1;
                if level == 1 {
                    start = i;
                }
            }
            '}' => {
                if level == 0 {
                    return Err(PatternError::UnbalancedBraces(template.to_string()));
                }
                level -= 1;
                if level == 0 {
                    indices.push((start, i + 1));
                }
            }
            _ => {}
        }
    }

    if level != 0 {
        return Err(PatternError::UnbalancedBraces(template.to_string()));
    }
    Ok(indices)
}

pub fn parse_segments(template: &str) -> Result<Vec<Segment>, PatternError> {
    let mut result = Vec::new();
    let mut last_end = 0;

    for (start, end) in brace_indices(template)? {
        if start > last_end {
            result.push(Segment::Literal(template[last_end..start].to_string()));
        }

        let inner = &template[start + 1..end - 1];
        let (name, pattern) = match inner.split_once(':') {
            Some((name, pattern)) => (name, pattern),
            None => (inner, DEFAULT_PATTERN),
        };
        if name.is_empty() || pattern.is_empty() {
            return Err(PatternError::MissingNameOrPattern(
                template[start..end].to_string(),
            ));
        }
        result.push(Segment::Variable {
            name: name.to_string(),
            pattern: pattern.to_string(),
        });

        last_end = end;
    }

    if last_end < template.len() {
        result.push(Segment::Literal(template[last_end..].to_string()));
    }

    Ok(result)
}

/// Escapes the characters RE2's `QuoteMeta` escapes, and no others.
///
/// `regex::escape` also escapes `#`, `&`, `-` and `~`, which would make the
/// derived expression differ textually from the one the router builds.
pub fn quote_meta(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments_literal_only() {
        let segments = parse_segments("/users/list").unwrap();
        assert_eq!(segments, vec![Segment::Literal("/users/list".to_string())]);
    }

    #[test]
    fn test_parse_segments_default_pattern() {
        let segments = parse_segments("/users/{id}").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("/users/".to_string()),
                Segment::Variable {
                    name: "id".to_string(),
                    pattern: DEFAULT_PATTERN.to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_segments_nested_braces() {
        let segments = parse_segments("/{code:[A-Z]{3}}/x").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("/".to_string()),
                Segment::Variable {
                    name: "code".to_string(),
                    pattern: "[A-Z]{3}".to_string(),
                },
                Segment::Literal("/x".to_string()),
            ]
        );
    }

    #[test]
    fn test_pattern_keeps_later_colons() {
        let segments = parse_segments("/{t:a:b}").unwrap();
        assert_eq!(
            segments[1],
            Segment::Variable {
                name: "t".to_string(),
                pattern: "a:b".to_string(),
            }
        );
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            parse_segments("/users/{id"),
            Err(PatternError::UnbalancedBraces(_))
        ));
        assert!(matches!(
            parse_segments("/users/id}"),
            Err(PatternError::UnbalancedBraces(_))
        ));
    }

    #[test]
    fn test_missing_name_or_pattern() {
        assert!(matches!(
            parse_segments("/{:[0-9]+}"),
            Err(PatternError::MissingNameOrPattern(p)) if p == "{:[0-9]+}"
        ));
        assert!(matches!(
            parse_segments("/{id:}"),
            Err(PatternError::MissingNameOrPattern(_))
        ));
    }

    #[test]
    fn test_quote_meta() {
        assert_eq!(quote_meta("/a.b"), r"/a\.b");
        assert_eq!(quote_meta("/x-y~z#"), "/x-y~z#");
        assert_eq!(quote_meta("(v1)"), r"\(v1\)");
    }
}
