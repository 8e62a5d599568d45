//! Compilation of route tables into ordered `(group name, expression)` pairs.

use crate::error::{Error, Result};
use crate::extract::{ExtractError, MuxPathRegex, PathRegexSource};
use crate::route::RoutePattern;
use aealanlys_mux::PatternError;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Strips the query string: everything from the first `?`, slashes included.
/// `?` is written as a character class so the same expression works unchanged
/// inside a SQL string literal.
pub(crate) const QUERY_SUFFIX: &str = "[?].*$";

static QUERY_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QUERY_SUFFIX).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub name: String,
    /// Matches `"{METHOD} {path}"`, e.g. `^GET /(?P<v0>[0-9]+)$`.
    pub re: String,
}

/// A group name that a later pair's expression would rewrite again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub name: String,
    pub shadowed_by: String,
}

/// Ordered match pairs. Pair order is match priority: when several routes
/// match one request, the earliest wins.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    pairs: Vec<MatchPair>,
    regexes: Vec<Regex>,
}

/// Compiles `routes` using gorilla/mux path template rules.
pub fn compile(routes: &[RoutePattern]) -> Result<CompiledMatcher> {
    compile_with(&MuxPathRegex, routes)
}

/// Compiles `routes` in order. Fails on the first route whose expression
/// cannot be obtained; no partial matcher is returned.
pub fn compile_with<S: PathRegexSource + ?Sized>(
    source: &S,
    routes: &[RoutePattern],
) -> Result<CompiledMatcher> {
    let mut pairs = Vec::with_capacity(routes.len());
    let mut regexes = Vec::with_capacity(routes.len());

    for route in routes {
        let path_re = source
            .path_regex(&route.pattern)
            .map_err(|e| match e {
                ExtractError::Syntax(source) => Error::PatternCompilation {
                    route: route.name.clone(),
                    pattern: route.pattern.clone(),
                    source,
                },
                ExtractError::Introspection(reason) => Error::RouteIntrospection {
                    route: route.name.clone(),
                    pattern: route.pattern.clone(),
                    reason,
                },
            })?;

        let Some(unanchored) = path_re.strip_prefix('^') else {
            return Err(Error::RouteIntrospection {
                route: route.name.clone(),
                pattern: route.pattern.clone(),
                reason: format!("expression {:?} is not anchored with '^'", path_re),
            });
        };

        let re = format!("^{} {}", route.method.to_uppercase(), unanchored);
        let regex = Regex::new(&re).map_err(|source| Error::PatternCompilation {
            route: route.name.clone(),
            pattern: route.pattern.clone(),
            source: PatternError::InvalidRegex {
                regex: re.clone(),
                source,
            },
        })?;

        debug!(route = %route.name, re = %re, "compiled route");
        pairs.push(MatchPair {
            name: route.name.clone(),
            re,
        });
        regexes.push(regex);
    }

    Ok(CompiledMatcher { pairs, regexes })
}

impl CompiledMatcher {
    pub fn pairs(&self) -> &[MatchPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Evaluates the grouping function locally, exactly as the generated UDF
    /// does in BigQuery: query string stripped, then one substitution per pair
    /// in order. `method` is used as given.
    pub fn group_key(&self, method: &str, path: &str) -> String {
        let path = QUERY_SUFFIX_RE.replace_all(path, "");
        let mut key = format!("{} {}", method, path);
        for (pair, regex) in self.pairs.iter().zip(&self.regexes) {
            key = regex.replace_all(&key, NoExpand(&pair.name)).into_owned();
        }
        key
    }

    /// Group names that a later pair would match once substituted, breaking
    /// first-match-wins for requests resolved to that name.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut found = Vec::new();
        for (i, pair) in self.pairs.iter().enumerate() {
            for (later, regex) in self.pairs[i + 1..].iter().zip(&self.regexes[i + 1..]) {
                if regex.is_match(&pair.name) {
                    found.push(Collision {
                        name: pair.name.clone(),
                        shadowed_by: later.name.clone(),
                    });
                }
            }
        }
        found
    }
}
