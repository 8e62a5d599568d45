//! Route tables: the ordered `(name, method, pattern)` list the analyzer groups by.
//!
//! # Text format
//!
//! ```text
//! # name     method  pattern
//! index      GET     /
//! show       GET     /{id:[0-9]+}
//! create     POST    /
//! ```
//!
//! One route per line, fields separated by spaces or tabs. Blank lines and
//! lines starting with `#` are ignored. Order is priority: the first route whose
//! pattern matches a request wins.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// A route as declared in the application's router.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoutePattern {
    pub name: String,
    pub method: String,
    /// Path template in gorilla/mux syntax, e.g. `/users/{id:[0-9]+}`.
    pub pattern: String,
}

impl RoutePattern {
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            pattern: pattern.into(),
        }
    }
}

/// Reads a route table, as JSON when the file has a `.json` extension and in
/// the text format otherwise.
pub fn load_routes(path: &Path) -> Result<Vec<RoutePattern>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ReadRoutes {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_routes_json(&content)
    } else {
        parse_routes(&content)
    }
}

pub fn parse_routes_json(content: &str) -> Result<Vec<RoutePattern>> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_routes(content: &str) -> Result<Vec<RoutePattern>> {
    let mut routes = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let route = route_line.parse(line).map_err(|e| Error::ParseRoutes {
            line: i + 1,
            message: e.to_string(),
        })?;
        routes.push(route);
    }

    Ok(routes)
}

// ============ Winnow Parsers ============

fn blanks(input: &mut &str) -> ModalResult<()> {
    take_while(0.., (' ', '\t')).void().parse_next(input)
}

fn separator(input: &mut &str) -> ModalResult<()> {
    take_while(1.., (' ', '\t'))
        .void()
        .context(StrContext::Expected(StrContextValue::Description(
            "space or tab",
        )))
        .parse_next(input)
}

fn field<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_till(1.., |c: char| c == ' ' || c == '\t').parse_next(input)
}

fn route_line(input: &mut &str) -> ModalResult<RoutePattern> {
    blanks.parse_next(input)?;
    let name = field.context(StrContext::Label("route name")).parse_next(input)?;
    separator.parse_next(input)?;
    let method = field.context(StrContext::Label("method")).parse_next(input)?;
    separator.parse_next(input)?;
    let pattern = field.context(StrContext::Label("pattern")).parse_next(input)?;
    blanks.parse_next(input)?;

    Ok(RoutePattern::new(name, method, pattern))
}
