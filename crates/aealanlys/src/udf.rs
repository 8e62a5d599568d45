//! BigQuery UDF generation for compiled matchers.
//!
//! The generated function is a chain of nested `REGEXP_REPLACE` calls, one per
//! match pair, applied innermost first. Once a pair rewrites the key to its
//! group name, later pairs no longer match, which gives first-match-wins
//! without any branching in SQL. With no match the key stays
//! `"{method} {path}"`.
//!
//! Route names and expressions are written into SQL string literals as they
//! are. They come from the application's own route table and must not contain
//! `"`. Backslashes are not doubled either, so a quoted literal dot (`\.`) or
//! a class escape such as `\d` becomes an invalid escape sequence inside the
//! double-quoted BigQuery literal and the generated UDF will not parse. Route
//! tables used here avoid literal regex metacharacters and write classes in
//! bracket form (`[0-9]`).

use crate::matcher::{CompiledMatcher, QUERY_SUFFIX};

/// Name of the substitution helper defined ahead of every grouping function.
pub const REPLACE_HELPER: &str = "RR";

/// Renders the helper and the grouping function `name(m STRING, p STRING)`.
pub fn render(name: &str, matcher: &CompiledMatcher) -> String {
    let mut out = format!(
        "CREATE TEMPORARY FUNCTION {rr}(v STRING,rx STRING,re STRING) AS (REGEXP_REPLACE(v,rx,re));",
        rr = REPLACE_HELPER
    );
    out.push_str(&format!(
        "CREATE TEMPORARY FUNCTION {}(m STRING,p STRING) AS (",
        name
    ));

    let mut body = format!(
        r#"CONCAT(m," ",{}(p,"{}",""))"#,
        REPLACE_HELPER, QUERY_SUFFIX
    );
    for pair in matcher.pairs() {
        body = format!(
            r#"{}({},"{}","{}")"#,
            REPLACE_HELPER, body, pair.re, pair.name
        );
    }

    out.push_str(&body);
    out.push_str(");");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::compile;
    use crate::route::RoutePattern;

    fn index_show() -> CompiledMatcher {
        compile(&[
            RoutePattern::new("index", "GET", "/"),
            RoutePattern::new("show", "GET", "/{id:[0-9]+}"),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_known_output() {
        let expected = r#"CREATE TEMPORARY FUNCTION RR(v STRING,rx STRING,re STRING) AS (REGEXP_REPLACE(v,rx,re));CREATE TEMPORARY FUNCTION F(m STRING,p STRING) AS (RR(RR(CONCAT(m," ",RR(p,"[?].*$","")),"^GET /$","index"),"^GET /(?P<v0>[0-9]+)$","show"));"#;
        assert_eq!(render("F", &index_show()), expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let matcher = index_show();
        assert_eq!(render("PTN", &matcher), render("PTN", &matcher));
        assert_eq!(render("PTN", &matcher), render("PTN", &index_show()));
    }

    #[test]
    fn test_render_empty_matcher_is_fallback_only() {
        let matcher = compile(&[]).unwrap();
        assert!(render("F", &matcher)
            .ends_with(r#"AS (CONCAT(m," ",RR(p,"[?].*$","")));"#));
    }

    #[test]
    fn test_render_nests_in_route_order() {
        let matcher = compile(&[
            RoutePattern::new("b", "GET", "/b"),
            RoutePattern::new("a", "POST", "/a"),
        ])
        .unwrap();
        let udf = render("F", &matcher);
        let b = udf.find(r#""^GET /b$","b""#).unwrap();
        let a = udf.find(r#""^POST /a$","a""#).unwrap();
        // Innermost call is applied first and appears first in the text.
        assert!(b < a);
        assert!(udf.contains(r#"AS (RR(RR(CONCAT("#));
    }

    #[test]
    fn test_render_does_not_escape_backslashes() {
        let matcher = compile(&[
            RoutePattern::new("files.show", "GET", "/files/{name}.json"),
            RoutePattern::new("post", "GET", r"/posts/{id:\d+}"),
        ])
        .unwrap();
        let udf = render("F", &matcher);
        assert!(udf.contains(r#""^GET /files/(?P<v0>[^/]+)\.json$","files.show""#));
        assert!(udf.contains(r#""^GET /posts/(?P<v0>\d+)$","post""#));
        assert!(!udf.contains(r"\\"));
    }

    #[test]
    fn test_render_bracket_classes_need_no_backslash() {
        let matcher = compile(&[RoutePattern::new("show", "GET", "/{id:[0-9]+}/{ext:[a-z]+}")])
            .unwrap();
        assert!(!render("F", &matcher).contains('\\'));
    }
}
