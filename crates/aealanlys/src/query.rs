//! The per-route statistics query run against App Engine request logs.
//!
//! The query groups rows by the grouping function's output and reports, per
//! group: request count, status-class counts, latency percentiles in
//! milliseconds and the first and last timestamps seen.

use crate::error::{Error, Result};
use crate::grouping::PathGrouping;
use crate::template::{collapse_whitespace, TemplateVars};
use regex::Regex;
use std::sync::LazyLock;

/// Name given to the grouping function inside generated queries.
pub const GROUPING_FUNCTION: &str = "PTN";

const QUERY_TEMPLATE: &str = r#"
CREATE TEMPORARY FUNCTION FMT_LATE(s FLOAT64) AS (s*1000);
SELECT
    {{ GROUPING_FUNC }}(protoPayload.method, protoPayload.resource) AS methodName,
    COUNT(protoPayload.status) AS count,
    COUNTIF(protoPayload.status < 300) AS count_2xx,
    COUNTIF(299 < protoPayload.status AND protoPayload.status < 400) AS count_3xx,
    COUNTIF(399 < protoPayload.status AND protoPayload.status < 500) AS count_4xx,
    COUNTIF(499 < protoPayload.status) AS count_5xx,
    FMT_LATE(MIN(protoPayload.latency)) AS late0pctl,
    FMT_LATE(APPROX_QUANTILES(protoPayload.latency, 100)[OFFSET(50)]) AS late50pctl,
    FMT_LATE(APPROX_QUANTILES(protoPayload.latency, 100)[OFFSET(95)]) AS late95pctl,
    FMT_LATE(APPROX_QUANTILES(protoPayload.latency, 100)[OFFSET(99)]) AS late99pctl,
    FMT_LATE(MAX(protoPayload.latency)) AS late100pctl,
    MIN(timestamp) AS min_ts,
    MAX(timestamp) AS max_ts,
FROM `{{ TABLE }}`
{{ WHERE }}GROUP BY
    methodName
ORDER BY
    count DESC;
"#;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Renders the statistics query over `table`, grouping by the SQL function
/// `grouping_function`. A non-empty `filter` becomes the `WHERE` clause.
///
/// `table` and `filter` are inserted verbatim.
pub fn generate(grouping_function: &str, table: &str, filter: Option<&str>) -> Result<String> {
    if !IDENTIFIER.is_match(grouping_function) {
        return Err(Error::QueryConstruction(format!(
            "grouping function name {:?} is not a valid identifier",
            grouping_function
        )));
    }

    let where_clause = match filter.map(str::trim) {
        Some(expr) if !expr.is_empty() => format!("WHERE {} ", expr),
        _ => String::new(),
    };

    let mut vars = TemplateVars::new();
    vars.set("GROUPING_FUNC", grouping_function);
    vars.set("TABLE", table);
    vars.set("WHERE", where_clause);

    Ok(vars.apply(&collapse_whitespace(QUERY_TEMPLATE)))
}

/// The complete query text: the grouping function definition followed by the
/// statistics query that calls it.
pub fn construct_query(
    table: &str,
    filter: Option<&str>,
    grouping: &dyn PathGrouping,
) -> Result<String> {
    let mut query = grouping.grouping_udf(GROUPING_FUNCTION);
    query.push_str(&generate(GROUPING_FUNCTION, table, filter)?);
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::compile;
    use crate::route::RoutePattern;

    const SELECT_LIST: &str = "CREATE TEMPORARY FUNCTION FMT_LATE(s FLOAT64) AS (s*1000); SELECT CONCAT(protoPayload.method, protoPayload.resource) AS methodName, COUNT(protoPayload.status) AS count, COUNTIF(protoPayload.status < 300) AS count_2xx, COUNTIF(299 < protoPayload.status AND protoPayload.status < 400) AS count_3xx, COUNTIF(399 < protoPayload.status AND protoPayload.status < 500) AS count_4xx, COUNTIF(499 < protoPayload.status) AS count_5xx, FMT_LATE(MIN(protoPayload.latency)) AS late0pctl, FMT_LATE(APPROX_QUANTILES(protoPayload.latency, 100)[OFFSET(50)]) AS late50pctl, FMT_LATE(APPROX_QUANTILES(protoPayload.latency, 100)[OFFSET(95)]) AS late95pctl, FMT_LATE(APPROX_QUANTILES(protoPayload.latency, 100)[OFFSET(99)]) AS late99pctl, FMT_LATE(MAX(protoPayload.latency)) AS late100pctl, MIN(timestamp) AS min_ts, MAX(timestamp) AS max_ts, ";

    #[test]
    fn test_generate_without_filter() {
        let query = generate("CONCAT", "table_19700101", None).unwrap();
        let expected = format!(
            "{}FROM `table_19700101` GROUP BY methodName ORDER BY count DESC;",
            SELECT_LIST
        );
        assert_eq!(query, expected);
        assert!(!query.contains("WHERE"));
    }

    #[test]
    fn test_generate_with_filter() {
        let query = generate(
            "CONCAT",
            "table_*",
            Some("_TABLE_SUFFIX BETWEEN '20241207' AND '20250107'"),
        )
        .unwrap();
        let expected = format!(
            "{}FROM `table_*` WHERE _TABLE_SUFFIX BETWEEN '20241207' AND '20250107' GROUP BY methodName ORDER BY count DESC;",
            SELECT_LIST
        );
        assert_eq!(query, expected);
        assert_eq!(query.matches("WHERE").count(), 1);
    }

    #[test]
    fn test_blank_filter_omits_where() {
        let query = generate("F", "t", Some("   ")).unwrap();
        assert!(!query.contains("WHERE"));
        assert!(query.contains("FROM `t` GROUP BY"));
    }

    #[test]
    fn test_invalid_function_name() {
        assert!(matches!(
            generate("PTN(); DROP", "t", None),
            Err(Error::QueryConstruction(_))
        ));
        assert!(matches!(
            generate("", "t", None),
            Err(Error::QueryConstruction(_))
        ));
    }

    #[test]
    fn test_construct_query_defines_function_before_use() {
        let matcher = compile(&[RoutePattern::new("index", "GET", "/")]).unwrap();
        let query = construct_query("logs.requests_*", None, &matcher).unwrap();

        let definition = query
            .find("CREATE TEMPORARY FUNCTION PTN(m STRING,p STRING)")
            .unwrap();
        let call = query
            .find("PTN(protoPayload.method, protoPayload.resource)")
            .unwrap();
        assert!(query.starts_with("CREATE TEMPORARY FUNCTION RR("));
        assert!(definition < call);
        assert!(query.contains("FROM `logs.requests_*` GROUP BY"));
    }
}
