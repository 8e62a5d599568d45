//! App Engine access log analysis on BigQuery, grouped by application route.
//!
//! A route table (`name`, `method`, gorilla/mux path pattern) is compiled into
//! a BigQuery temporary function that maps `(method, path)` to the name of the
//! first matching route, or `"{method} {path}"` when nothing matches. The
//! statistics query groups request logs by that function's output.
//!
//! ```
//! use aealanlys::{compile, construct_query, RoutePattern};
//!
//! let matcher = compile(&[
//!     RoutePattern::new("index", "GET", "/"),
//!     RoutePattern::new("show", "GET", "/{id:[0-9]+}"),
//! ])
//! .unwrap();
//!
//! assert_eq!(matcher.group_key("GET", "/42?page=2"), "show");
//! assert_eq!(matcher.group_key("GET", "/abc"), "GET /abc");
//!
//! let query = construct_query("project.logs.appengine_*", None, &matcher).unwrap();
//! assert!(query.contains("GROUP BY methodName"));
//! ```

pub mod analyze;
pub mod cli;
pub mod error;
pub mod extract;
pub mod grouping;
pub mod matcher;
pub mod query;
pub mod route;
pub mod template;
pub mod udf;
pub mod warehouse;

pub use analyze::{analyze, dry_run, format_row, PlanResult, RecordSink};
pub use error::{BoxError, Error, Result, ShapeError};
pub use extract::{ExtractError, MuxPathRegex, PathRegexSource};
pub use grouping::PathGrouping;
pub use matcher::{compile, compile_with, Collision, CompiledMatcher, MatchPair};
pub use query::{construct_query, generate, GROUPING_FUNCTION};
pub use route::{load_routes, parse_routes, parse_routes_json, RoutePattern};
pub use warehouse::{
    Context, DryRunStats, Field, FieldType, Interrupted, QueryService, RowStream, Value,
};
