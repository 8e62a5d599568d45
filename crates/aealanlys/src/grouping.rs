use crate::matcher::CompiledMatcher;
use crate::udf;

/// Produces the SQL defining a temporary function `function_name(method,
/// path)` that returns the grouping key for a request.
///
/// The function is called with the uppercase HTTP method and the request
/// path including any query string.
pub trait PathGrouping {
    fn grouping_udf(&self, function_name: &str) -> String;
}

impl PathGrouping for CompiledMatcher {
    fn grouping_udf(&self, function_name: &str) -> String {
        udf::render(function_name, self)
    }
}
