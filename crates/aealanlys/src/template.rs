//! `{{ NAME }}` placeholder substitution for SQL templates.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Default)]
pub struct TemplateVars {
    vars: HashMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Substitutes every known placeholder in a single pass; values are never
    /// re-scanned. Unknown placeholders are left as they are.
    pub fn apply(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| match self.vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Collapses every whitespace run to one space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_substitution() {
        let mut vars = TemplateVars::new();
        vars.set("TABLE", "logs.appengine");
        vars.set("FUNC", "PTN");

        let output = vars.apply("SELECT {{ FUNC }}(a) FROM `{{TABLE}}`");
        assert_eq!(output, "SELECT PTN(a) FROM `logs.appengine`");
    }

    #[test]
    fn test_multiple_same_var() {
        let mut vars = TemplateVars::new();
        vars.set("T", "t1");
        assert_eq!(vars.apply("{{ T }} JOIN {{ T }}"), "t1 JOIN t1");
    }

    #[test]
    fn test_unknown_var_unchanged() {
        let vars = TemplateVars::new();
        assert_eq!(vars.apply("value={{ MISSING }}"), "value={{ MISSING }}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut vars = TemplateVars::new();
        vars.set("A", "{{ B }} $1");
        vars.set("B", "nope");
        assert_eq!(vars.apply("{{ A }}"), "{{ B }} $1");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("\n  SELECT\n\ta,\n  b\n"), "SELECT a, b");
    }
}
