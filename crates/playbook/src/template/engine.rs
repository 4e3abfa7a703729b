//! Template engine implementation using minijinja.

use minijinja::{Environment, Value};

use crate::error::{PlaybookError, PlaybookResult};
use crate::variables::VariableStore;

/// Template engine with Jinja2-compatible syntax.
///
/// Undefined variables render as empty text so placeholders for values not
/// yet extracted do not break early passes.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_filter("quote", filter_quote);
        Self { env }
    }

    /// Render a template string against the variable store.
    pub fn render(&self, template: &str, variables: &VariableStore) -> PlaybookResult<String> {
        let tmpl = self.env.template_from_str(template)?;
        let ctx = Value::from_serialize(variables.as_map());
        tmpl.render(ctx).map_err(|e| PlaybookError::Template(e.to_string()))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a value as a double-quoted string literal, safe inside YAML.
fn filter_quote(value: Value) -> String {
    serde_json::to_string(&value.to_string()).unwrap_or_else(|_| "\"\"".to_string())
}
