//! Variable extraction from response bodies.

use std::collections::BTreeMap;

use crate::query::{JqPath, QueryEvaluator};

/// Values pulled from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub values: BTreeMap<String, String>,
    /// At least one rule produced a value.
    pub changed: bool,
}

/// Applies extraction rules to response bodies.
pub struct ResponseExtractor {
    evaluator: Box<dyn QueryEvaluator>,
}

impl ResponseExtractor {
    pub fn new() -> Self {
        Self::with_evaluator(JqPath)
    }

    pub fn with_evaluator(evaluator: impl QueryEvaluator + 'static) -> Self {
        Self {
            evaluator: Box::new(evaluator),
        }
    }

    /// Evaluate every rule against `body`.
    ///
    /// A rule that selects nothing or fails to evaluate leaves its variable
    /// unset; it never fails the extraction as a whole.
    pub fn extract(&self, rules: &BTreeMap<String, String>, body: &[u8]) -> Extraction {
        let mut values = BTreeMap::new();
        for (name, expression) in rules {
            match self.evaluator.evaluate(expression, body) {
                Ok(Some(raw)) => {
                    let value = strip_quotes(&raw).to_string();
                    tracing::debug!(variable = %name, expression = %expression, "Extracted");
                    values.insert(name.clone(), value);
                }
                Ok(None) => {
                    tracing::debug!(variable = %name, expression = %expression, "No match");
                }
                Err(e) => {
                    tracing::warn!(variable = %name, error = %e, "Query failed");
                }
            }
        }

        Extraction {
            changed: !values.is_empty(),
            values,
        }
    }
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove one pair of enclosing double quotes.
pub fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
