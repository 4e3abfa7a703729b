//! Re-render the playbook source whenever variables change.

use crate::error::{PlaybookError, PlaybookResult};
use crate::playbook::{parse_playbook, Playbook};
use crate::template::TemplateEngine;
use crate::variables::VariableStore;

/// Produces a fresh Playbook from the raw source and current variables.
#[derive(Default)]
pub struct TemplateReconciler {
    engine: TemplateEngine,
}

impl TemplateReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the whole source against `variables` and parse the result.
    pub fn reconcile(&self, source: &str, variables: &VariableStore) -> PlaybookResult<Playbook> {
        let rendered = self.engine.render(source, variables)?;
        let playbook = parse_playbook(&rendered).map_err(|e| {
            PlaybookError::Template(format!("rendered playbook could not be parsed - {}", e))
        })?;

        tracing::debug!(
            variables = variables.len(),
            requests = playbook.requests.len(),
            "Reconciled playbook"
        );

        Ok(playbook)
    }

    /// Reconcile, requiring the same number of requests as `current`.
    ///
    /// Rendering fills in placeholders only; a render that adds or drops
    /// requests would shift the meaning of every later index.
    pub fn reconcile_against(
        &self,
        source: &str,
        variables: &VariableStore,
        current: &Playbook,
    ) -> PlaybookResult<Playbook> {
        let playbook = self.reconcile(source, variables)?;
        if playbook.requests.len() != current.requests.len() {
            return Err(PlaybookError::Template(format!(
                "rendered playbook has {} requests, expected {}",
                playbook.requests.len(),
                current.requests.len()
            )));
        }
        Ok(playbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
name: chain
requests:
  - name: A
    method: GET
    url: http://x/1
    parse:
      token: .id
  - name: B
    method: GET
    url: http://{{token}}/2
"#;

    #[test]
    fn test_reconcile_fills_placeholders() {
        let reconciler = TemplateReconciler::new();
        let mut vars = VariableStore::new();
        vars.set("token", "42");

        let playbook = reconciler.reconcile(SOURCE, &vars).unwrap();
        assert_eq!(playbook.requests[1].url, "http://42/2");
        assert_eq!(playbook.requests[0].url, "http://x/1");
    }

    #[test]
    fn test_reconcile_without_references_is_identity() {
        let source = r#"
name: plain
variables:
  unused: value
requests:
  - name: one
    method: POST
    url: example.com/a
    headers: ["Accept: application/json"]
    data: '{"k": [1, 2]}'
"#;
        let loaded = parse_playbook(source).unwrap();
        let mut vars = VariableStore::new();
        vars.merge(&loaded.variables);

        let reconciled = TemplateReconciler::new().reconcile(source, &vars).unwrap();
        assert_eq!(reconciled, loaded);
    }

    #[test]
    fn test_reconcile_unparsable_render() {
        let mut vars = VariableStore::new();
        vars.set("broken", "[unterminated");
        let err = TemplateReconciler::new()
            .reconcile("requests: {{ broken }}", &vars)
            .unwrap_err();
        assert!(matches!(err, PlaybookError::Template(_)));
    }

    #[test]
    fn test_reconcile_rejects_changed_length() {
        let source = r#"
requests:
{% for i in range(count | int) %}
  - name: r{{ i }}
    method: GET
    url: http://x/{{ i }}
{% endfor %}
"#;
        let reconciler = TemplateReconciler::new();
        let mut vars = VariableStore::new();
        vars.set("count", "1");
        let current = reconciler.reconcile(source, &vars).unwrap();
        assert_eq!(current.requests.len(), 1);

        vars.set("count", "2");
        let err = reconciler
            .reconcile_against(source, &vars, &current)
            .unwrap_err();
        assert!(matches!(err, PlaybookError::Template(msg) if msg.contains("expected 1")));
    }
}
