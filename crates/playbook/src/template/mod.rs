//! Template rendering and playbook reconciliation.
//!
//! Variables are substituted into the raw playbook source with Jinja-style
//! `{{ name }}` placeholders, then the result is parsed again.

mod engine;
mod reconciler;

pub use engine::TemplateEngine;
pub use reconciler::TemplateReconciler;
