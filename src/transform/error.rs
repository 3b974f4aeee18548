//! Validation error type.

use thiserror::Error;

/// The first schema violation found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{rule}: {message}{}", format_context(.node_id, .hint))]
pub struct ValidateError {
    /// Name of the rule that failed (e.g. `id`, `widgetType`).
    pub rule: String,
    /// The error message.
    pub message: String,
    /// Id of the offending node, when it has a readable one.
    pub node_id: Option<String>,
    /// Path to the offending node (e.g. `content[0].elements[2]`).
    pub hint: Option<String>,
}

fn format_context(node_id: &Option<String>, hint: &Option<String>) -> String {
    let mut ctx = String::new();
    if let Some(id) = node_id {
        ctx.push_str(&format!(" [node: {id}]"));
    }
    if let Some(hint) = hint {
        ctx.push_str(&format!(" ({hint})"));
    }
    ctx
}

impl ValidateError {
    /// Create a new validation error.
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            node_id: None,
            hint: None,
        }
    }

    /// Attach the id of the node that caused this error.
    pub fn with_node(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Attach a path hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
