//! Sanitizer contract.
//!
//! The content sanitizer is an external collaborator. It receives the
//! assembled tree and returns a cleaned tree, or `None` to reject the whole
//! conversion.

use crate::node::ElementNode;

/// Tree sanitizer; `None` rejects the conversion
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, tree: Vec<ElementNode>) -> Option<Vec<ElementNode>>;
}

impl<F> Sanitizer for F
where
    F: Fn(Vec<ElementNode>) -> Option<Vec<ElementNode>> + Send + Sync,
{
    fn sanitize(&self, tree: Vec<ElementNode>) -> Option<Vec<ElementNode>> {
        self(tree)
    }
}

/// Sanitizer that accepts every tree unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSanitizer;

impl Sanitizer for NoopSanitizer {
    fn sanitize(&self, tree: Vec<ElementNode>) -> Option<Vec<ElementNode>> {
        Some(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::node::Settings;

    fn tree() -> Vec<ElementNode> {
        vec![ElementNode::widget(NodeId::from_u32(1), "html", Settings::new())]
    }

    #[test]
    fn test_noop_keeps_tree() {
        assert_eq!(NoopSanitizer.sanitize(tree()), Some(tree()));
    }

    #[test]
    fn test_closure_sanitizer() {
        let reject = |_: Vec<ElementNode>| -> Option<Vec<ElementNode>> { None };
        assert!(reject.sanitize(tree()).is_none());

        let strip_html = |t: Vec<ElementNode>| -> Option<Vec<ElementNode>> {
            Some(t.into_iter().filter(|n| n.widget_type() != Some("html")).collect())
        };
        assert_eq!(strip_html.sanitize(tree()), Some(Vec::new()));
    }
}
