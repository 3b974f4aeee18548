//! Native document type and related utilities
//!
//! The root container for a converted tree, with query and traversal APIs.

use serde::{Deserialize, Serialize};

use super::{ElementNode, Iter};

// =============================================================================
// NativeDocument
// =============================================================================

/// Root document container in the target schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeDocument {
    /// Target schema version the tree was converted for
    pub version: String,
    /// Document title, carried over from the input when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Top-level elements
    pub content: Vec<ElementNode>,
}

impl NativeDocument {
    /// Create a new document
    pub fn new(version: impl Into<String>, content: Vec<ElementNode>) -> Self {
        Self {
            version: version.into(),
            title: None,
            content,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query API
    // ─────────────────────────────────────────────────────────────────────────

    /// Depth-first (pre-order) iterator over every node
    pub fn iter(&self) -> Iter<'_> {
        Iter::over(&self.content)
    }

    /// Find first node matching predicate (depth-first search)
    pub fn find<F>(&self, predicate: F) -> Option<&ElementNode>
    where
        F: Fn(&ElementNode) -> bool,
    {
        self.iter().find(|n| predicate(n))
    }

    /// Find all nodes matching predicate
    pub fn find_all<F>(&self, predicate: F) -> Vec<&ElementNode>
    where
        F: Fn(&ElementNode) -> bool,
    {
        self.iter().filter(|n| predicate(n)).collect()
    }

    /// Check if any node matches predicate
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&ElementNode) -> bool,
    {
        self.find(predicate).is_some()
    }

    /// All widget nodes of a given type
    pub fn widgets(&self, widget_type: &str) -> Vec<&ElementNode> {
        self.find_all(|n| n.widget_type() == Some(widget_type))
    }

    /// Count total nodes in document
    pub fn node_count(&self) -> usize {
        self.content.iter().map(ElementNode::node_count).sum()
    }

    /// Count widget nodes in document
    pub fn widget_count(&self) -> usize {
        self.iter().filter(|n| n.is_widget()).count()
    }

    /// Serialize to the JSON wire form
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// =============================================================================
// Tests
// =============================================================================
