//! Node types for the native tree and the scraped input.
//!
//! - [`ElementNode`]: one node of the native (output) tree, strongly typed
//! - [`SourceNode`]: lenient view over one scraped input node
//! - [`NativeDocument`]: root container with query and traversal APIs

mod document;
mod source;

pub use document::NativeDocument;
pub use source::{MalformedNode, SourceChild, SourceNode};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::NodeId;

/// Widget/container settings: string-keyed JSON map, order irrelevant.
pub type Settings = serde_json::Map<String, Value>;

/// Type alias for children collection.
pub type Children = Vec<ElementNode>;

// =============================================================================
// ElementKind
// =============================================================================

/// Whether a node renders a component or only arranges other nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Container,
    Widget,
}

impl ElementKind {
    /// Wire name (`elType`)
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::Container => "container",
            ElementKind::Widget => "widget",
        }
    }
}

// =============================================================================
// ElementNode
// =============================================================================

/// A node of the native tree.
///
/// Serializes to the wire form consumed by the target importer:
/// `{"id", "elType", "widgetType"?, "settings", "elements", "isInner"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub id: NodeId,
    #[serde(rename = "elType")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<CompactString>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(rename = "elements", default)]
    pub children: Children,
    #[serde(default)]
    pub is_inner: bool,
}

impl ElementNode {
    /// Create a widget node
    pub fn widget(id: NodeId, widget_type: impl Into<CompactString>, settings: Settings) -> Self {
        Self {
            id,
            kind: ElementKind::Widget,
            widget_type: Some(widget_type.into()),
            settings,
            children: Vec::new(),
            is_inner: false,
        }
    }

    /// Create a container node
    pub fn container(id: NodeId, settings: Settings) -> Self {
        Self {
            id,
            kind: ElementKind::Container,
            widget_type: None,
            settings,
            children: Vec::new(),
            is_inner: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builders
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a child (builder style)
    pub fn child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the `isInner` flag (builder style)
    pub fn inner(mut self, is_inner: bool) -> Self {
        self.is_inner = is_inner;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Check if this is a widget node
    #[inline]
    pub fn is_widget(&self) -> bool {
        self.kind == ElementKind::Widget
    }

    /// Check if this is a container node
    #[inline]
    pub fn is_container(&self) -> bool {
        self.kind == ElementKind::Container
    }

    /// Widget type as a string slice
    #[inline]
    pub fn widget_type(&self) -> Option<&str> {
        self.widget_type.as_deref()
    }

    /// Get a string setting
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ElementNode::node_count).sum::<usize>()
    }

    /// Depth-first (pre-order) iterator over this subtree
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

// =============================================================================
// Depth-first iterator
// =============================================================================

/// Pre-order iterator over a subtree
pub struct Iter<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Iter<'a> {
    pub(crate) fn over(roots: &'a [ElementNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// =============================================================================
// Tests
// =============================================================================
