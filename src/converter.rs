//! The converter capability trait.
//!
//! A converter turns one custom widget into native nodes. Converters are
//! independent strategy types registered in a [`ConverterRegistry`] under a
//! set of widget-type patterns.
//!
//! # Contract
//!
//! - `can_handle` is cheap and side-effect free.
//! - `convert` returns `Ok(None)` when the type matches but this particular
//!   node's data cannot produce a result; the transformer then falls through
//!   to the fallback ladder.
//! - `convert` returning `Err` is a recoverable per-node failure: it is
//!   logged and the node also continues down the fallback ladder.
//!
//! # Example
//!
//! ```ignore
//! struct RatingConverter;
//!
//! impl Converter for RatingConverter {
//!     fn can_handle(&self, node: &SourceNode, _widget_type: &str) -> bool {
//!         node.setting("rating").is_some()
//!     }
//!
//!     fn convert(
//!         &self,
//!         node: &SourceNode,
//!         _widget_type: &str,
//!         _ctx: &mut ConvertContext<'_>,
//!     ) -> Result<Option<ConvertedNode>, ConvertError> {
//!         let mut settings = Settings::new();
//!         settings.insert("rating".into(), node.setting("rating").cloned().unwrap_or_default());
//!         Ok(Some(ConvertedNode::widget("star-rating", settings)))
//!     }
//!
//!     fn describe(&self) -> ConverterInfo {
//!         ConverterInfo::new("rating", "1.0.0", &["*rating*"])
//!     }
//! }
//! ```
//!
//! [`ConverterRegistry`]: crate::registry::ConverterRegistry

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::error::ConvertError;
use crate::id::{IdGenerator, NodeId};
use crate::node::{ElementNode, Settings, SourceNode};
use crate::version::VersionPair;

/// Ordered warning list; almost always zero to two entries
pub type Warnings = SmallVec<[String; 2]>;

// =============================================================================
// Converter trait
// =============================================================================

/// A pluggable widget converter
pub trait Converter: Send + Sync {
    /// Cheap, side-effect-free predicate
    fn can_handle(&self, node: &SourceNode, widget_type: &str) -> bool;

    /// Convert one node
    fn convert(
        &self,
        node: &SourceNode,
        widget_type: &str,
        ctx: &mut ConvertContext<'_>,
    ) -> Result<Option<ConvertedNode>, ConvertError>;

    /// Name, version and supported type patterns
    fn describe(&self) -> ConverterInfo;
}

// =============================================================================
// ConverterInfo
// =============================================================================

/// Static description of a converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub supported_types: &'static [&'static str],
}

impl ConverterInfo {
    pub const fn new(
        name: &'static str,
        version: &'static str,
        supported_types: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            version,
            supported_types,
        }
    }
}

// =============================================================================
// ConvertContext
// =============================================================================

/// Per-conversion state handed to converters
pub struct ConvertContext<'a> {
    ids: &'a mut IdGenerator,
    versions: VersionPair,
}

impl<'a> ConvertContext<'a> {
    pub fn new(ids: &'a mut IdGenerator, versions: VersionPair) -> Self {
        Self { ids, versions }
    }

    /// Draw a fresh id for a synthesized node
    pub fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    /// Active source/target versions
    pub fn versions(&self) -> VersionPair {
        self.versions
    }

    /// Build a widget node with a fresh id
    pub fn widget(&mut self, widget_type: impl Into<CompactString>, settings: Settings) -> ElementNode {
        let id = self.next_id();
        ElementNode::widget(id, widget_type, settings)
    }
}

// =============================================================================
// ConvertedNode
// =============================================================================

/// What a converter produced
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedShape {
    /// A single structured widget
    Widget {
        widget_type: CompactString,
        settings: Settings,
    },
    /// A container holding synthesized child widgets
    Container {
        settings: Settings,
        children: Vec<ElementNode>,
    },
}

/// Converter result with its loss accounting
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedNode {
    pub shape: ConvertedShape,
    pub data_loss: bool,
    pub warnings: Warnings,
    /// Source settings keys that had no faithful target representation
    pub lost_fields: Vec<String>,
}

impl ConvertedNode {
    /// A lossless widget result
    pub fn widget(widget_type: impl Into<CompactString>, settings: Settings) -> Self {
        Self {
            shape: ConvertedShape::Widget {
                widget_type: widget_type.into(),
                settings,
            },
            data_loss: false,
            warnings: Warnings::new(),
            lost_fields: Vec::new(),
        }
    }

    /// A lossless container result
    pub fn container(settings: Settings, children: Vec<ElementNode>) -> Self {
        Self {
            shape: ConvertedShape::Container { settings, children },
            data_loss: false,
            warnings: Warnings::new(),
            lost_fields: Vec::new(),
        }
    }

    /// Record lost fields; marks the result lossy when any are present
    pub fn with_lost_fields(mut self, lost: Vec<String>) -> Self {
        if !lost.is_empty() {
            self.data_loss = true;
            self.warnings
                .push(format!("unsupported settings dropped: {}", lost.join(", ")));
        }
        self.lost_fields = lost;
        self
    }

    /// Append a warning (builder style)
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Mark as lossy (builder style)
    pub fn lossy(mut self) -> Self {
        self.data_loss = true;
        self
    }

    /// Resulting widget type, `None` for container results
    pub fn widget_type(&self) -> Option<&str> {
        match &self.shape {
            ConvertedShape::Widget { widget_type, .. } => Some(widget_type.as_str()),
            ConvertedShape::Container { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_fields_mark_loss() {
        let node = ConvertedNode::widget("image", Settings::new())
            .with_lost_fields(vec!["hover_effect".into(), "masonry".into()]);
        assert!(node.data_loss);
        assert_eq!(node.lost_fields.len(), 2);
        assert_eq!(
            node.warnings.as_slice(),
            ["unsupported settings dropped: hover_effect, masonry".to_string()]
        );
    }

    #[test]
    fn test_no_lost_fields_stays_clean() {
        let node = ConvertedNode::widget("image", Settings::new()).with_lost_fields(Vec::new());
        assert!(!node.data_loss);
        assert!(node.warnings.is_empty());
    }

    #[test]
    fn test_context_synthesizes_widgets() {
        let mut ids = IdGenerator::new(1);
        let mut ctx = ConvertContext::new(&mut ids, VersionPair::default());
        let a = ctx.widget("testimonial", Settings::new());
        let b = ctx.widget("testimonial", Settings::new());
        assert_ne!(a.id, b.id);
        assert!(a.id.is_well_formed());
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_widget_type_accessor() {
        assert_eq!(ConvertedNode::widget("video", Settings::new()).widget_type(), Some("video"));
        assert_eq!(ConvertedNode::container(Settings::new(), Vec::new()).widget_type(), None);
    }
}
