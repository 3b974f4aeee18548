//! Conversion metadata side channel.
//!
//! Informational records about how each transformed widget was produced.
//! They live beside the output tree, keyed by node id, and are never part of
//! the native schema.

use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::converter::Warnings;
use crate::id::NodeId;

/// Which conversion path produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionSource {
    Registry,
    PatternHeuristic,
    HtmlFallback,
}

impl ConversionSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            ConversionSource::Registry => "registry",
            ConversionSource::PatternHeuristic => "pattern-heuristic",
            ConversionSource::HtmlFallback => "html-fallback",
        }
    }
}

/// Metadata for one transformed widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMeta {
    pub original_type: String,
    pub converter_name: String,
    pub data_loss: bool,
    pub warnings: Warnings,
    pub source: ConversionSource,
    /// Unix milliseconds
    pub timestamp: u64,
}

impl ConversionMeta {
    /// Create metadata stamped with the current time
    pub fn new(
        original_type: impl Into<String>,
        converter_name: impl Into<String>,
        source: ConversionSource,
        data_loss: bool,
        warnings: Warnings,
    ) -> Self {
        Self {
            original_type: original_type.into(),
            converter_name: converter_name.into(),
            data_loss,
            warnings,
            source,
            timestamp: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

// =============================================================================
// ConversionMetaTable
// =============================================================================

/// Insert-once map from node id to its metadata
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConversionMetaTable {
    entries: FxHashMap<NodeId, ConversionMeta>,
}

impl ConversionMetaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach metadata to a node; refused (returns `false`) when the node
    /// already has some
    pub fn insert(&mut self, id: NodeId, meta: ConversionMeta) -> bool {
        use std::collections::hash_map::Entry;
        match self.entries.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(meta);
                true
            }
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&ConversionMeta> {
        self.entries.get(id)
    }

    /// Look up by raw id string
    pub fn get_str(&self, id: &str) -> Option<&ConversionMeta> {
        self.entries.get(&NodeId::from_raw(id))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &ConversionMeta)> {
        self.entries.iter()
    }

    /// Number of entries produced by the given path
    pub fn count_by_source(&self, source: ConversionSource) -> usize {
        self.entries.values().filter(|m| m.source == source).count()
    }
}
