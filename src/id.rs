//! Node identity for the native tree
//!
//! The target schema requires every node to carry an 8-character lowercase
//! hex id. Ids are drawn from a counter-seeded blake3 stream:
//!
//! - **Deterministic**: the same seed yields the same id sequence, so the
//!   same input document converts to the same output tree.
//! - **Unique per tree**: one [`IdGenerator`] serves one output tree and
//!   re-draws on collision, so no two nodes of that tree share an id.
//!
//! Ids are not unique across trees produced by different generators.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::hash::StableHasher;

/// Length of a node id in hex characters
pub const NODE_ID_LEN: usize = 8;

// =============================================================================
// NodeId
// =============================================================================

/// 8-character lowercase hex node identifier
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an id string without checking its format.
    ///
    /// Used for ids coming from external trees; the validator rejects
    /// malformed ones.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build an id from a u32 (always 8 hex digits, zero padded)
    #[inline]
    pub fn from_u32(value: u32) -> Self {
        Self(format!("{value:08x}"))
    }

    /// Get the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the `^[a-f0-9]{8}$` format
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        is_well_formed_id(&self.0)
    }
}

/// Check whether a string matches `^[a-f0-9]{8}$`
pub fn is_well_formed_id(s: &str) -> bool {
    s.len() == NODE_ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// IdGenerator
// =============================================================================

/// Counter-seeded id source for one output tree
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: u64,
    counter: u64,
    issued: FxHashSet<u32>,
}

impl IdGenerator {
    /// Create a generator from an explicit seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: 0,
            issued: FxHashSet::default(),
        }
    }

    /// Create a generator seeded from a document payload
    ///
    /// Identical payloads produce identical id sequences.
    pub fn for_payload(payload: &serde_json::Value) -> Self {
        let seed = StableHasher::new()
            .update_str("__document__")
            .update_json(payload)
            .finish();
        Self::new(seed)
    }

    /// Draw the next id, skipping any value already issued by this generator
    pub fn next_id(&mut self) -> NodeId {
        loop {
            let value = StableHasher::new()
                .update_u64(self.seed)
                .update_u64(self.counter)
                .finish_u32();
            self.counter += 1;
            if self.issued.insert(value) {
                return NodeId::from_u32(value);
            }
        }
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

// =============================================================================
// Tests
// =============================================================================
