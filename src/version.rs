//! Schema version handling
//!
//! Only major versions matter for widget-type migration. A version pair
//! expands into the chain of single-step transitions that migration applies
//! in order: `2.5 → 4.0` becomes `[(2, 3), (3, 4)]`.

use std::fmt;

use crate::migration::tables::VERSION_STEPS;

/// Extract the major number from a `"major.minor[.patch]"` string.
///
/// Leading `v` and surrounding whitespace are tolerated. Returns `None` for
/// anything that does not start with a number.
pub fn major_of(version: &str) -> Option<u32> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
    let head = trimmed.split('.').next()?;
    head.parse().ok()
}

// =============================================================================
// VersionPair
// =============================================================================

/// Source and target major versions of one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionPair {
    pub source: Option<u32>,
    pub target: Option<u32>,
}

impl VersionPair {
    /// Build from optional version strings
    pub fn from_strs(source: Option<&str>, target: Option<&str>) -> Self {
        Self {
            source: source.and_then(major_of),
            target: target.and_then(major_of),
        }
    }

    /// Whether both majors are known and differ
    pub fn crosses_major(&self) -> bool {
        matches!((self.source, self.target), (Some(s), Some(t)) if s != t)
    }

    /// Single-step upgrade transitions, in application order.
    ///
    /// Only transitions the step table knows are returned, so the chain is
    /// bounded by the table whatever majors the caller names. Empty when
    /// either side is unknown, when they are equal, or when the pair is a
    /// downgrade.
    pub fn steps(&self) -> Vec<(u32, u32)> {
        match (self.source, self.target) {
            (Some(s), Some(t)) if s < t => VERSION_STEPS
                .iter()
                .map(|(step, _)| *step)
                .filter(|&(from, to)| s <= from && to <= t)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for VersionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<u32>| v.map_or_else(|| "?".to_string(), |m| m.to_string());
        write!(f, "{} -> {}", show(self.source), show(self.target))
    }
}
