//! Converter registry.
//!
//! Priority-ordered pattern matcher with a lookup cache:
//!
//! - Entries are kept in descending priority. A new entry goes after every
//!   existing entry of equal priority, so the first registered of equal
//!   priority wins.
//! - `resolve` checks the cache, then scans entries in order. Only positive
//!   hits are cached; repeated misses re-scan.
//! - The cache sits behind a `parking_lot::RwLock` so a registry can be
//!   shared by reference across batch workers.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = ConverterRegistry::new();
//! registry.register(["*gallery*", "*slider*"], Arc::new(GalleryConverter));
//! registry.register_with_priority([Pattern::regex("^ha-.*")?], Arc::new(HappyConverter), 20);
//!
//! let converter = registry.resolve("eael-filterable-gallery");
//! ```

pub mod pattern;

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::converter::Converter;
use crate::converters::{GalleryConverter, IconListConverter, TestimonialConverter, VideoConverter};

pub use self::pattern::{Pattern, matches};

/// Priority used by [`ConverterRegistry::register`]
pub const DEFAULT_PRIORITY: i32 = 10;

// =============================================================================
// RegistryEntry
// =============================================================================

/// One registered converter with its patterns
#[derive(Clone)]
pub struct RegistryEntry {
    patterns: Vec<Pattern>,
    converter: Arc<dyn Converter>,
    priority: i32,
}

impl RegistryEntry {
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.converter
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this entry's pattern set matches the widget type
    pub fn is_match(&self, widget_type: &str) -> bool {
        matches(widget_type, &self.patterns)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("converter", &self.converter.describe().name)
            .field("priority", &self.priority)
            .field("patterns", &self.patterns)
            .finish()
    }
}

// =============================================================================
// ConverterRegistry
// =============================================================================

/// Lookup cache: widget type → resolved converter
type LookupCache = FxHashMap<CompactString, Arc<dyn Converter>>;

/// Priority-ordered converter registry
#[derive(Default)]
pub struct ConverterRegistry {
    entries: Vec<RegistryEntry>,
    cache: RwLock<LookupCache>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in converters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(GalleryConverter::PATTERNS.iter().copied(), Arc::new(GalleryConverter));
        registry.register(VideoConverter::PATTERNS.iter().copied(), Arc::new(VideoConverter));
        registry.register(
            TestimonialConverter::PATTERNS.iter().copied(),
            Arc::new(TestimonialConverter),
        );
        registry.register(IconListConverter::PATTERNS.iter().copied(), Arc::new(IconListConverter));
        // Broad catch-all for list-like widgets, below everything else
        registry.register_with_priority(["*list*"], Arc::new(IconListConverter), 5);
        registry
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a converter at [`DEFAULT_PRIORITY`]
    pub fn register<I, P>(&mut self, patterns: I, converter: Arc<dyn Converter>)
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.register_with_priority(patterns, converter, DEFAULT_PRIORITY);
    }

    /// Register a converter at an explicit priority (higher first)
    ///
    /// Registration drops cached lookups, since the new entry may outrank a
    /// cached resolution.
    pub fn register_with_priority<I, P>(&mut self, patterns: I, converter: Arc<dyn Converter>, priority: i32)
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        let entry = RegistryEntry {
            patterns: patterns.into_iter().map(Into::into).collect(),
            converter,
            priority,
        };
        tracing::debug!(
            converter = entry.converter.describe().name,
            priority,
            patterns = entry.patterns.len(),
            "converter registered"
        );

        let pos = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.cache.get_mut().clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve the converter for a widget type
    pub fn resolve(&self, widget_type: &str) -> Option<Arc<dyn Converter>> {
        if let Some(hit) = self.cache.read().get(widget_type) {
            return Some(Arc::clone(hit));
        }

        let found = self
            .entries
            .iter()
            .find(|e| e.is_match(widget_type))
            .map(|e| Arc::clone(&e.converter))?;

        self.cache
            .write()
            .insert(CompactString::from(widget_type), Arc::clone(&found));
        Some(found)
    }

    /// Check whether any converter matches the widget type
    pub fn has_converter(&self, widget_type: &str) -> bool {
        self.resolve(widget_type).is_some()
    }

    /// Drop every cached lookup
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Number of cached lookups
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    /// Entries in resolution order
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no converter is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("entries", &self.entries)
            .field("cached", &self.cached())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConvertContext, ConvertedNode, ConverterInfo};
    use crate::error::ConvertError;
    use crate::node::{Settings, SourceNode};

    struct Named(&'static str);

    impl Converter for Named {
        fn can_handle(&self, _node: &SourceNode, _widget_type: &str) -> bool {
            true
        }

        fn convert(
            &self,
            _node: &SourceNode,
            _widget_type: &str,
            _ctx: &mut ConvertContext<'_>,
        ) -> Result<Option<ConvertedNode>, ConvertError> {
            Ok(Some(ConvertedNode::widget(self.0, Settings::new())))
        }

        fn describe(&self) -> ConverterInfo {
            ConverterInfo::new(self.0, "test", &[])
        }
    }

    fn name_of(c: &Arc<dyn Converter>) -> &'static str {
        c.describe().name
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let mut registry = ConverterRegistry::new();
        registry.register_with_priority(["*gallery*"], Arc::new(Named("a")), 5);
        registry.register_with_priority(["*gallery*"], Arc::new(Named("b")), 10);

        assert_eq!(name_of(&registry.resolve("ha-gallery").unwrap()), "b");
    }

    #[test]
    fn test_equal_priority_first_registered_wins() {
        let mut registry = ConverterRegistry::new();
        registry.register(["ha-gallery"], Arc::new(Named("first")));
        registry.register(["ha-gallery"], Arc::new(Named("second")));

        for _ in 0..3 {
            assert_eq!(name_of(&registry.resolve("ha-gallery").unwrap()), "first");
        }
        let priorities: Vec<_> = registry.entries().iter().map(|e| e.priority()).collect();
        assert_eq!(priorities, vec![10, 10]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = ConverterRegistry::with_defaults();
        let a = registry.resolve("eael-filterable-gallery").unwrap();
        let b = registry.resolve("eael-filterable-gallery").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_only_hits_are_cached() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.resolve("totally-unknown").is_none());
        assert_eq!(registry.cached(), 0);

        assert!(registry.has_converter("jet-video"));
        assert_eq!(registry.cached(), 1);

        registry.clear_cache();
        assert_eq!(registry.cached(), 0);
    }

    #[test]
    fn test_registration_invalidates_cache() {
        let mut registry = ConverterRegistry::new();
        registry.register_with_priority(["*gallery*"], Arc::new(Named("low")), 1);
        assert_eq!(name_of(&registry.resolve("x-gallery").unwrap()), "low");

        registry.register_with_priority(["*gallery*"], Arc::new(Named("high")), 50);
        assert_eq!(name_of(&registry.resolve("x-gallery").unwrap()), "high");
    }

    #[test]
    fn test_entries_sorted_descending() {
        let mut registry = ConverterRegistry::new();
        registry.register_with_priority(["a"], Arc::new(Named("p1")), 1);
        registry.register_with_priority(["b"], Arc::new(Named("p9")), 9);
        registry.register_with_priority(["c"], Arc::new(Named("p5")), 5);
        registry.register_with_priority(["d"], Arc::new(Named("p5b")), 5);

        let order: Vec<_> = registry
            .entries()
            .iter()
            .map(|e| e.converter().describe().name)
            .collect();
        assert_eq!(order, vec!["p9", "p5", "p5b", "p1"]);
    }

    #[test]
    fn test_regex_entries() {
        let mut registry = ConverterRegistry::new();
        registry.register([Pattern::regex(r"^premium-.*-box$").unwrap()], Arc::new(Named("box")));
        assert!(registry.has_converter("premium-image-box"));
        assert!(!registry.has_converter("premium-image"));
    }

    #[test]
    fn test_defaults_cover_reference_families() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(name_of(&registry.resolve("ha-image-slider").unwrap()), "gallery");
        assert_eq!(name_of(&registry.resolve("jet-youtube").unwrap()), "video");
        assert_eq!(name_of(&registry.resolve("ha-review").unwrap()), "testimonial");
        assert_eq!(name_of(&registry.resolve("pp-price-list").unwrap()), "icon-list");
        assert!(registry.resolve("ha-countdown").is_none());
    }

    #[test]
    fn test_registry_is_send_sync() {
        static_assertions::assert_impl_all!(ConverterRegistry: Send, Sync);
    }
}
