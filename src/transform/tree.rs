//! Tree transformer: scraped input → native tree.
//!
//! Walks the source tree depth-first and, for every node:
//!
//! 1. Resolves kind and widget type (legacy `"widget.foo"` included)
//! 2. Migrates the widget type across the version pair
//! 3. Classifies it as custom or standard
//! 4. Custom: registry converter, else the fallback ladder.
//!    Standard: pass through with migrated settings
//! 5. Assigns a fresh id, migrates settings, recurses into children and
//!    drops children that resolved to nothing
//!
//! Ids are drawn in pre-order: a node's id is issued before any id a
//! converter synthesizes for it and before its children's.

use compact_str::CompactString;

use super::classify::is_custom_widget;
use super::fallback::{FallbackLadder, FallbackOutcome, is_internal_key};
use crate::converter::{ConvertContext, ConvertedNode, ConvertedShape};
use crate::id::{IdGenerator, NodeId};
use crate::logger::{ConversionLogger, ErrorEntry, FallbackEntry, SuccessEntry, WarningEntry};
use crate::meta::{ConversionMeta, ConversionMetaTable, ConversionSource};
use crate::migration::SettingsMigrator;
use crate::node::{ElementKind, ElementNode, Settings, SourceChild, SourceNode};
use crate::registry::ConverterRegistry;
use crate::version::VersionPair;

/// Label for widgets that arrived without a type
const UNTYPED: &str = "<untyped>";

/// Label for input entries that could not be read as nodes
const MALFORMED: &str = "<malformed>";

/// Converter name recorded for markup fallbacks
const MARKUP_CONVERTER: &str = "html-fallback";

// =============================================================================
// TreeTransformer
// =============================================================================

/// Recursive source → native transformer for one document
///
/// # Usage
///
/// ```ignore
/// let mut logger = ConversionLogger::new();
/// let mut transformer = TreeTransformer::new(&registry, &migrator, &ladder, &mut logger)
///     .with_versions(VersionPair::from_strs(Some("2.5"), Some("4.0")))
///     .with_ids(IdGenerator::for_payload(&payload));
/// let content = transformer.transform(&children);
/// let meta = transformer.into_meta();
/// ```
pub struct TreeTransformer<'a> {
    registry: &'a ConverterRegistry,
    migrator: &'a SettingsMigrator,
    ladder: &'a FallbackLadder,
    logger: &'a mut ConversionLogger,
    ids: IdGenerator,
    versions: VersionPair,
    meta: ConversionMetaTable,
}

impl<'a> TreeTransformer<'a> {
    pub fn new(
        registry: &'a ConverterRegistry,
        migrator: &'a SettingsMigrator,
        ladder: &'a FallbackLadder,
        logger: &'a mut ConversionLogger,
    ) -> Self {
        Self {
            registry,
            migrator,
            ladder,
            logger,
            ids: IdGenerator::new(0),
            versions: VersionPair::default(),
            meta: ConversionMetaTable::new(),
        }
    }

    /// Set the source/target version pair
    pub fn with_versions(mut self, versions: VersionPair) -> Self {
        self.versions = versions;
        self
    }

    /// Set the id generator
    pub fn with_ids(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Metadata recorded so far
    pub fn meta(&self) -> &ConversionMetaTable {
        &self.meta
    }

    /// Consume the transformer, returning the metadata side channel
    pub fn into_meta(self) -> ConversionMetaTable {
        self.meta
    }

    /// Transform a list of sibling entries
    pub fn transform(&mut self, children: &[SourceChild]) -> Vec<ElementNode> {
        children
            .iter()
            .filter_map(|child| match child {
                SourceChild::Node(node) => self.transform_node(node),
                SourceChild::Malformed(bad) => {
                    self.logger.log_error(ErrorEntry {
                        original_type: MALFORMED.into(),
                        message: bad.reason.clone(),
                        node_id: None,
                    });
                    None
                }
            })
            .collect()
    }

    /// Transform one node; `None` means the node was dropped
    pub fn transform_node(&mut self, node: &SourceNode) -> Option<ElementNode> {
        match node.resolve_kind() {
            (ElementKind::Container, _) => Some(self.transform_container(node)),
            (ElementKind::Widget, Some(widget_type)) => Some(self.transform_widget(node, &widget_type)),
            (ElementKind::Widget, None) => self.transform_untyped(node),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Node kinds
    // ─────────────────────────────────────────────────────────────────────────

    fn transform_container(&mut self, node: &SourceNode) -> ElementNode {
        let id = self.ids.next_id();
        let settings = self.migrator.migrate_container(node.settings.clone());
        let children = self.transform(&node.children);
        ElementNode {
            id,
            kind: ElementKind::Container,
            widget_type: None,
            settings,
            children,
            is_inner: node.is_inner,
        }
    }

    fn transform_widget(&mut self, node: &SourceNode, original_type: &str) -> ElementNode {
        let id = self.ids.next_id();
        let widget_type = self.migrator.migrate_widget_type(original_type, self.versions);

        if !is_custom_widget(&widget_type, self.registry) {
            tracing::trace!(%widget_type, "standard widget passed through");
            let settings = self.migrator.migrate_widget(&widget_type, node.settings.clone());
            return self.assemble(id, widget_type, settings, node);
        }

        if let Some(converted) = self.try_registry(node, original_type, &widget_type, &id) {
            return converted;
        }

        match self.ladder.run(node, &widget_type) {
            FallbackOutcome::Heuristic { heuristic, converted } => {
                let name = format!("heuristic:{heuristic}");
                self.accept(id, node, original_type, &name, ConversionSource::PatternHeuristic, converted)
            }
            FallbackOutcome::Markup(converted) => self.accept_markup(id, node, original_type, converted),
            FallbackOutcome::PassThrough => self.pass_through(id, node, original_type),
        }
    }

    /// A widget with no type: markup fallback when it has markup, else dropped
    fn transform_untyped(&mut self, node: &SourceNode) -> Option<ElementNode> {
        if let Some(converted) = super::fallback::markup_fallback(node) {
            let id = self.ids.next_id();
            return Some(self.accept_markup(id, node, UNTYPED, converted));
        }
        self.logger.log_error(ErrorEntry {
            original_type: UNTYPED.into(),
            message: "widget has no widgetType and no markup; dropped".into(),
            node_id: node.id.clone(),
        });
        None
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion paths
    // ─────────────────────────────────────────────────────────────────────────

    fn try_registry(
        &mut self,
        node: &SourceNode,
        original_type: &str,
        widget_type: &str,
        id: &NodeId,
    ) -> Option<ElementNode> {
        let converter = self.registry.resolve(widget_type)?;
        let name = converter.describe().name;
        if !converter.can_handle(node, widget_type) {
            tracing::debug!(widget_type, converter = name, "converter declined");
            return None;
        }

        let result = {
            let mut ctx = ConvertContext::new(&mut self.ids, self.versions);
            converter.convert(node, widget_type, &mut ctx)
        };

        match result {
            Ok(Some(converted)) => {
                Some(self.accept(id.clone(), node, original_type, name, ConversionSource::Registry, converted))
            }
            Ok(None) => {
                tracing::debug!(widget_type, converter = name, "converter produced nothing");
                None
            }
            Err(err) => {
                self.logger.log_error(ErrorEntry {
                    original_type: original_type.into(),
                    message: err.to_string(),
                    node_id: Some(id.to_string()),
                });
                None
            }
        }
    }

    /// Accept a registry or heuristic result
    fn accept(
        &mut self,
        id: NodeId,
        node: &SourceNode,
        original_type: &str,
        converter_name: &str,
        source: ConversionSource,
        converted: ConvertedNode,
    ) -> ElementNode {
        let ConvertedNode {
            shape,
            data_loss,
            warnings,
            lost_fields,
        } = converted;

        let (element, converted_type) = match shape {
            ConvertedShape::Widget {
                widget_type,
                mut settings,
            } => {
                carry_internal(&node.settings, &mut settings);
                let settings = self.migrator.migrate_widget(&widget_type, settings);
                let converted_type = widget_type.to_string();
                (self.assemble(id.clone(), widget_type, settings, node), converted_type)
            }
            ConvertedShape::Container {
                mut settings,
                children,
            } => {
                carry_internal(&node.settings, &mut settings);
                let mut synthesized: Vec<ElementNode> =
                    children.into_iter().map(|c| self.migrate_synthesized(c)).collect();
                synthesized.extend(self.transform(&node.children));
                let element = ElementNode {
                    id: id.clone(),
                    kind: ElementKind::Container,
                    widget_type: None,
                    settings: self.migrator.migrate_container(settings),
                    children: synthesized,
                    is_inner: node.is_inner,
                };
                (element, ElementKind::Container.as_str().to_string())
            }
        };

        self.meta.insert(
            id,
            ConversionMeta::new(original_type, converter_name, source, data_loss, warnings.clone()),
        );
        self.logger.log_success(SuccessEntry {
            original_type: original_type.into(),
            converted_type,
            converter_name: converter_name.into(),
            data_loss,
            warnings,
        });
        if !lost_fields.is_empty() {
            self.logger.log_warning(WarningEntry {
                original_type: original_type.into(),
                lost_fields,
            });
        }
        element
    }

    /// Accept a markup fallback: an `html` widget, logged as a fallback
    fn accept_markup(&mut self, id: NodeId, node: &SourceNode, original_type: &str, converted: ConvertedNode) -> ElementNode {
        let ConvertedNode {
            shape,
            data_loss,
            warnings,
            ..
        } = converted;
        let (widget_type, mut settings) = match shape {
            ConvertedShape::Widget { widget_type, settings } => (widget_type, settings),
            // The markup rung only ever builds widgets
            ConvertedShape::Container { settings, .. } => (CompactString::from("html"), settings),
        };
        carry_internal(&node.settings, &mut settings);
        let settings = self.migrator.migrate_widget(&widget_type, settings);

        self.meta.insert(
            id.clone(),
            ConversionMeta::new(original_type, MARKUP_CONVERTER, ConversionSource::HtmlFallback, data_loss, warnings),
        );
        self.logger.log_fallback(FallbackEntry {
            original_type: original_type.into(),
            reason: "no converter or heuristic matched; rendered markup kept as raw HTML".into(),
            had_content: true,
        });
        self.assemble(id, widget_type, settings, node)
    }

    /// Keep the node with the type it arrived with
    fn pass_through(&mut self, id: NodeId, node: &SourceNode, original_type: &str) -> ElementNode {
        self.logger.log_fallback(FallbackEntry {
            original_type: original_type.into(),
            reason: "no converter, heuristic or markup; emitted unchanged".into(),
            had_content: false,
        });
        let settings = self.migrator.migrate_widget(original_type, node.settings.clone());
        self.assemble(id, CompactString::from(original_type), settings, node)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Assembly
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a widget node, recursing into the source children
    fn assemble(&mut self, id: NodeId, widget_type: CompactString, settings: Settings, node: &SourceNode) -> ElementNode {
        let children = self.transform(&node.children);
        ElementNode {
            id,
            kind: ElementKind::Widget,
            widget_type: Some(widget_type),
            settings,
            children,
            is_inner: node.is_inner,
        }
    }

    /// Migrate settings throughout a converter-synthesized subtree
    fn migrate_synthesized(&self, mut node: ElementNode) -> ElementNode {
        let settings = std::mem::take(&mut node.settings);
        node.settings = match node.widget_type.as_deref() {
            Some(widget_type) if node.is_widget() => self.migrator.migrate_widget(widget_type, settings),
            _ => self.migrator.migrate_container(settings),
        };
        node.children = std::mem::take(&mut node.children)
            .into_iter()
            .map(|c| self.migrate_synthesized(c))
            .collect();
        node
    }
}

/// Copy identifier and advanced (`_`-prefixed) keys from the source
fn carry_internal(source: &Settings, target: &mut Settings) {
    for (key, value) in source {
        if is_internal_key(key) && !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SourceNode;
    use serde_json::{Value, json};

    struct Fixture {
        registry: ConverterRegistry,
        migrator: SettingsMigrator,
        ladder: FallbackLadder,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: ConverterRegistry::with_defaults(),
                migrator: SettingsMigrator::new(),
                ladder: FallbackLadder::default(),
            }
        }

        fn run(&self, input: Value, versions: VersionPair) -> (Vec<ElementNode>, ConversionMetaTable, ConversionLogger) {
            let source = SourceNode::from_value(&json!({"elType": "container", "elements": input})).unwrap();
            let mut logger = ConversionLogger::new();
            let mut t = TreeTransformer::new(&self.registry, &self.migrator, &self.ladder, &mut logger)
                .with_versions(versions)
                .with_ids(IdGenerator::new(42));
            let out = t.transform(&source.children);
            let meta = t.into_meta();
            (out, meta, logger)
        }
    }

    #[test]
    fn test_standard_widget_passes_through_migrated() {
        let fx = Fixture::new();
        let (out, meta, log) = fx.run(
            json!([{"elType": "widget", "widgetType": "heading", "settings": {"text": "Hi", "size": "large"}}]),
            VersionPair::default(),
        );
        let node = &out[0];
        assert_eq!(node.widget_type(), Some("heading"));
        assert_eq!(node.settings["title"], json!("Hi"));
        assert_eq!(node.settings["header_size"], json!("h2"));
        assert_eq!(node.settings["_element_id"], json!(""));
        assert!(meta.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_registry_conversion_records_meta() {
        let fx = Fixture::new();
        let (out, meta, log) = fx.run(
            json!([{"elType": "widget", "widgetType": "eael-filterable-gallery",
                    "settings": {"images": ["/a.jpg", "/b.jpg"], "_css_classes": "hero"}}]),
            VersionPair::default(),
        );
        let node = &out[0];
        assert_eq!(node.widget_type(), Some("image-carousel"));
        assert_eq!(node.settings["_css_classes"], json!("hero"));

        let m = meta.get(&node.id).unwrap();
        assert_eq!(m.source, ConversionSource::Registry);
        assert_eq!(m.converter_name, "gallery");
        assert_eq!(m.original_type, "eael-filterable-gallery");
        assert_eq!(log.successes_count(), 1);
    }

    #[test]
    fn test_container_result_gets_inner_children() {
        let fx = Fixture::new();
        let (out, _, log) = fx.run(
            json!([{"elType": "widget", "widgetType": "ha-testimonials",
                    "settings": {"testimonials": [{"content": "A"}, {"content": "B"}]}}]),
            VersionPair::default(),
        );
        let node = &out[0];
        assert!(node.is_container());
        assert_eq!(node.children.len(), 2);
        assert!(node.children.iter().all(|c| c.is_inner));
        assert_eq!(node.children[0].settings["_element_id"], json!(""));
        assert_eq!(log.successes()[0].converted_type, "container");
    }

    #[test]
    fn test_converter_error_is_recovered() {
        let fx = Fixture::new();
        let (out, meta, log) = fx.run(
            json!([{"elType": "widget", "widgetType": "jet-video",
                    "settings": {"youtube_url": "https://www.youtube.com/channel/x"},
                    "htmlCache": "<div>player</div>"}]),
            VersionPair::default(),
        );
        assert_eq!(log.errors_count(), 1);
        assert_eq!(log.errors()[0].node_id.as_deref(), Some(out[0].id.as_str()));
        assert_eq!(out[0].widget_type(), Some("html"));
        assert_eq!(meta.get(&out[0].id).unwrap().source, ConversionSource::HtmlFallback);
    }

    #[test]
    fn test_heuristic_fallback() {
        let fx = Fixture::new();
        let (out, meta, log) = fx.run(
            json!([{"elType": "widget", "widgetType": "ha-dual-heading", "settings": {"title": "Two", "tag": "3"}}]),
            VersionPair::default(),
        );
        assert_eq!(out[0].widget_type(), Some("heading"));
        assert_eq!(out[0].settings["header_size"], json!("h3"));
        let m = meta.get(&out[0].id).unwrap();
        assert_eq!(m.source, ConversionSource::PatternHeuristic);
        assert_eq!(m.converter_name, "heuristic:heading");
        assert!(!m.data_loss);
        assert_eq!(log.successes_count(), 1);
    }

    #[test]
    fn test_pass_through_keeps_original_type() {
        let fx = Fixture::new();
        let (out, meta, log) = fx.run(
            json!([{"elType": "widget", "widgetType": "ha-countdown", "settings": {"due": "2030"}}]),
            VersionPair::default(),
        );
        assert_eq!(out[0].widget_type(), Some("ha-countdown"));
        assert_eq!(out[0].settings["due"], json!("2030"));
        assert!(meta.is_empty());
        assert_eq!(log.fallbacks_count(), 1);
        assert!(!log.fallbacks()[0].had_content);
    }

    #[test]
    fn test_legacy_compound_and_deprecated_types() {
        let fx = Fixture::new();
        let (out, _, _) = fx.run(
            json!([
                {"elType": "widget.heading", "settings": {"title": "A"}},
                {"elType": "widget", "widgetType": "btn", "settings": {"label": "Go"}}
            ]),
            VersionPair::default(),
        );
        assert_eq!(out[0].widget_type(), Some("heading"));
        assert!(out[0].is_widget());
        assert_eq!(out[1].widget_type(), Some("button"));
        assert_eq!(out[1].settings["text"], json!("Go"));
    }

    #[test]
    fn test_malformed_and_untyped_children() {
        let fx = Fixture::new();
        let (out, _, log) = fx.run(
            json!([
                "junk",
                {"elType": "widget", "settings": {}},
                {"elType": "widget", "settings": {}, "htmlCache": "<b>kept</b>"},
                {"elType": "section", "elements": [{"elType": "widget", "widgetType": "spacer"}]}
            ]),
            VersionPair::default(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].widget_type(), Some("html"));
        assert!(out[1].is_container());
        assert_eq!(out[1].children.len(), 1);
        assert_eq!(log.errors_count(), 2);
        assert_eq!(log.fallbacks_count(), 1);
    }

    #[test]
    fn test_ids_unique_and_well_formed() {
        let fx = Fixture::new();
        let items: Vec<Value> = (0..50)
            .map(|i| json!({"elType": "container", "elements": [{"elType": "widget", "widgetType": "heading", "settings": {"title": i}}]}))
            .collect();
        let (out, _, _) = fx.run(Value::Array(items), VersionPair::default());
        let doc = crate::node::NativeDocument::new("4.0", out);
        let mut seen = rustc_hash::FxHashSet::default();
        for node in doc.iter() {
            assert!(node.id.is_well_formed());
            assert!(seen.insert(node.id.clone()));
        }
        assert_eq!(seen.len(), 100);
    }
}
