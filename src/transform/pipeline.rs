//! Conversion pipeline: the public entry point.
//!
//! One call runs four stages over a document:
//!
//! ```text
//! payload ──► TreeTransformer ──► Sanitizer ──► Validator ──► summary
//! ```
//!
//! Per-node problems are recovered and recorded in the logger. Only a
//! missing payload, a rejecting sanitizer or a schema violation abort the
//! call.

use serde::Deserialize;
use serde_json::Value;

use super::fallback::FallbackLadder;
use super::tree::TreeTransformer;
use super::validator::Validator;
use crate::error::{BridgeError, BridgeResult};
use crate::id::IdGenerator;
use crate::logger::{ConversionLogger, ConversionSummary};
use crate::meta::ConversionMetaTable;
use crate::migration::SettingsMigrator;
use crate::node::{NativeDocument, SourceChild, SourceNode};
use crate::registry::ConverterRegistry;
use crate::sanitize::{NoopSanitizer, Sanitizer};
use crate::version::VersionPair;

/// Document version written when the options name no target
pub const DEFAULT_TARGET_VERSION: &str = "4.0";

/// `type` tag of a clipboard envelope
pub const CLIPBOARD_KIND: &str = "elementor";

// =============================================================================
// ConvertOptions
// =============================================================================

/// Per-call conversion options
///
/// Deserializable from camelCase JSON:
///
/// ```ignore
/// let options: ConvertOptions = serde_json::from_value(json!({
///     "sourceVersion": "2.5",
///     "targetVersion": "4.0",
/// }))?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Schema version the input was scraped from
    pub source_version: Option<String>,
    /// Schema version to convert for; defaults to [`DEFAULT_TARGET_VERSION`]
    pub target_version: Option<String>,
    /// Run the sanitizer stage
    pub sanitize: bool,
    /// Explicit id seed; by default the seed is derived from the payload
    pub id_seed: Option<u64>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_version: None,
            target_version: None,
            sanitize: true,
            id_seed: None,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a `source → target` migration
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_version: Some(source.into()),
            target_version: Some(target.into()),
            ..Self::default()
        }
    }

    /// Enable or skip the sanitizer stage
    #[inline]
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Fix the id seed
    #[inline]
    pub fn with_id_seed(mut self, seed: u64) -> Self {
        self.id_seed = Some(seed);
        self
    }

    /// Effective target version
    pub fn target(&self) -> &str {
        self.target_version.as_deref().unwrap_or(DEFAULT_TARGET_VERSION)
    }
}

// =============================================================================
// ConversionOutput
// =============================================================================

/// Result of one successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The validated native tree
    pub document: NativeDocument,
    /// Conversion metadata keyed by node id
    pub meta: ConversionMetaTable,
    /// Aggregate counts for this call
    pub summary: ConversionSummary,
    /// Decision trail for this call
    pub log: ConversionLogger,
}

/// Borrowed view of an input document
struct Payload<'v> {
    elements: &'v [Value],
    version: Option<&'v str>,
    title: Option<&'v str>,
}

impl<'v> Payload<'v> {
    /// Accept a bare element array or an object with `content`/`elements`
    fn read(document: &'v Value) -> BridgeResult<Self> {
        match document {
            Value::Array(elements) => Ok(Self {
                elements,
                version: None,
                title: None,
            }),
            Value::Object(obj) => {
                let elements = obj
                    .get("content")
                    .or_else(|| obj.get("elements"))
                    .and_then(Value::as_array)
                    .ok_or_else(|| BridgeError::structural("document has no `content` or `elements` array"))?;
                Ok(Self {
                    elements,
                    version: obj.get("version").and_then(Value::as_str),
                    title: obj.get("title").and_then(Value::as_str),
                })
            }
            Value::Null => Err(BridgeError::structural("missing document payload")),
            _ => Err(BridgeError::structural("document is neither an array nor an object")),
        }
    }

    fn children(&self) -> Vec<SourceChild> {
        self.elements
            .iter()
            .map(|value| match SourceNode::from_value(value) {
                Ok(node) => SourceChild::Node(node),
                Err(bad) => SourceChild::Malformed(bad),
            })
            .collect()
    }
}

/// Envelope `version`: a string or a bare number such as `3.5`
fn envelope_version(value: Option<&Value>) -> BridgeResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(version)) => Ok(Some(version.trim().to_string())),
        Some(Value::Number(version)) => Ok(Some(version.to_string())),
        Some(other) => Err(BridgeError::structural(format!(
            "clipboard payload version must be a string or number, found `{other}`"
        ))),
    }
}

/// Readable nodes in the input, malformed top-level entries counted once
fn input_node_count(children: &[SourceChild]) -> usize {
    children
        .iter()
        .map(|child| match child {
            SourceChild::Node(node) => node.node_count(),
            SourceChild::Malformed(_) => 1,
        })
        .sum()
}

// =============================================================================
// ConversionPipeline
// =============================================================================

/// Scraped tree → validated native tree
///
/// # Example
///
/// ```ignore
/// let pipeline = ConversionPipeline::default();
/// let output = pipeline.convert(&payload, &ConvertOptions::between("2.5", "4.0"))?;
/// println!("{}", output.summary);
/// ```
pub struct ConversionPipeline {
    registry: ConverterRegistry,
    migrator: SettingsMigrator,
    ladder: FallbackLadder,
    sanitizer: Box<dyn Sanitizer>,
}

impl Default for ConversionPipeline {
    fn default() -> Self {
        Self::new(ConverterRegistry::with_defaults())
    }
}

impl std::fmt::Debug for ConversionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionPipeline")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ConversionPipeline {
    /// Create a pipeline around a registry, with a pass-through sanitizer
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            registry,
            migrator: SettingsMigrator::new(),
            ladder: FallbackLadder::default(),
            sanitizer: Box::new(NoopSanitizer),
        }
    }

    /// Replace the sanitizer
    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    /// Replace the fallback ladder
    pub fn with_ladder(mut self, ladder: FallbackLadder) -> Self {
        self.ladder = ladder;
        self
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Mutable registry access for late registrations
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entry points
    // ─────────────────────────────────────────────────────────────────────────

    /// Convert one document with a private logger
    pub fn convert(&self, document: &Value, options: &ConvertOptions) -> BridgeResult<ConversionOutput> {
        let mut logger = ConversionLogger::new();
        let (document, meta, summary) = self.run(document, options, &mut logger)?;
        Ok(ConversionOutput {
            document,
            meta,
            summary,
            log: logger,
        })
    }

    /// Convert one document into a caller-owned logger
    ///
    /// The logger is reset first. The returned output carries a copy of
    /// the trail.
    pub fn convert_with_logger(
        &self,
        document: &Value,
        options: &ConvertOptions,
        logger: &mut ConversionLogger,
    ) -> BridgeResult<ConversionOutput> {
        logger.reset();
        let (document, meta, summary) = self.run(document, options, logger)?;
        Ok(ConversionOutput {
            document,
            meta,
            summary,
            log: logger.clone(),
        })
    }

    /// Convert a clipboard envelope: `{"type": "elementor", "elements": [..]}`
    ///
    /// The envelope's `version` fills the source version when the options
    /// leave it unset.
    pub fn convert_clipboard_payload(&self, payload: &Value, options: &ConvertOptions) -> BridgeResult<ConversionOutput> {
        let obj = payload
            .as_object()
            .ok_or_else(|| BridgeError::structural("clipboard payload is not an object"))?;

        match obj.get("type").and_then(Value::as_str) {
            Some(CLIPBOARD_KIND) => {}
            Some(other) => {
                return Err(BridgeError::structural(format!("unexpected clipboard payload type `{other}`")));
            }
            None => return Err(BridgeError::structural("clipboard payload has no type")),
        }

        let elements = obj
            .get("elements")
            .filter(|e| e.is_array())
            .ok_or_else(|| BridgeError::structural("clipboard payload has no `elements` array"))?;

        let version = envelope_version(obj.get("version"))?;
        let mut options = options.clone();
        if options.source_version.is_none() {
            options.source_version = version;
        }

        self.convert(elements, &options)
    }

    /// Convert several documents, each with its own logger
    #[cfg(feature = "parallel")]
    pub fn convert_batch(&self, documents: &[Value], options: &ConvertOptions) -> Vec<BridgeResult<ConversionOutput>> {
        use rayon::prelude::*;

        documents.par_iter().map(|doc| self.convert(doc, options)).collect()
    }

    /// Convert several documents, each with its own logger
    #[cfg(not(feature = "parallel"))]
    pub fn convert_batch(&self, documents: &[Value], options: &ConvertOptions) -> Vec<BridgeResult<ConversionOutput>> {
        documents.iter().map(|doc| self.convert(doc, options)).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stages
    // ─────────────────────────────────────────────────────────────────────────

    fn run(
        &self,
        document: &Value,
        options: &ConvertOptions,
        logger: &mut ConversionLogger,
    ) -> BridgeResult<(NativeDocument, ConversionMetaTable, ConversionSummary)> {
        let payload = Payload::read(document)?;
        let children = payload.children();
        let total = input_node_count(&children);

        let source_version = options.source_version.as_deref().or(payload.version);
        let versions = VersionPair::from_strs(source_version, Some(options.target()));
        let ids = match options.id_seed {
            Some(seed) => IdGenerator::new(seed),
            None => IdGenerator::for_payload(document),
        };

        let span = tracing::debug_span!("convert", nodes = total, %versions);
        let _enter = span.enter();

        let mut transformer = TreeTransformer::new(&self.registry, &self.migrator, &self.ladder, logger)
            .with_versions(versions)
            .with_ids(ids);
        let content = transformer.transform(&children);
        let meta = transformer.into_meta();

        let content = if options.sanitize {
            self.sanitizer
                .sanitize(content)
                .ok_or(BridgeError::SanitizationRejected)?
        } else {
            content
        };

        Validator::validate_elements(&content)?;

        let summary = logger.summarize(total);
        tracing::info!(%summary, "conversion finished");

        let mut document = NativeDocument::new(options.target(), content);
        document.title = payload.title.map(String::from);

        Ok((document, meta, summary))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConvertContext, ConvertedNode, Converter, ConverterInfo};
    use crate::error::ConvertError;
    use crate::id::{NodeId, is_well_formed_id};
    use crate::meta::ConversionSource;
    use crate::node::{ElementNode, Settings};
    use serde_json::json;
    use std::sync::Arc;

    static_assertions::assert_impl_all!(ConversionPipeline: Send, Sync);

    fn pipeline() -> ConversionPipeline {
        ConversionPipeline::default()
    }

    fn widget(widget_type: &str, settings: Value) -> Value {
        json!({"id": "src", "elType": "widget", "widgetType": widget_type, "settings": settings, "elements": []})
    }

    fn container(children: Vec<Value>) -> Value {
        json!({"id": "src", "elType": "container", "settings": {}, "elements": children})
    }

    #[test]
    fn test_every_output_id_is_well_formed() {
        let doc = json!([container(vec![
            widget("heading", json!({"title": "Hi"})),
            widget("eael-image-gallery", json!({"images": [{"url": "a.jpg"}, {"url": "b.jpg"}, {"url": "c.jpg"}]})),
            container(vec![widget("acme.unknown", json!({}))]),
        ])]);
        let out = pipeline().convert(&doc, &ConvertOptions::default()).unwrap();

        assert!(out.document.iter().all(|n| is_well_formed_id(n.id.as_str())));
        assert!(out.document.iter().filter(|n| n.is_widget()).all(|n| n.widget_type().is_some_and(|t| !t.is_empty())));

        let mut seen = std::collections::HashSet::new();
        assert!(out.document.iter().all(|n| seen.insert(n.id.clone())));
    }

    #[test]
    fn test_two_step_migration() {
        let doc = json!({"version": "2.5", "content": [widget("gallery", json!({}))]});
        let out = pipeline()
            .convert(&doc, &ConvertOptions::between("2.5", "4.0"))
            .unwrap();

        assert_eq!(out.document.version, "4.0");
        assert_eq!(out.document.content[0].widget_type(), Some("image-gallery"));
        // Standard widgets pass through silently
        assert!(out.log.is_empty());
        assert!(out.meta.is_empty());
    }

    #[test]
    fn test_document_version_fills_source() {
        let doc = json!({"version": "3.2", "title": "Home", "content": [widget("basic-gallery", json!({}))]});
        let out = pipeline()
            .convert(&doc, &ConvertOptions::default())
            .unwrap();

        assert_eq!(out.document.title.as_deref(), Some("Home"));
        assert_eq!(out.document.content[0].widget_type(), Some("image-gallery"));
    }

    #[test]
    fn test_downgrade_applies_no_tables() {
        let doc = json!([widget("basic-gallery", json!({}))]);
        let out = pipeline()
            .convert(&doc, &ConvertOptions::between("4.0", "3.0"))
            .unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("basic-gallery"));
    }

    #[test]
    fn test_gallery_boundary() {
        let images = |n: usize| (0..n).map(|i| json!({"url": format!("{i}.jpg")})).collect::<Vec<_>>();
        let p = pipeline();

        let out = p.convert(&json!([widget("eael-gallery", json!({"images": images(2)}))]), &ConvertOptions::default()).unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("image-carousel"));

        let out = p.convert(&json!([widget("eael-gallery", json!({"images": images(4)}))]), &ConvertOptions::default()).unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("image-gallery"));
        assert_eq!(out.summary.converted(), 1);

        let id = &out.document.content[0].id;
        let meta = out.meta.get(id).unwrap();
        assert_eq!(meta.source, ConversionSource::Registry);
        assert_eq!(meta.original_type, "eael-gallery");
    }

    #[test]
    fn test_custom_with_markup_becomes_html() {
        let doc = json!([{
            "elType": "widget",
            "widgetType": "acme.pricing_matrix",
            "settings": {},
            "elements": [],
            "htmlCache": "<div class=\"matrix\"><table><tr><td>1</td></tr></table></div>"
        }]);
        let out = pipeline().convert(&doc, &ConvertOptions::default()).unwrap();

        let node = &out.document.content[0];
        assert_eq!(node.widget_type(), Some("html"));
        let meta = out.meta.get(&node.id).unwrap();
        assert!(meta.data_loss);
        assert_eq!(meta.source, ConversionSource::HtmlFallback);
        assert_eq!(out.log.fallbacks().len(), 1);
        assert!(out.log.fallbacks()[0].had_content);
    }

    #[test]
    fn test_unmatched_without_markup_passes_through() {
        let doc = json!([widget("acme.mystery", json!({"foo": "bar"}))]);
        let out = pipeline().convert(&doc, &ConvertOptions::default()).unwrap();

        assert_eq!(out.document.content[0].widget_type(), Some("acme.mystery"));
        assert_eq!(out.log.fallbacks().len(), 1);
        assert!(!out.log.fallbacks()[0].had_content);
        assert_eq!(out.log.fallbacks()[0].original_type, "acme.mystery");
    }

    #[test]
    fn test_priority_and_tie_break() {
        struct Named(&'static str, &'static str);

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
                Ok(Some(ConvertedNode::widget(self.1, Settings::new())))
            }

            fn describe(&self) -> ConverterInfo {
                ConverterInfo::new(self.0, "1.0.0", &["acme.*"])
            }
        }

        let mut registry = ConverterRegistry::new();
        registry.register_with_priority(["acme.box"], Arc::new(Named("low", "heading")), 5);
        registry.register_with_priority(["acme.*"], Arc::new(Named("high", "button")), 10);
        registry.register_with_priority(["acme.*"], Arc::new(Named("late", "image")), 10);

        let out = ConversionPipeline::new(registry)
            .convert(&json!([widget("acme.box", json!({}))]), &ConvertOptions::default())
            .unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("button"));
        assert_eq!(out.log.successes()[0].converter_name, "high");
    }

    #[test]
    fn test_sanitizer_rejection_is_fatal() {
        let p = pipeline().with_sanitizer(|_tree: Vec<ElementNode>| -> Option<Vec<ElementNode>> { None });
        let doc = json!([widget("heading", json!({}))]);

        let err = p.convert(&doc, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, BridgeError::SanitizationRejected));

        // Skipping the stage skips the rejection
        assert!(p.convert(&doc, &ConvertOptions::default().with_sanitize(false)).is_ok());
    }

    #[test]
    fn test_nested_bad_id_fails_validation() {
        let corrupt = |mut tree: Vec<ElementNode>| -> Option<Vec<ElementNode>> {
            if let Some(child) = tree.first_mut().and_then(|root| root.children.get_mut(1)) {
                child.id = NodeId::from_raw("NOT-HEX");
            }
            Some(tree)
        };
        let p = pipeline().with_sanitizer(corrupt);
        let doc = json!([container(vec![widget("heading", json!({})), widget("image", json!({}))])]);

        match p.convert(&doc, &ConvertOptions::default()) {
            Err(BridgeError::Validation(err)) => {
                assert_eq!(err.rule, "id");
                assert_eq!(err.node_id.as_deref(), Some("NOT-HEX"));
                assert_eq!(err.hint.as_deref(), Some("content[0].elements[1]"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_payload() {
        let p = pipeline();
        for doc in [json!(null), json!({"title": "x"}), json!("text")] {
            let err = p.convert(&doc, &ConvertOptions::default()).unwrap_err();
            assert!(matches!(err, BridgeError::Structural(_)), "{doc}");
        }
        // `elements` is accepted in place of `content`
        assert!(p.convert(&json!({"elements": []}), &ConvertOptions::default()).is_ok());
    }

    #[test]
    fn test_clipboard_envelope() {
        let p = pipeline();
        let envelope = json!({"type": "elementor", "version": "2.9", "elements": [widget("gallery", json!({}))]});
        let out = p
            .convert_clipboard_payload(&envelope, &ConvertOptions::default())
            .unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("image-gallery"));

        for bad in [
            json!({"type": "other", "elements": []}),
            json!({"elements": []}),
            json!({"type": "elementor", "elements": {}}),
            json!([]),
        ] {
            let err = p.convert_clipboard_payload(&bad, &ConvertOptions::default()).unwrap_err();
            assert!(matches!(err, BridgeError::Structural(_)), "{bad}");
        }
    }

    #[test]
    fn test_clipboard_numeric_version() {
        let p = pipeline();
        let envelope = json!({"type": "elementor", "version": 2.5, "elements": [widget("gallery", json!({}))]});
        let out = p
            .convert_clipboard_payload(&envelope, &ConvertOptions::default())
            .unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("image-gallery"));

        // Explicit options still win over the envelope
        let out = p
            .convert_clipboard_payload(&envelope, &ConvertOptions::between("4.0", "4.0"))
            .unwrap();
        assert_eq!(out.document.content[0].widget_type(), Some("gallery"));

        for version in [json!(true), json!({"major": 3}), json!(["3.0"])] {
            let bad = json!({"type": "elementor", "version": version, "elements": []});
            let err = p.convert_clipboard_payload(&bad, &ConvertOptions::default()).unwrap_err();
            assert!(matches!(err, BridgeError::Structural(_)), "{bad}");
        }
    }

    #[test]
    fn test_deterministic_output() {
        let doc = json!([container(vec![
            widget("eael-testimonial", json!({"content": "Great", "name": "Ana"})),
            widget("acme.thing", json!({})),
        ])]);
        let p = pipeline();

        let a = p.convert(&doc, &ConvertOptions::default()).unwrap();
        let b = p.convert(&doc, &ConvertOptions::default()).unwrap();
        assert_eq!(a.document, b.document);

        let c = p.convert(&doc, &ConvertOptions::default().with_id_seed(7)).unwrap();
        let d = p.convert(&doc, &ConvertOptions::default().with_id_seed(7)).unwrap();
        assert_eq!(c.document, d.document);
        assert_ne!(a.document.content[0].id, c.document.content[0].id);
    }

    #[test]
    fn test_malformed_entry_is_logged() {
        let doc = json!([widget("heading", json!({})), 42]);
        let out = pipeline().convert(&doc, &ConvertOptions::default()).unwrap();

        assert_eq!(out.document.content.len(), 1);
        assert_eq!(out.log.errors().len(), 1);
        assert_eq!(out.summary.total_nodes, 2);
        assert_eq!(out.summary.unchanged, 1);
    }

    #[test]
    fn test_convert_with_logger_resets() {
        let p = pipeline();
        let mut logger = ConversionLogger::new();
        let doc = json!([widget("acme.thing", json!({}))]);

        p.convert_with_logger(&doc, &ConvertOptions::default(), &mut logger).unwrap();
        let out = p.convert_with_logger(&doc, &ConvertOptions::default(), &mut logger).unwrap();
        assert_eq!(logger.fallbacks().len(), 1);
        assert_eq!(out.log.fallbacks().len(), 1);
    }

    #[test]
    fn test_batch_keeps_order() {
        let docs = vec![
            json!([widget("heading", json!({}))]),
            json!(null),
            json!([widget("image", json!({}))]),
        ];
        let results = pipeline().convert_batch(&docs, &ConvertOptions::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().document.content[0].widget_type(), Some("heading"));
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().document.content[0].widget_type(), Some("image"));
    }

    #[test]
    fn test_options_from_json() {
        let options: ConvertOptions = serde_json::from_value(json!({
            "sourceVersion": "2.5",
            "targetVersion": "4.0",
            "idSeed": 3
        }))
        .unwrap();
        assert_eq!(options, ConvertOptions::between("2.5", "4.0").with_id_seed(3));
        assert!(options.sanitize);
        assert_eq!(ConvertOptions::default().target(), DEFAULT_TARGET_VERSION);
    }
}
