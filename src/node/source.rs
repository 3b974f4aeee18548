//! Lenient view over scraped input nodes
//!
//! Scraped trees come from many editors and are loosely shaped: settings may
//! be serialized as an empty array, ids may be numbers, the widget type may be
//! folded into `elType` (`"widget.foo"`), and rendered markup may sit under
//! several different keys. [`SourceNode::from_value`] absorbs all of that.

use compact_str::CompactString;
use serde_json::Value;

use super::{ElementKind, Settings};

/// Keys that may carry the node's rendered markup, in lookup order
pub const MARKUP_KEYS: &[&str] = &["htmlCache", "renderedContent", "html_cache", "markup"];

/// Prefix of the legacy compound kind encoding
const COMPOUND_PREFIX: &str = "widget.";

// =============================================================================
// SourceNode
// =============================================================================

/// One node of the scraped input tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceNode {
    /// Id as found in the input (not trusted, never reused)
    pub id: Option<String>,
    /// Raw `elType` string
    pub el_type: CompactString,
    /// Explicit `widgetType` field
    pub widget_type: Option<CompactString>,
    pub settings: Settings,
    pub children: Vec<SourceChild>,
    pub is_inner: bool,
    /// Rendered markup, when the scraper captured any
    pub markup: Option<String>,
}

/// A child slot of a source node
#[derive(Debug, Clone, PartialEq)]
pub enum SourceChild {
    Node(SourceNode),
    Malformed(MalformedNode),
}

/// An input entry that could not be read as a node
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedNode {
    pub reason: String,
}

impl SourceNode {
    /// Read a node from a JSON value
    pub fn from_value(value: &Value) -> Result<Self, MalformedNode> {
        let obj = value.as_object().ok_or_else(|| MalformedNode {
            reason: format!("expected an element object, found {}", json_kind(value)),
        })?;

        let el_type: CompactString = obj
            .get("elType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .into();
        let widget_type = obj
            .get("widgetType")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(CompactString::from);
        let has_elements = obj.get("elements").is_some_and(Value::is_array);

        if el_type.is_empty() && widget_type.is_none() && !has_elements {
            return Err(MalformedNode {
                reason: "object has neither elType, widgetType nor elements".into(),
            });
        }

        let id = obj.get("id").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        // Empty settings are often serialized as `[]`
        let settings = match obj.get("settings") {
            Some(Value::Object(map)) => map.clone(),
            _ => Settings::new(),
        };

        let children = obj
            .get("elements")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| match SourceNode::from_value(item) {
                        Ok(node) => SourceChild::Node(node),
                        Err(bad) => SourceChild::Malformed(bad),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let is_inner = obj.get("isInner").and_then(Value::as_bool).unwrap_or(false);

        let markup = MARKUP_KEYS
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string);

        Ok(Self {
            id,
            el_type,
            widget_type,
            settings,
            children,
            is_inner,
            markup,
        })
    }

    /// Create a widget source node (mostly for tests and converters)
    pub fn widget(widget_type: &str, settings: Settings) -> Self {
        Self {
            el_type: "widget".into(),
            widget_type: Some(widget_type.into()),
            settings,
            ..Default::default()
        }
    }

    /// Attach rendered markup (builder style)
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Resolve kind and widget type, decoding the legacy `"widget.foo"` form.
    ///
    /// An explicit `widgetType` wins over the compound suffix. Any kind other
    /// than a widget maps to a container.
    pub fn resolve_kind(&self) -> (ElementKind, Option<CompactString>) {
        if self.el_type == "widget" {
            return (ElementKind::Widget, self.widget_type.clone());
        }
        if let Some(suffix) = self.el_type.strip_prefix(COMPOUND_PREFIX) {
            let widget_type = self
                .widget_type
                .clone()
                .or_else(|| (!suffix.is_empty()).then(|| CompactString::from(suffix)));
            return (ElementKind::Widget, widget_type);
        }
        if self.el_type.is_empty() && self.widget_type.is_some() {
            return (ElementKind::Widget, self.widget_type.clone());
        }
        (ElementKind::Container, None)
    }

    /// Check if the scraper captured non-blank markup
    pub fn has_markup(&self) -> bool {
        self.markup.as_deref().is_some_and(|m| !m.trim().is_empty())
    }

    /// Get a setting by key
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Get a non-blank string setting
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Number of readable nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| match c {
                SourceChild::Node(n) => n.node_count(),
                SourceChild::Malformed(_) => 0,
            })
            .sum::<usize>()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Tests
// =============================================================================
