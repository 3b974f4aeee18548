//! Shared extraction scaffolding for widget converters.
//!
//! Every domain converter follows the same three stages:
//!
//! 1. **Structured extraction**: try an ordered list of settings-shape
//!    variants (`images[]`, `gallery_items[]`, ...); the first variant with at
//!    least one usable item wins. Items are normalized to one intermediate
//!    shape by a per-converter item reader.
//! 2. **Markup extraction**: only when stage 1 yields nothing and the node
//!    carries markup, scan the parsed markup in a fixed order.
//! 3. **Synthesis + loss accounting**: the converter maps the intermediate
//!    shape to target settings; [`lost_fields`] reports which of its
//!    known-unmappable advanced keys were present.
//!
//! [`extract`] runs stages 1 and 2; stage 3 is converter-specific.

pub mod markup;

use serde_json::Value;

use crate::node::{Settings, SourceNode};

pub use self::markup::{Markup, MarkupImage, MarkupLink, class_attr, normalize_ws, select_in, text_of};

// =============================================================================
// Extraction result
// =============================================================================

/// Where extracted items came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractedFrom {
    /// A settings variant, by key
    Settings(&'static str),
    /// The rendered markup
    Markup,
}

/// Items produced by stages 1-2
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub items: Vec<T>,
    pub from: ExtractedFrom,
}

/// Run structured extraction, then markup extraction.
///
/// `read_item` normalizes one element of a settings array; elements it
/// rejects are skipped. `scan_markup` is only called when no variant yields
/// an item and the node has markup.
pub fn extract<T>(
    node: &SourceNode,
    variants: &[&'static str],
    read_item: impl Fn(&Value) -> Option<T>,
    scan_markup: impl FnOnce(&Markup) -> Vec<T>,
) -> Option<Extracted<T>> {
    if let Some((key, items)) = first_variant(&node.settings, variants, read_item) {
        return Some(Extracted {
            items,
            from: ExtractedFrom::Settings(key),
        });
    }

    let markup = node.markup.as_deref().filter(|m| !m.trim().is_empty())?;
    let items = scan_markup(&Markup::parse(markup));
    (!items.is_empty()).then_some(Extracted {
        items,
        from: ExtractedFrom::Markup,
    })
}

/// First settings array variant with at least one readable item
pub fn first_variant<T>(
    settings: &Settings,
    variants: &[&'static str],
    read_item: impl Fn(&Value) -> Option<T>,
) -> Option<(&'static str, Vec<T>)> {
    variants.iter().find_map(|key| {
        let items: Vec<T> = settings
            .get(*key)?
            .as_array()?
            .iter()
            .filter_map(&read_item)
            .collect();
        (!items.is_empty()).then_some((*key, items))
    })
}

/// First non-blank string among the keys, tried in order
pub fn first_str<'a>(settings: &'a Settings, keys: &[&'static str]) -> Option<(&'static str, &'a str)> {
    keys.iter().find_map(|key| {
        settings
            .get(*key)
            .and_then(url_or_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| (*key, s.trim()))
    })
}

/// A string, or the `url` field of a link/media object
pub fn url_or_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("url").and_then(Value::as_str),
        _ => None,
    }
}

/// Whether a settings value carries nothing
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

/// Advanced keys present (non-blank) in the source settings, in list order
pub fn lost_fields(settings: &Settings, advanced_keys: &[&str]) -> Vec<String> {
    advanced_keys
        .iter()
        .filter(|key| settings.get(**key).is_some_and(|v| !is_blank(v)))
        .map(|key| key.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
