//! Icon-list family: feature lists, checklists, price lists.

use serde_json::{Value, json};

use crate::converter::{ConvertContext, ConvertedNode, Converter, ConverterInfo};
use crate::error::ConvertError;
use crate::extract::{self, Markup, class_attr, lost_fields, select_in, text_of, url_or_str};
use crate::migration::tables::{icon_object, link_object};
use crate::node::{Settings, SourceNode};

const VARIANTS: &[&str] = &["items", "list", "features", "icon_list"];

const TEXT_KEYS: &[&str] = &["text", "title", "label", "content", "item_text"];
const ICON_KEYS: &[&str] = &["selected_icon", "icon", "icon_class"];
const LINK_KEYS: &[&str] = &["link", "url", "href"];

const ADVANCED_KEYS: &[&str] = &["connector_style", "item_animation", "tooltip"];

/// Icon used when an item carries none
const DEFAULT_ICON: &str = "fas fa-check";

// =============================================================================
// IconListConverter
// =============================================================================

/// Converts list-like widgets to `icon-list`
pub struct IconListConverter;

impl IconListConverter {
    pub const NAME: &'static str = "icon-list";
    pub const PATTERNS: &'static [&'static str] = &["*icon-list*", "*icon_list*", "*features*"];
}

impl Converter for IconListConverter {
    fn can_handle(&self, node: &SourceNode, _widget_type: &str) -> bool {
        node.has_markup() || VARIANTS.iter().any(|key| node.settings.contains_key(*key))
    }

    fn convert(
        &self,
        node: &SourceNode,
        _widget_type: &str,
        _ctx: &mut ConvertContext<'_>,
    ) -> Result<Option<ConvertedNode>, ConvertError> {
        let Some(found) = extract::extract(node, VARIANTS, read_item, scan_items) else {
            return Ok(None);
        };

        let mut settings = Settings::new();
        settings.insert(
            "icon_list".into(),
            Value::Array(found.items.into_iter().map(ListItem::into_value).collect()),
        );
        Ok(Some(
            ConvertedNode::widget("icon-list", settings).with_lost_fields(lost_fields(&node.settings, ADVANCED_KEYS)),
        ))
    }

    fn describe(&self) -> ConverterInfo {
        ConverterInfo::new(Self::NAME, "1.0.0", Self::PATTERNS)
    }
}

// =============================================================================
// Intermediate shape
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct ListItem {
    text: String,
    /// Icon class string or an already-structured icon object
    icon: Option<Value>,
    link: Option<String>,
}

impl ListItem {
    fn into_value(self) -> Value {
        let icon = icon_object(self.icon.unwrap_or_else(|| json!(DEFAULT_ICON)));
        let link = link_object(json!(self.link.unwrap_or_default()));
        json!({ "text": self.text, "selected_icon": icon, "link": link })
    }
}

fn read_item(value: &Value) -> Option<ListItem> {
    if let Value::String(text) = value {
        let text = text.trim();
        return (!text.is_empty()).then(|| ListItem {
            text: text.to_string(),
            icon: None,
            link: None,
        });
    }

    let obj = value.as_object()?;
    let text = TEXT_KEYS
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())?;
    let icon = ICON_KEYS.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(json!(s.trim())),
        Value::Object(o) if o.get("value").is_some_and(|v| !v.is_null()) => Some(Value::Object(o.clone())),
        _ => None,
    });
    let link = LINK_KEYS
        .iter()
        .filter_map(|key| obj.get(*key).and_then(url_or_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string);

    Some(ListItem {
        text: text.to_string(),
        icon,
        link,
    })
}

fn scan_items(markup: &Markup) -> Vec<ListItem> {
    markup
        .select("li")
        .into_iter()
        .filter_map(|li| {
            let text = text_of(li);
            if text.is_empty() {
                return None;
            }
            let icon = select_in(li, "i[class]")
                .into_iter()
                .find_map(class_attr)
                .map(Value::String);
            let link = select_in(li, "a[href]")
                .into_iter()
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .find(|h| !h.is_empty() && !h.starts_with('#'))
                .map(str::to_string);
            Some(ListItem { text, icon, link })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
