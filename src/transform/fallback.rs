//! Fallback ladder.
//!
//! Applied when the registry path produced nothing. Rungs are tried in order
//! and the first success wins:
//!
//! 1. **Pattern heuristic**: substring indicators on the lowercase widget
//!    type, each paired with a small extractor (settings first, then
//!    markup). The first indicator whose extractor yields data wins.
//! 2. **Markup**: non-blank rendered markup is wrapped verbatim in an `html`
//!    widget, marked lossy.
//! 3. **Pass-through**: the node is kept as it arrived.

use serde_json::{Value, json};

use crate::converter::ConvertedNode;
use crate::extract::{Markup, first_str, is_blank, text_of};
use crate::migration::tables::{COMMON_RENAMES, IDENTIFIER_KEYS};
use crate::node::{Settings, SourceNode};

/// Warning attached to every markup fallback
pub const MARKUP_FALLBACK_WARNING: &str = "content is no longer structurally editable";

/// Target widget of the markup rung
pub const MARKUP_WIDGET: &str = "html";

// =============================================================================
// Heuristics
// =============================================================================

/// One pattern-heuristic rung: indicator substrings, target and extractor
#[derive(Clone, Copy)]
pub struct Heuristic {
    pub name: &'static str,
    pub indicators: &'static [&'static str],
    pub target: &'static str,
    pub extract: fn(&SourceNode) -> Option<Extraction>,
}

impl std::fmt::Debug for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heuristic")
            .field("name", &self.name)
            .field("indicators", &self.indicators)
            .field("target", &self.target)
            .finish()
    }
}

impl Heuristic {
    /// Whether any indicator occurs in the (lowercase) widget type
    pub fn indicates(&self, widget_type_lower: &str) -> bool {
        self.indicators.iter().any(|needle| widget_type_lower.contains(needle))
    }
}

/// Built-in heuristics, in trial order
pub const HEURISTICS: &[Heuristic] = &[
    Heuristic {
        name: "image",
        indicators: &["image", "img", "photo", "picture", "logo"],
        target: "image",
        extract: extract_image,
    },
    Heuristic {
        name: "heading",
        indicators: &["heading", "title", "headline"],
        target: "heading",
        extract: extract_heading,
    },
    Heuristic {
        name: "text",
        indicators: &["text", "paragraph", "content", "description"],
        target: "text-editor",
        extract: extract_text,
    },
    Heuristic {
        name: "button",
        indicators: &["button", "btn", "cta"],
        target: "button",
        extract: extract_button,
    },
    Heuristic {
        name: "icon",
        indicators: &["icon"],
        target: "icon",
        extract: extract_icon,
    },
    Heuristic {
        name: "divider",
        indicators: &["divider", "separator"],
        target: "divider",
        extract: extract_divider,
    },
    Heuristic {
        name: "spacer",
        indicators: &["spacer", "gap"],
        target: "spacer",
        extract: extract_spacer,
    },
];

/// Target-shaped settings plus the source keys they were read from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub settings: Settings,
    pub consumed: Vec<&'static str>,
}

impl Extraction {
    fn set(&mut self, key: &str, value: Value) {
        self.settings.insert(key.to_string(), value);
    }

    /// Copy the first non-blank value among `keys` to `target`
    fn carry(&mut self, source: &Settings, keys: &[&'static str], target: &str) {
        if let Some((key, value)) = first_value(source, keys) {
            self.consumed.push(key);
            if !self.settings.contains_key(target) {
                self.set(target, value.clone());
            }
        }
    }
}

// =============================================================================
// FallbackLadder
// =============================================================================

/// Result of running the ladder
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    /// Rung 1 succeeded
    Heuristic {
        heuristic: &'static str,
        converted: ConvertedNode,
    },
    /// Rung 2: an `html` widget holding the markup
    Markup(ConvertedNode),
    /// Rung 3: keep the node as it arrived
    PassThrough,
}

/// Ordered degradation strategy
#[derive(Debug, Clone, Copy)]
pub struct FallbackLadder {
    heuristics: &'static [Heuristic],
}

impl Default for FallbackLadder {
    fn default() -> Self {
        Self::new(HEURISTICS)
    }
}

impl FallbackLadder {
    pub fn new(heuristics: &'static [Heuristic]) -> Self {
        Self { heuristics }
    }

    /// Run all rungs in order
    pub fn run(&self, node: &SourceNode, widget_type: &str) -> FallbackOutcome {
        if let Some((heuristic, converted)) = self.heuristic(node, widget_type) {
            return FallbackOutcome::Heuristic { heuristic, converted };
        }
        match markup_fallback(node) {
            Some(converted) => FallbackOutcome::Markup(converted),
            None => FallbackOutcome::PassThrough,
        }
    }

    /// Rung 1 alone
    pub fn heuristic(&self, node: &SourceNode, widget_type: &str) -> Option<(&'static str, ConvertedNode)> {
        let lower = widget_type.to_ascii_lowercase();
        self.heuristics
            .iter()
            .filter(|h| h.indicates(&lower))
            .find_map(|h| {
                let extraction = (h.extract)(node)?;
                let lost = unconsumed_keys(&node.settings, &extraction.consumed);
                tracing::debug!(widget_type, heuristic = h.name, "pattern heuristic matched");
                Some((h.name, ConvertedNode::widget(h.target, extraction.settings).with_lost_fields(lost)))
            })
    }
}

/// Rung 2: wrap non-blank markup in an `html` widget
pub fn markup_fallback(node: &SourceNode) -> Option<ConvertedNode> {
    let markup = node.markup.as_deref().filter(|m| !m.trim().is_empty())?;
    let mut settings = Settings::new();
    settings.insert(MARKUP_WIDGET.into(), json!(markup));
    Some(
        ConvertedNode::widget(MARKUP_WIDGET, settings)
            .lossy()
            .with_warning(MARKUP_FALLBACK_WARNING),
    )
}

/// Keys the target schema carries regardless of widget type
pub fn is_internal_key(key: &str) -> bool {
    key.starts_with('_') || IDENTIFIER_KEYS.contains(&key) || COMMON_RENAMES.iter().any(|(old, _)| *old == key)
}

/// Non-blank, non-internal source keys an extractor did not read
fn unconsumed_keys(settings: &Settings, consumed: &[&str]) -> Vec<String> {
    settings
        .iter()
        .filter(|(key, value)| !is_internal_key(key) && !consumed.contains(&key.as_str()) && !is_blank(value))
        .map(|(key, _)| key.clone())
        .collect()
}

// =============================================================================
// Extractors
// =============================================================================

fn first_value<'a>(settings: &'a Settings, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| settings.get(*key).filter(|v| !is_blank(v)).map(|v| (*key, v)))
}

fn markup_of(node: &SourceNode) -> Option<Markup> {
    node.markup
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(Markup::parse)
}

const LINK_KEYS: &[&str] = &["link", "href", "url", "button_link", "button_url"];

fn extract_image(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    let (url, alt) = match first_str(&node.settings, &["image", "image_url", "src", "url", "photo", "logo", "picture"]) {
        Some((key, url)) => {
            ex.consumed.push(key);
            let alt = first_str(&node.settings, &["alt", "alt_text", "image_alt", "title"]).map(|(key, alt)| {
                ex.consumed.push(key);
                alt.to_string()
            });
            (url.to_string(), alt)
        }
        None => {
            let img = markup_of(node)?.images().into_iter().next()?;
            (img.src, img.alt)
        }
    };

    ex.set("image", json!({ "url": url, "id": "", "alt": alt.unwrap_or_default() }));
    if let Some((key, link)) = first_str(&node.settings, &["link", "href"]) {
        ex.consumed.push(key);
        ex.set("link_to", json!("custom"));
        ex.set("link", json!(link));
    }
    ex.carry(&node.settings, &["align", "alignment"], "align");
    Some(ex)
}

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

fn extract_heading(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    match first_str(&node.settings, &["title", "heading", "headline", "text"]) {
        Some((key, title)) => {
            ex.consumed.push(key);
            ex.set("title", json!(title));
        }
        None => {
            let markup = markup_of(node)?;
            let (tag, title) = HEADING_TAGS
                .iter()
                .find_map(|tag| markup.text_first(&[*tag]).map(|t| (*tag, t)))?;
            ex.set("title", json!(title));
            ex.set("header_size", json!(tag));
        }
    }
    ex.carry(&node.settings, &["header_size", "tag", "size", "html_tag", "title_tag"], "header_size");
    ex.carry(&node.settings, &["align", "alignment", "text_align"], "align");
    Some(ex)
}

fn extract_text(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    match first_str(&node.settings, &["editor", "content", "text", "description", "paragraph", "html"]) {
        Some((key, text)) => {
            ex.consumed.push(key);
            ex.set("editor", json!(text));
        }
        None => {
            let markup = markup_of(node)?;
            let paragraphs: Vec<String> = markup
                .select("p")
                .into_iter()
                .map(text_of)
                .filter(|t| !t.is_empty())
                .collect();
            let editor = if paragraphs.is_empty() {
                let text = markup.text();
                if text.is_empty() {
                    return None;
                }
                format!("<p>{text}</p>")
            } else {
                paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect()
            };
            ex.set("editor", json!(editor));
        }
    }
    ex.carry(&node.settings, &["align", "alignment", "text_align"], "align");
    Some(ex)
}

fn extract_button(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    match first_str(&node.settings, &["text", "button_text", "label", "title", "cta_text"]) {
        Some((key, text)) => {
            ex.consumed.push(key);
            ex.set("text", json!(text));
            if let Some((key, link)) = first_str(&node.settings, LINK_KEYS) {
                ex.consumed.push(key);
                ex.set("link", json!(link));
            }
        }
        None => {
            let markup = markup_of(node)?;
            match markup.links().into_iter().find(|l| !l.text.is_empty()) {
                Some(link) => {
                    ex.set("text", json!(link.text));
                    ex.set("link", json!(link.href));
                }
                None => ex.set("text", json!(markup.text_first(&["button"])?)),
            }
        }
    }
    ex.carry(&node.settings, &["size", "button_size"], "size");
    ex.carry(&node.settings, &["align", "alignment"], "align");
    Some(ex)
}

fn extract_icon(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    let icon = match first_value(&node.settings, &["selected_icon", "icon", "icon_class"]) {
        Some((key, Value::String(class))) => {
            ex.consumed.push(key);
            json!(class.trim())
        }
        Some((key, Value::Object(obj))) if obj.get("value").is_some_and(|v| !is_blank(v)) => {
            ex.consumed.push(key);
            Value::Object(obj.clone())
        }
        _ => json!(markup_of(node)?.classes_first(&["i", "span[class*='icon']"])?),
    };
    ex.set("selected_icon", icon);
    if let Some((key, link)) = first_str(&node.settings, LINK_KEYS) {
        ex.consumed.push(key);
        ex.set("link", json!(link));
    }
    Some(ex)
}

// Structural widgets: presence alone is the data, unless the node rendered
// markup the defaults would silently replace

/// Whether an extraction holds nothing but defaults for a node with markup
fn only_defaults(ex: &Extraction, node: &SourceNode) -> bool {
    ex.consumed.is_empty() && markup_of(node).is_some()
}

fn extract_divider(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    ex.carry(&node.settings, &["style", "line_style", "border_style"], "style");
    ex.carry(&node.settings, &["weight", "thickness", "border_width"], "weight");
    ex.carry(&node.settings, &["color", "line_color", "border_color"], "color");
    ex.carry(&node.settings, &["width"], "width");
    if only_defaults(&ex, node) {
        return None;
    }
    if !ex.settings.contains_key("style") {
        ex.set("style", json!("solid"));
    }
    Some(ex)
}

/// Default spacer height in pixels
const DEFAULT_SPACE: u32 = 50;

fn extract_spacer(node: &SourceNode) -> Option<Extraction> {
    let mut ex = Extraction::default();
    ex.carry(&node.settings, &["space", "height", "gap", "size"], "space");
    if only_defaults(&ex, node) {
        return None;
    }
    if !ex.settings.contains_key("space") {
        ex.set("space", json!(DEFAULT_SPACE));
    }
    Some(ex)
}

// =============================================================================
// Tests
// =============================================================================
