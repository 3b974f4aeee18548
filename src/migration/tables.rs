//! Static migration data.
//!
//! Widget-type renames (deprecated and per major-version step) and
//! per-widget settings rename rules with their value transforms. No logic
//! lives here beyond the small value transforms themselves.

use serde_json::{Value, json};

/// Converts a settings value after its key has been renamed
pub type ValueTransform = fn(Value) -> Value;

/// Settings keys every node must carry, defaulted to an empty string
pub const IDENTIFIER_KEYS: &[&str] = &["_element_id", "_css_classes"];

// =============================================================================
// Widget-type tables
// =============================================================================

/// Deprecated widget types, applied unconditionally before version steps
pub const DEPRECATED_TYPES: &[(&str, &str)] = &[
    ("text", "text-editor"),
    ("title", "heading"),
    ("img", "image"),
    ("btn", "button"),
    ("separator", "divider"),
    ("raw-html", "html"),
    ("wp-widget-text", "text-editor"),
    ("wp-widget-custom_html", "html"),
];

/// Single-step widget-type renames keyed by `(from_major, to_major)`
pub const VERSION_STEPS: &[((u32, u32), &[(&str, &str)])] = &[
    (
        (1, 2),
        &[("sidebar-widget", "sidebar"), ("flip-box-legacy", "flip-box")],
    ),
    (
        (2, 3),
        &[
            ("gallery", "basic-gallery"),
            ("image-slider", "media-carousel"),
            ("posts-grid", "posts"),
        ],
    ),
    (
        (3, 4),
        &[
            ("basic-gallery", "image-gallery"),
            ("media-carousel", "image-carousel"),
        ],
    ),
];

// =============================================================================
// Settings tables
// =============================================================================

/// Rename/transform rule for one widget type
#[derive(Debug, Clone, Copy)]
pub struct SettingsRule {
    pub widget_type: &'static str,
    /// Old key → new key
    pub renames: &'static [(&'static str, &'static str)],
    /// New key → transform applied after renaming
    pub transforms: &'static [(&'static str, ValueTransform)],
}

/// Table key used for container nodes
pub const CONTAINER_RULE_KEY: &str = "container";

/// Renames applied to every node before its type-specific rule
pub const COMMON_RENAMES: &[(&str, &str)] = &[
    ("css_id", "_element_id"),
    ("element_id", "_element_id"),
    ("css_classes", "_css_classes"),
    ("custom_class", "_css_classes"),
];

pub const SETTINGS_RULES: &[SettingsRule] = &[
    SettingsRule {
        widget_type: "heading",
        renames: &[
            ("text", "title"),
            ("heading", "title"),
            ("tag", "header_size"),
            ("size", "header_size"),
            ("alignment", "align"),
        ],
        transforms: &[("header_size", heading_size)],
    },
    SettingsRule {
        widget_type: "text-editor",
        renames: &[("content", "editor"), ("text", "editor"), ("html", "editor")],
        transforms: &[],
    },
    SettingsRule {
        widget_type: "image",
        renames: &[
            ("src", "image"),
            ("url", "image"),
            ("image_url", "image"),
            ("alt_text", "alt"),
            ("href", "link"),
        ],
        transforms: &[("image", media_object), ("link", link_object)],
    },
    SettingsRule {
        widget_type: "button",
        renames: &[
            ("label", "text"),
            ("button_text", "text"),
            ("url", "link"),
            ("href", "link"),
            ("alignment", "align"),
        ],
        transforms: &[("link", link_object), ("size", button_size)],
    },
    SettingsRule {
        widget_type: "icon",
        renames: &[("icon", "selected_icon"), ("icon_class", "selected_icon"), ("url", "link")],
        transforms: &[("selected_icon", icon_object), ("link", link_object)],
    },
    SettingsRule {
        widget_type: "divider",
        renames: &[("line_style", "style"), ("thickness", "weight"), ("line_color", "color")],
        transforms: &[("weight", slider_size)],
    },
    SettingsRule {
        widget_type: "spacer",
        renames: &[("height", "space"), ("gap", "space")],
        transforms: &[("space", slider_size)],
    },
    SettingsRule {
        widget_type: "html",
        renames: &[("content", "html"), ("code", "html")],
        transforms: &[],
    },
    SettingsRule {
        widget_type: CONTAINER_RULE_KEY,
        renames: &[("bg_color", "background_color"), ("direction", "flex_direction")],
        transforms: &[],
    },
];

// =============================================================================
// Value transforms
// =============================================================================

/// Legacy heading size names and bare levels → `h1`..`h6`
pub fn heading_size(value: Value) -> Value {
    let mapped = match &value {
        Value::Number(n) => n.as_u64().filter(|l| (1..=6).contains(l)).map(|l| format!("h{l}")),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "xxl" | "xl" => Some("h1".to_string()),
            "large" => Some("h2".to_string()),
            "medium" => Some("h3".to_string()),
            "small" => Some("h4".to_string()),
            "xs" => Some("h5".to_string()),
            level @ ("1" | "2" | "3" | "4" | "5" | "6") => Some(format!("h{level}")),
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "div" | "span" | "p") => {
                Some(tag.to_string())
            }
            _ => None,
        },
        _ => None,
    };
    mapped.map(Value::String).unwrap_or(value)
}

/// Legacy button size names → short codes
pub fn button_size(value: Value) -> Value {
    let mapped = value.as_str().and_then(|s| match s {
        "extra-small" => Some("xs"),
        "small" => Some("sm"),
        "medium" => Some("md"),
        "large" => Some("lg"),
        "extra-large" => Some("xl"),
        _ => None,
    });
    match mapped {
        Some(code) => Value::String(code.to_string()),
        None => value,
    }
}

/// Bare URL string → link object
pub fn link_object(value: Value) -> Value {
    match value {
        Value::String(url) => json!({"url": url, "is_external": "", "nofollow": ""}),
        other => other,
    }
}

/// Bare URL string → media object
pub fn media_object(value: Value) -> Value {
    match value {
        Value::String(url) => json!({"url": url, "id": ""}),
        other => other,
    }
}

/// Number or `"40px"`-style string → slider object
pub fn slider_size(value: Value) -> Value {
    let size = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("px").trim().parse::<f64>().ok(),
        _ => None,
    };
    match size {
        Some(size) if size.fract() == 0.0 => json!({"unit": "px", "size": size as i64}),
        Some(size) => json!({"unit": "px", "size": size}),
        None => value,
    }
}

/// Icon class string → icon object with its library
pub fn icon_object(value: Value) -> Value {
    match value {
        Value::String(class) => {
            let library = icon_library(&class);
            json!({"value": class, "library": library})
        }
        other => other,
    }
}

/// Font Awesome library for an icon class string
pub fn icon_library(class: &str) -> &'static str {
    let has = |names: &[&str]| class.split_whitespace().any(|token| names.contains(&token));
    if has(&["fab", "fa-brands"]) {
        "fa-brands"
    } else if has(&["far", "fa-regular"]) {
        "fa-regular"
    } else {
        "fa-solid"
    }
}
