//! Custom widget classification.
//!
//! A widget is custom when any one of four conditions holds:
//!
//! 1. its type contains a dot (`vendor.widget`)
//! 2. it carries a known vendor prefix
//! 3. it contains an underscore and is not a standard widget
//! 4. the registry has a converter for it and it is not a standard widget
//!
//! The union over-triggers on underscore-named standard widgets missing from
//! [`STANDARD_WIDGETS`] and under-triggers on unprefixed vendor widgets without
//! underscores or a matching converter.

use crate::registry::ConverterRegistry;

/// Native widget types of the target schema
pub const STANDARD_WIDGETS: &[&str] = &[
    "accordion",
    "alert",
    "audio",
    "basic-gallery",
    "button",
    "call-to-action",
    "container",
    "counter",
    "countdown",
    "divider",
    "flip-box",
    "form",
    "google_maps",
    "heading",
    "html",
    "icon",
    "icon-box",
    "icon-list",
    "image",
    "image-box",
    "image-carousel",
    "image-gallery",
    "media-carousel",
    "menu-anchor",
    "nav-menu",
    "posts",
    "price-list",
    "price-table",
    "progress",
    "read-more",
    "shortcode",
    "sidebar",
    "slides",
    "social-icons",
    "spacer",
    "star-rating",
    "tabs",
    "testimonial",
    "text-editor",
    "text-path",
    "toggle",
    "video",
];

/// Prefixes used by third-party widget packs
pub const VENDOR_PREFIXES: &[&str] = &[
    "eael-",
    "ha-",
    "uael-",
    "premium-",
    "jet-",
    "pp-",
    "tp-",
    "wpr-",
    "ekit-",
    "elementskit-",
    "the7-",
    "bdt-",
    "ae-",
    "raven-",
];

/// Check whether a type is in the standard allow-list
pub fn is_standard_widget(widget_type: &str) -> bool {
    STANDARD_WIDGETS.contains(&widget_type)
}

/// Check whether a type carries a known vendor prefix
pub fn has_vendor_prefix(widget_type: &str) -> bool {
    VENDOR_PREFIXES.iter().any(|p| widget_type.starts_with(p))
}

/// Classify a (migrated) widget type as custom
pub fn is_custom_widget(widget_type: &str, registry: &ConverterRegistry) -> bool {
    let standard = is_standard_widget(widget_type);

    widget_type.contains('.')
        || has_vendor_prefix(widget_type)
        || (widget_type.contains('_') && !standard)
        || (!standard && registry.has_converter(widget_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_condition() {
        let registry = ConverterRegistry::with_defaults();
        assert!(is_custom_widget("acme.slider", &registry));
        assert!(is_custom_widget("eael-countdown", &registry));
        assert!(is_custom_widget("my_widget", &registry));
        assert!(is_custom_widget("fancy-video-box", &registry));
    }

    #[test]
    fn test_standard_widgets_are_not_custom() {
        let registry = ConverterRegistry::with_defaults();
        assert!(!is_custom_widget("heading", &registry));
        assert!(!is_custom_widget("google_maps", &registry));
        // Matched by the `*gallery*` and `*list*` patterns, but allow-listed
        assert!(!is_custom_widget("image-gallery", &registry));
        assert!(!is_custom_widget("icon-list", &registry));
    }

    #[test]
    fn test_unknown_plain_type_is_not_custom() {
        let registry = ConverterRegistry::new();
        assert!(!is_custom_widget("countdown-timer", &registry));
    }

    #[test]
    fn test_vendor_prefix_beats_allow_list() {
        let registry = ConverterRegistry::new();
        assert!(is_custom_widget("ha-heading", &registry));
        assert!(has_vendor_prefix("premium-img-box"));
        assert!(!has_vendor_prefix("hash-box"));
    }
}
