//! Gallery family: image grids, carousels, sliders, portfolios.
//!
//! Decision policy: fewer than [`GRID_MIN_ITEMS`] images read better as a
//! single-slide carousel than as a sparse grid.

use serde_json::{Value, json};

use crate::converter::{ConvertContext, ConvertedNode, Converter, ConverterInfo};
use crate::error::ConvertError;
use crate::extract::{self, Markup, lost_fields, url_or_str};
use crate::node::{Settings, SourceNode};

/// Below this many images the result is a carousel
pub const GRID_MIN_ITEMS: usize = 3;

/// Grid column cap
pub const MAX_COLUMNS: usize = 4;

const VARIANTS: &[&str] = &["images", "gallery_items", "attachments", "gallery"];

const ADVANCED_KEYS: &[&str] = &[
    "lightbox_animation",
    "hover_effect",
    "filter_categories",
    "masonry",
    "custom_ratio",
];

// =============================================================================
// GalleryConverter
// =============================================================================

/// Converts gallery-like widgets to `image-gallery` or `image-carousel`
pub struct GalleryConverter;

impl GalleryConverter {
    pub const NAME: &'static str = "gallery";
    pub const PATTERNS: &'static [&'static str] = &["*gallery*", "*carousel*", "*slider*", "*portfolio*"];
}

impl Converter for GalleryConverter {
    fn can_handle(&self, node: &SourceNode, _widget_type: &str) -> bool {
        node.has_markup() || VARIANTS.iter().any(|key| node.settings.contains_key(*key))
    }

    fn convert(
        &self,
        node: &SourceNode,
        _widget_type: &str,
        _ctx: &mut ConvertContext<'_>,
    ) -> Result<Option<ConvertedNode>, ConvertError> {
        let Some(found) = extract::extract(node, VARIANTS, read_image, scan_images) else {
            return Ok(None);
        };

        let items: Vec<Value> = found.items.iter().map(GalleryImage::to_value).collect();
        let count = items.len();

        let mut settings = Settings::new();
        let converted = if count < GRID_MIN_ITEMS {
            settings.insert("carousel".into(), Value::Array(items));
            settings.insert("slides_to_show".into(), json!(1));
            ConvertedNode::widget("image-carousel", settings)
        } else {
            settings.insert("gallery".into(), Value::Array(items));
            settings.insert("gallery_columns".into(), json!(count.min(MAX_COLUMNS)));
            ConvertedNode::widget("image-gallery", settings)
        };

        Ok(Some(converted.with_lost_fields(lost_fields(&node.settings, ADVANCED_KEYS))))
    }

    fn describe(&self) -> ConverterInfo {
        ConverterInfo::new(Self::NAME, "1.0.0", Self::PATTERNS)
    }
}

// =============================================================================
// Intermediate shape
// =============================================================================

/// One gallery image, normalized
#[derive(Debug, Clone, PartialEq, Eq)]
struct GalleryImage {
    url: String,
    id: String,
    caption: Option<String>,
}

impl GalleryImage {
    fn to_value(&self) -> Value {
        let mut item = json!({ "id": self.id, "url": self.url });
        if let (Some(caption), Some(obj)) = (&self.caption, item.as_object_mut()) {
            obj.insert("caption".into(), Value::String(caption.clone()));
        }
        item
    }
}

/// Read one settings item: a bare URL or an attachment-like object
fn read_image(value: &Value) -> Option<GalleryImage> {
    if let Value::String(url) = value {
        let url = url.trim();
        return (!url.is_empty()).then(|| GalleryImage {
            url: url.to_string(),
            id: String::new(),
            caption: None,
        });
    }

    let obj = value.as_object()?;
    let url = ["url", "src", "image", "image_url", "thumbnail"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(url_or_str))
        .map(str::trim)
        .find(|s| !s.is_empty())?;

    let id = match obj.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let caption = ["caption", "title", "alt"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string);

    Some(GalleryImage {
        url: url.to_string(),
        id,
        caption,
    })
}

fn scan_images(markup: &Markup) -> Vec<GalleryImage> {
    markup
        .images()
        .into_iter()
        .map(|img| GalleryImage {
            url: img.src,
            id: String::new(),
            caption: img.caption,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;
    use crate::version::VersionPair;

    fn run(node: &SourceNode) -> Option<ConvertedNode> {
        let mut ids = IdGenerator::new(7);
        let mut ctx = ConvertContext::new(&mut ids, VersionPair::default());
        GalleryConverter.convert(node, "ha-image-gallery", &mut ctx).unwrap()
    }

    fn node(settings: Value) -> SourceNode {
        SourceNode::widget("ha-image-gallery", settings.as_object().cloned().unwrap())
    }

    #[test]
    fn test_two_images_become_carousel() {
        let out = run(&node(json!({"images": [{"url": "/a.jpg"}, {"url": "/b.jpg"}]}))).unwrap();
        assert_eq!(out.widget_type(), Some("image-carousel"));
        let crate::converter::ConvertedShape::Widget { settings, .. } = &out.shape else {
            panic!("expected widget");
        };
        assert_eq!(settings["slides_to_show"], json!(1));
        assert_eq!(settings["carousel"].as_array().unwrap().len(), 2);
        assert!(!out.data_loss);
    }

    #[test]
    fn test_four_images_become_grid() {
        let out = run(&node(json!({
            "gallery_items": ["/1.jpg", "/2.jpg", {"image": {"url": "/3.jpg", "id": 3}}, {"src": "/4.jpg", "id": 4}]
        })))
        .unwrap();
        assert_eq!(out.widget_type(), Some("image-gallery"));
        let crate::converter::ConvertedShape::Widget { settings, .. } = &out.shape else {
            panic!("expected widget");
        };
        assert_eq!(settings["gallery_columns"], json!(4));
        assert_eq!(settings["gallery"][3], json!({"id": "4", "url": "/4.jpg"}));
    }

    #[test]
    fn test_columns_capped() {
        let images: Vec<Value> = (0..9).map(|i| json!(format!("/{i}.jpg"))).collect();
        let out = run(&node(json!({ "images": images }))).unwrap();
        let crate::converter::ConvertedShape::Widget { settings, .. } = &out.shape else {
            panic!("expected widget");
        };
        assert_eq!(settings["gallery_columns"], json!(MAX_COLUMNS));
    }

    #[test]
    fn test_boundary_at_three() {
        let out = run(&node(json!({"images": ["/1.jpg", "/2.jpg", "/3.jpg"]}))).unwrap();
        assert_eq!(out.widget_type(), Some("image-gallery"));
    }

    #[test]
    fn test_markup_scan_with_captions() {
        let n = node(json!({})).with_markup(
            r#"<figure><img src="/x.jpg"><figcaption>X</figcaption></figure><img src="/y.jpg">"#,
        );
        let out = run(&n).unwrap();
        assert_eq!(out.widget_type(), Some("image-carousel"));
        let crate::converter::ConvertedShape::Widget { settings, .. } = &out.shape else {
            panic!("expected widget");
        };
        assert_eq!(settings["carousel"][0]["caption"], json!("X"));
    }

    #[test]
    fn test_advanced_keys_reported() {
        let out = run(&node(json!({
            "images": ["/1.jpg"],
            "masonry": "yes",
            "hover_effect": "zoom-in",
            "custom_ratio": ""
        })))
        .unwrap();
        assert!(out.data_loss);
        assert_eq!(out.lost_fields, vec!["hover_effect".to_string(), "masonry".to_string()]);
    }

    #[test]
    fn test_nothing_to_convert() {
        assert!(run(&node(json!({"images": []}))).is_none());
        assert!(!GalleryConverter.can_handle(&node(json!({"title": "x"})), "ha-gallery"));
    }
}
