//! Testimonial family: testimonials, reviews, quotes.
//!
//! A single testimonial maps to one `testimonial` widget. Slider-style
//! widgets carrying several entries become a container of inner
//! `testimonial` widgets, one per entry.

use serde_json::{Map, Value, json};

use crate::converter::{ConvertContext, ConvertedNode, Converter, ConverterInfo};
use crate::error::ConvertError;
use crate::extract::{Markup, first_variant, lost_fields, url_or_str};
use crate::node::{Settings, SourceNode};

/// Array variants holding several testimonials
const MULTI_VARIANTS: &[&str] = &["testimonials", "reviews", "slides"];

const CONTENT_KEYS: &[&str] = &["content", "testimonial_content", "quote", "text", "review"];
const NAME_KEYS: &[&str] = &["name", "testimonial_name", "author", "author_name", "reviewer_name"];
const JOB_KEYS: &[&str] = &["job", "testimonial_job", "position", "company"];
const IMAGE_KEYS: &[&str] = &["image", "testimonial_image", "avatar", "author_image"];

const ADVANCED_KEYS: &[&str] = &["rating_schema", "verified_badge", "slider_autoplay_speed"];

// =============================================================================
// TestimonialConverter
// =============================================================================

/// Converts testimonial-like widgets to `testimonial` (or a container of them)
pub struct TestimonialConverter;

impl TestimonialConverter {
    pub const NAME: &'static str = "testimonial";
    pub const PATTERNS: &'static [&'static str] = &["*testimonial*", "*review*", "*quote*"];
}

impl Converter for TestimonialConverter {
    fn can_handle(&self, node: &SourceNode, _widget_type: &str) -> bool {
        node.has_markup()
            || MULTI_VARIANTS
                .iter()
                .chain(CONTENT_KEYS)
                .any(|key| node.settings.contains_key(*key))
    }

    fn convert(
        &self,
        node: &SourceNode,
        _widget_type: &str,
        ctx: &mut ConvertContext<'_>,
    ) -> Result<Option<ConvertedNode>, ConvertError> {
        let lost = lost_fields(&node.settings, ADVANCED_KEYS);

        if let Some((_, mut entries)) = first_variant(&node.settings, MULTI_VARIANTS, |v| {
            v.as_object().and_then(Testimonial::from_map)
        }) {
            if entries.len() == 1 {
                let single = entries.remove(0);
                return Ok(Some(ConvertedNode::widget("testimonial", single.into_settings()).with_lost_fields(lost)));
            }
            let children = entries
                .into_iter()
                .map(|t| ctx.widget("testimonial", t.into_settings()).inner(true))
                .collect();
            let mut settings = Settings::new();
            settings.insert("flex_direction".into(), json!("column"));
            return Ok(Some(ConvertedNode::container(settings, children).with_lost_fields(lost)));
        }

        let single = Testimonial::from_map(&node.settings)
            .or_else(|| node.markup.as_deref().and_then(|m| Testimonial::from_markup(&Markup::parse(m))));
        Ok(single.map(|t| ConvertedNode::widget("testimonial", t.into_settings()).with_lost_fields(lost)))
    }

    fn describe(&self) -> ConverterInfo {
        ConverterInfo::new(Self::NAME, "1.0.0", Self::PATTERNS)
    }
}

// =============================================================================
// Intermediate shape
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Testimonial {
    content: String,
    name: Option<String>,
    job: Option<String>,
    image: Option<String>,
}

impl Testimonial {
    /// Read from a settings-like map; content is required
    fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let pick = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| map.get(*key).and_then(url_or_str))
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            content: pick(CONTENT_KEYS)?,
            name: pick(NAME_KEYS),
            job: pick(JOB_KEYS),
            image: pick(IMAGE_KEYS),
        })
    }

    fn from_markup(markup: &Markup) -> Option<Self> {
        Some(Self {
            content: markup.text_first(&["blockquote", "q", ".testimonial-content", "p"])?,
            name: markup.text_first(&["cite", ".name", ".author", "strong"]),
            job: markup.text_first(&[".job", ".title", ".position"]),
            image: markup.images().into_iter().next().map(|img| img.src),
        })
    }

    fn into_settings(self) -> Settings {
        let mut settings = Settings::new();
        settings.insert("testimonial_content".into(), json!(self.content));
        settings.insert("testimonial_name".into(), json!(self.name.unwrap_or_default()));
        settings.insert("testimonial_job".into(), json!(self.job.unwrap_or_default()));
        if let Some(url) = self.image {
            settings.insert("testimonial_image".into(), json!({ "url": url, "id": "" }));
        }
        settings
    }
}

// =============================================================================
// Tests
// =============================================================================
