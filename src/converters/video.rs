//! Video family: YouTube, Vimeo and self-hosted players.
//!
//! Every accepted YouTube URL form is normalized to one canonical
//! `https://www.youtube.com/watch?v=<id>` form.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::converter::{ConvertContext, ConvertedNode, Converter, ConverterInfo};
use crate::error::ConvertError;
use crate::extract::{Markup, first_str, lost_fields};
use crate::node::{Settings, SourceNode};

const VARIANTS: &[&str] = &["youtube_url", "video_url", "url", "link", "src", "video"];

/// Markup lookups, in order
const MARKUP_SOURCES: &[(&str, &str)] = &[
    ("iframe[src]", "src"),
    ("video[src]", "src"),
    ("video source[src]", "src"),
    ("a[href]", "href"),
];

const ADVANCED_KEYS: &[&str] = &["playlist", "chapters", "sticky_video", "custom_thumbnail_overlay"];

/// Player flags carried over as `yes`/empty switches
const SWITCHES: &[&str] = &["autoplay", "mute", "loop", "controls"];

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("youtube id regex")
});

// =============================================================================
// Provider
// =============================================================================

/// Video host, with its canonical URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    YouTube(String),
    Vimeo(String),
    Hosted(String),
}

impl VideoSource {
    /// Classify and normalize a video URL.
    ///
    /// A YouTube host without a recognizable video id is an error.
    pub fn parse(url: &str) -> Result<Self, String> {
        let url = url.trim();
        let lower = url.to_ascii_lowercase();
        if lower.contains("youtube.com") || lower.contains("youtube-nocookie.com") || lower.contains("youtu.be") {
            return canonical_youtube(url)
                .map(VideoSource::YouTube)
                .ok_or_else(|| format!("no video id in YouTube URL `{url}`"));
        }
        if lower.contains("vimeo.com") {
            return Ok(VideoSource::Vimeo(url.to_string()));
        }
        Ok(VideoSource::Hosted(url.to_string()))
    }

    fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        let (kind, key, value) = match self {
            VideoSource::YouTube(url) => ("youtube", "youtube_url", json!(url)),
            VideoSource::Vimeo(url) => ("vimeo", "vimeo_url", json!(url)),
            VideoSource::Hosted(url) => ("hosted", "hosted_url", json!({ "url": url, "id": "" })),
        };
        settings.insert("video_type".into(), json!(kind));
        settings.insert(key.into(), value);
        settings
    }
}

/// `https://www.youtube.com/watch?v=<id>` for any accepted YouTube URL form
pub fn canonical_youtube(url: &str) -> Option<String> {
    let id = YOUTUBE_ID.captures(url)?.get(1)?.as_str();
    Some(format!("https://www.youtube.com/watch?v={id}"))
}

// =============================================================================
// VideoConverter
// =============================================================================

/// Converts video-like widgets to the `video` widget
pub struct VideoConverter;

impl VideoConverter {
    pub const NAME: &'static str = "video";
    pub const PATTERNS: &'static [&'static str] = &["*video*", "*youtube*", "*vimeo*"];
}

impl Converter for VideoConverter {
    fn can_handle(&self, node: &SourceNode, _widget_type: &str) -> bool {
        node.has_markup() || VARIANTS.iter().any(|key| node.settings.contains_key(*key))
    }

    fn convert(
        &self,
        node: &SourceNode,
        _widget_type: &str,
        _ctx: &mut ConvertContext<'_>,
    ) -> Result<Option<ConvertedNode>, ConvertError> {
        let url = match first_str(&node.settings, VARIANTS) {
            Some((_, url)) => Some(url.to_string()),
            None => node
                .markup
                .as_deref()
                .and_then(|m| Markup::parse(m).attr_first(MARKUP_SOURCES)),
        };
        let Some(url) = url else {
            return Ok(None);
        };

        let source = VideoSource::parse(&url).map_err(|message| ConvertError::new(Self::NAME, message))?;
        let mut settings = source.to_settings();
        for key in SWITCHES {
            if let Some(on) = node.setting(key).map(is_on) {
                settings.insert((*key).into(), json!(if on { "yes" } else { "" }));
            }
        }

        Ok(Some(
            ConvertedNode::widget("video", settings).with_lost_fields(lost_fields(&node.settings, ADVANCED_KEYS)),
        ))
    }

    fn describe(&self) -> ConverterInfo {
        ConverterInfo::new(Self::NAME, "1.0.0", Self::PATTERNS)
    }
}

fn is_on(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim(), "yes" | "true" | "1" | "on"),
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConvertedShape;
    use crate::id::IdGenerator;
    use crate::version::VersionPair;

    const CANONICAL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn run(node: &SourceNode) -> Result<Option<ConvertedNode>, ConvertError> {
        let mut ids = IdGenerator::new(7);
        let mut ctx = ConvertContext::new(&mut ids, VersionPair::default());
        VideoConverter.convert(node, "jet-video", &mut ctx)
    }

    fn node(settings: Value) -> SourceNode {
        SourceNode::widget("jet-video", settings.as_object().cloned().unwrap())
    }

    fn settings_of(out: &ConvertedNode) -> &Settings {
        match &out.shape {
            ConvertedShape::Widget { settings, .. } => settings,
            ConvertedShape::Container { .. } => panic!("expected widget"),
        }
    }

    #[test]
    fn test_youtube_forms_normalize() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "//www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(canonical_youtube(url).as_deref(), Some(CANONICAL), "{url}");
        }
    }

    #[test]
    fn test_settings_variant_order() {
        let out = run(&node(json!({
            "video_url": "https://vimeo.com/76979871",
            "url": "https://youtu.be/dQw4w9WgXcQ"
        })))
        .unwrap()
        .unwrap();
        let settings = settings_of(&out);
        assert_eq!(settings["video_type"], json!("vimeo"));
        assert_eq!(settings["vimeo_url"], json!("https://vimeo.com/76979871"));
    }

    #[test]
    fn test_link_object_and_switches() {
        let out = run(&node(json!({
            "link": {"url": "https://youtu.be/dQw4w9WgXcQ"},
            "autoplay": true,
            "mute": "no"
        })))
        .unwrap()
        .unwrap();
        let settings = settings_of(&out);
        assert_eq!(settings["youtube_url"], json!(CANONICAL));
        assert_eq!(settings["autoplay"], json!("yes"));
        assert_eq!(settings["mute"], json!(""));
        assert!(!settings.contains_key("loop"));
    }

    #[test]
    fn test_markup_iframe() {
        let n = node(json!({})).with_markup(
            r#"<div class="wrap"><iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe></div>"#,
        );
        let out = run(&n).unwrap().unwrap();
        assert_eq!(settings_of(&out)["youtube_url"], json!(CANONICAL));
    }

    #[test]
    fn test_hosted_file() {
        let n = node(json!({})).with_markup(r#"<video controls><source src="/media/clip.mp4"></video>"#);
        let out = run(&n).unwrap().unwrap();
        let settings = settings_of(&out);
        assert_eq!(settings["video_type"], json!("hosted"));
        assert_eq!(settings["hosted_url"]["url"], json!("/media/clip.mp4"));
    }

    #[test]
    fn test_bad_youtube_url_is_error() {
        let err = run(&node(json!({"youtube_url": "https://www.youtube.com/channel/abc"}))).unwrap_err();
        assert_eq!(err.converter, "video");
        assert!(err.message.contains("no video id"));
    }

    #[test]
    fn test_advanced_keys_and_empty() {
        let out = run(&node(json!({"url": "https://youtu.be/dQw4w9WgXcQ", "sticky_video": "yes"})))
            .unwrap()
            .unwrap();
        assert_eq!(out.lost_fields, vec!["sticky_video".to_string()]);
        assert!(run(&node(json!({"url": "  "}))).unwrap().is_none());
    }
}
