//! Widget-type patterns.
//!
//! A pattern is either a compiled regular expression or a literal with one of
//! four wildcard forms:
//!
//! | Written     | Form       | Test          |
//! |-------------|------------|---------------|
//! | `foo`       | exact      | `t == "foo"`  |
//! | `foo*`      | prefix     | starts with   |
//! | `*foo`      | suffix     | ends with     |
//! | `*foo*`     | contains   | contains      |
//!
//! A bare `*` is a contains-pattern over the empty string and matches every
//! type.

use std::fmt;

use compact_str::CompactString;
use regex::Regex;

use crate::error::{BridgeError, BridgeResult};

/// One widget-type pattern
#[derive(Clone)]
pub enum Pattern {
    Exact(CompactString),
    Prefix(CompactString),
    Suffix(CompactString),
    Contains(CompactString),
    Regex(Regex),
}

impl Pattern {
    /// Parse a literal pattern with optional leading/trailing `*`
    pub fn literal(pattern: &str) -> Self {
        let leading = pattern.starts_with('*');
        let trailing = pattern.len() > 1 && pattern.ends_with('*');
        let core = &pattern[usize::from(leading)..pattern.len() - usize::from(trailing)];

        match (leading, trailing) {
            (true, true) => Pattern::Contains(core.into()),
            (true, false) if core.is_empty() => Pattern::Contains(core.into()),
            (true, false) => Pattern::Suffix(core.into()),
            (false, true) => Pattern::Prefix(core.into()),
            (false, false) => Pattern::Exact(core.into()),
        }
    }

    /// Compile a full regular expression pattern
    pub fn regex(pattern: &str) -> BridgeResult<Self> {
        Regex::new(pattern)
            .map(Pattern::Regex)
            .map_err(|source| BridgeError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Test a widget type against this pattern
    pub fn is_match(&self, widget_type: &str) -> bool {
        match self {
            Pattern::Exact(s) => widget_type == s.as_str(),
            Pattern::Prefix(s) => widget_type.starts_with(s.as_str()),
            Pattern::Suffix(s) => widget_type.ends_with(s.as_str()),
            Pattern::Contains(s) => widget_type.contains(s.as_str()),
            Pattern::Regex(re) => re.is_match(widget_type),
        }
    }
}

impl From<&str> for Pattern {
    fn from(pattern: &str) -> Self {
        Pattern::literal(pattern)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(s) => write!(f, "Exact({s})"),
            Pattern::Prefix(s) => write!(f, "Prefix({s}*)"),
            Pattern::Suffix(s) => write!(f, "Suffix(*{s})"),
            Pattern::Contains(s) => write!(f, "Contains(*{s}*)"),
            Pattern::Regex(re) => write!(f, "Regex(/{}/)", re.as_str()),
        }
    }
}

/// Whether any pattern in the set matches the widget type
pub fn matches(widget_type: &str, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|p| p.is_match(widget_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_forms() {
        assert!(matches!(Pattern::literal("gallery"), Pattern::Exact(s) if s == "gallery"));
        assert!(matches!(Pattern::literal("eael-*"), Pattern::Prefix(s) if s == "eael-"));
        assert!(matches!(Pattern::literal("*-gallery"), Pattern::Suffix(s) if s == "-gallery"));
        assert!(matches!(Pattern::literal("*video*"), Pattern::Contains(s) if s == "video"));
        assert!(matches!(Pattern::literal("*"), Pattern::Contains(s) if s.is_empty()));
    }

    #[test]
    fn test_exact_requires_equality() {
        let p = Pattern::from("gallery");
        assert!(p.is_match("gallery"));
        assert!(!p.is_match("eael-gallery"));
        assert!(!p.is_match("gallery-pro"));
    }

    #[test]
    fn test_wildcards() {
        assert!(Pattern::from("eael-*").is_match("eael-filterable-gallery"));
        assert!(!Pattern::from("eael-*").is_match("ha-eael"));
        assert!(Pattern::from("*-slider").is_match("ha-slider"));
        assert!(!Pattern::from("*-slider").is_match("slider-pro"));
        assert!(Pattern::from("*video*").is_match("jet-video-player"));
        assert!(Pattern::from("*").is_match("anything"));
    }

    #[test]
    fn test_regex_pattern() {
        let p = Pattern::regex(r"^(ha|eael)-.*gallery$").unwrap();
        assert!(p.is_match("ha-image-gallery"));
        assert!(!p.is_match("ha-image-grid"));
    }

    #[test]
    fn test_invalid_regex() {
        let err = Pattern::regex("(unclosed").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidPattern { .. }));
    }

    #[test]
    fn test_matches_any() {
        let set = vec![Pattern::from("*gallery*"), Pattern::from("*slider*")];
        assert!(matches("ha-slider", &set));
        assert!(!matches("ha-video", &set));
    }
}
