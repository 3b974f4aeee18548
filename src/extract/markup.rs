//! Markup scanning over a real parse tree.
//!
//! Rendered markup captured by scrapers is often malformed or deeply nested;
//! it is parsed with `scraper` (html5ever) and queried with CSS selectors in a
//! fixed order, stopping at the first selector that yields something.

use scraper::{ElementRef, Html, Selector};

/// Attributes that may carry an image source, in lookup order (lazy loaders
/// move the real source into `data-*` attributes)
const IMAGE_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

// =============================================================================
// Markup
// =============================================================================

/// A parsed markup fragment
pub struct Markup {
    html: Html,
}

/// Image found in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupImage {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

/// Link found in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupLink {
    pub href: String,
    pub text: String,
}

impl Markup {
    /// Parse a markup fragment
    pub fn parse(fragment: &str) -> Self {
        Self {
            html: Html::parse_fragment(fragment),
        }
    }

    /// All elements matching a CSS selector (empty for an invalid selector)
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// First element matching the selectors, tried in order
    pub fn first_of(&self, selectors: &[&str]) -> Option<ElementRef<'_>> {
        selectors
            .iter()
            .find_map(|css| self.select(css).into_iter().next())
    }

    /// First non-blank attribute value over `(selector, attribute)` pairs,
    /// tried in order
    pub fn attr_first(&self, lookups: &[(&str, &str)]) -> Option<String> {
        lookups.iter().find_map(|(css, attr)| {
            self.select(css)
                .into_iter()
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        })
    }

    /// Normalized text of the first element matching the selectors, tried in
    /// order, skipping elements with blank text
    pub fn text_first(&self, selectors: &[&str]) -> Option<String> {
        selectors.iter().find_map(|css| {
            self.select(css)
                .into_iter()
                .map(text_of)
                .find(|t| !t.is_empty())
        })
    }

    /// Normalized text of the whole fragment
    pub fn text(&self) -> String {
        normalize_ws(&self.html.root_element().text().collect::<Vec<_>>().join(" "))
    }

    /// Images in document order, with alt text and nearby caption
    pub fn images(&self) -> Vec<MarkupImage> {
        self.select("img")
            .into_iter()
            .filter_map(|img| {
                let src = IMAGE_SRC_ATTRS
                    .iter()
                    .filter_map(|a| img.value().attr(a))
                    .map(str::trim)
                    .find(|s| !s.is_empty() && !s.starts_with("data:"))?;
                Some(MarkupImage {
                    src: src.to_string(),
                    alt: img
                        .value()
                        .attr("alt")
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string),
                    caption: caption_near(img),
                })
            })
            .collect()
    }

    /// Links in document order (anchors with a non-blank href)
    pub fn links(&self) -> Vec<MarkupLink> {
        self.select("a[href]")
            .into_iter()
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim();
                (!href.is_empty() && !href.starts_with('#')).then(|| MarkupLink {
                    href: href.to_string(),
                    text: text_of(a),
                })
            })
            .collect()
    }

    /// Class list of the first element matching the selectors
    pub fn classes_first(&self, selectors: &[&str]) -> Option<String> {
        let el = self.first_of(selectors)?;
        class_attr(el)
    }
}

/// Raw `class` attribute in source order, whitespace collapsed
pub fn class_attr(el: ElementRef<'_>) -> Option<String> {
    let classes = normalize_ws(el.value().attr("class")?);
    (!classes.is_empty()).then_some(classes)
}

/// Descendants of `el` matching a CSS selector (empty for an invalid selector)
pub fn select_in<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => el.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Normalized text content of an element
pub fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

/// Collapse whitespace runs to single spaces and trim
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Caption for an image: the `figcaption` of an enclosing `figure`, else a
/// following sibling that is a `figcaption` or carries a `caption` class
fn caption_near(img: ElementRef<'_>) -> Option<String> {
    let figcaption = Selector::parse("figcaption").ok()?;

    let figure = img
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(3)
        .find(|el| el.value().name() == "figure");
    if let Some(figure) = figure {
        if let Some(caption) = figure.select(&figcaption).map(text_of).find(|t| !t.is_empty()) {
            return Some(caption);
        }
    }

    img.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "figcaption"
                || el.value().classes().any(|c| c.contains("caption"))
        })
        .map(text_of)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Tests
// =============================================================================
