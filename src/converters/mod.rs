//! Reference converters for common custom-widget families.
//!
//! These use the same [`Converter`](crate::converter::Converter) trait as
//! user-supplied converters. [`ConverterRegistry::with_defaults`] registers
//! them under their `PATTERNS`.
//!
//! # Available Converters
//!
//! - `GalleryConverter` - galleries, carousels, sliders, portfolios
//! - `VideoConverter` - YouTube, Vimeo, hosted video
//! - `TestimonialConverter` - testimonials, reviews, quotes
//! - `IconListConverter` - icon lists, feature lists
//!
//! [`ConverterRegistry::with_defaults`]: crate::registry::ConverterRegistry::with_defaults

pub mod gallery;
pub mod icon_list;
pub mod testimonial;
pub mod video;

pub use gallery::GalleryConverter;
pub use icon_list::IconListConverter;
pub use testimonial::TestimonialConverter;
pub use video::{VideoConverter, VideoSource, canonical_youtube};
