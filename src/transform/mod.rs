//! Tree transformation and validation.
//!
//! # Module Structure
//!
//! - `classify` - Custom widget predicate (`is_custom_widget`)
//! - `fallback` - Fallback ladder: pattern heuristics, then markup
//! - `tree` - Recursive source → native transformer (`TreeTransformer`)
//! - `validator` - Native schema checker (`Validator`)
//! - `pipeline` - Public entry point (`ConversionPipeline`)
//!
//! # Example
//!
//! ```ignore
//! use widget_bridge::transform::{ConversionPipeline, ConvertOptions};
//!
//! let pipeline = ConversionPipeline::default();
//! let output = pipeline.convert(&payload, &ConvertOptions::between("2.5", "4.0"))?;
//! assert!(Validator::is_valid_elements(&output.document.content));
//! ```

mod classify;
mod error;
mod fallback;
mod pipeline;
mod tree;
mod validator;

pub use classify::{STANDARD_WIDGETS, VENDOR_PREFIXES, has_vendor_prefix, is_custom_widget, is_standard_widget};
pub use error::ValidateError;
pub use fallback::{
    Extraction, FallbackLadder, FallbackOutcome, HEURISTICS, Heuristic, MARKUP_FALLBACK_WARNING, MARKUP_WIDGET,
    is_internal_key, markup_fallback,
};
pub use pipeline::{
    CLIPBOARD_KIND, ConversionOutput, ConversionPipeline, ConvertOptions, DEFAULT_TARGET_VERSION,
};
pub use tree::TreeTransformer;
pub use validator::Validator;
