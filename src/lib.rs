//! widget-bridge - Scraped widget trees → native page-builder documents
//!
//! ## Core Concepts
//!
//! **Converter registry**: pluggable [`Converter`] strategies matched against
//! widget types by glob-style patterns, ordered by priority, with a resolve
//! cache.
//!
//! **Fallback ladder**: a custom widget no converter handles degrades to a
//! pattern heuristic, then a raw-markup widget, then pass-through. Every
//! step is recorded in the [`ConversionLogger`].
//!
//! **Versioned migration**: widget types are renamed across major versions
//! one step at a time, and settings keys/values are migrated per widget.
//!
//! ## Modules
//! - `node`: Input (`SourceNode`) and output (`ElementNode`, `NativeDocument`) trees
//! - `converter`: The `Converter` trait and its context/result types
//! - `converters`: Built-in converters (gallery, video, testimonial, icon list)
//! - `registry`: Pattern-matched converter registry
//! - `migration`: Widget-type and settings migration tables
//! - `extract`: Settings-then-markup extraction helpers
//! - `transform`: Tree transformer, fallback ladder, validator, pipeline
//! - `logger` / `meta`: Audit trail and per-node conversion metadata
//!
//! ## Usage
//!
//! ```ignore
//! use widget_bridge::{ConversionPipeline, ConvertOptions};
//!
//! let pipeline = ConversionPipeline::default();
//! let output = pipeline.convert(&payload, &ConvertOptions::between("2.5", "4.0"))?;
//!
//! println!("{}", output.summary);
//! let json = output.document.to_json();
//! ```

#[macro_use]
mod macros;

// =============================================================================
// Core modules
// =============================================================================

/// Node types: ElementNode, SourceNode, NativeDocument
pub mod node;

/// Converter trait and result types
pub mod converter;

/// Built-in converters
pub mod converters;

/// Pattern-matched converter registry
pub mod registry;

/// Widget-type and settings migration
pub mod migration;

/// Settings and markup extraction helpers
pub mod extract;

/// Tree transformer, fallback ladder, validator, pipeline
pub mod transform;

/// Audit trail
pub mod logger;

/// Per-node conversion metadata
pub mod meta;

/// Sanitizer contract
pub mod sanitize;

/// Node ids
pub mod id;

/// Stable hashing for id seeds
pub mod hash;

/// Schema versions
pub mod version;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Children, ElementKind, ElementNode, NativeDocument, Settings, SourceChild, SourceNode};

// Converters
pub use converter::{ConvertContext, ConvertedNode, ConvertedShape, Converter, ConverterInfo};
pub use registry::{ConverterRegistry, Pattern};

// Transform
pub use transform::{ConversionOutput, ConversionPipeline, ConvertOptions, TreeTransformer, ValidateError, Validator};

// Audit trail
pub use logger::{ConversionLogger, ConversionSummary, LogEntry};
pub use meta::{ConversionMeta, ConversionMetaTable, ConversionSource};

// Collaborators
pub use sanitize::{NoopSanitizer, Sanitizer};

// Identity
pub use id::{IdGenerator, NodeId};
pub use hash::StableHasher;
pub use version::VersionPair;

// Error types
pub use error::{BridgeError, BridgeResult, ConvertError};
