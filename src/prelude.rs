//! Prelude module for common imports.
//!
//! ```ignore
//! use widget_bridge::prelude::*;
//! ```

// Node types
pub use crate::node::{Children, ElementKind, ElementNode, NativeDocument, Settings, SourceChild, SourceNode};

// Converters
pub use crate::converter::{ConvertContext, ConvertedNode, ConvertedShape, Converter, ConverterInfo, Warnings};
pub use crate::registry::{ConverterRegistry, DEFAULT_PRIORITY, Pattern};

// Transform
pub use crate::transform::{
    ConversionOutput, ConversionPipeline, ConvertOptions, FallbackLadder, TreeTransformer, ValidateError, Validator,
    is_custom_widget,
};

// Migration
pub use crate::migration::SettingsMigrator;

// Audit trail
pub use crate::logger::{ConversionLogger, ConversionSummary, LogEntry};
pub use crate::meta::{ConversionMeta, ConversionMetaTable, ConversionSource};

// Collaborators
pub use crate::sanitize::{NoopSanitizer, Sanitizer};

// Identity
pub use crate::id::{IdGenerator, NodeId};
pub use crate::version::VersionPair;

// Error
pub use crate::error::{BridgeError, BridgeResult, ConvertError};
