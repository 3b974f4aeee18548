//! Conversion audit trail.
//!
//! Append-only record of what was converted, degraded, or lost, in four
//! categories. Every record also emits a `tracing` event; the library never
//! installs a subscriber.
//!
//! A logger belongs to one conversion at a time: [`ConversionPipeline`]
//! either owns a private one per call or resets the caller's before use.
//!
//! [`ConversionPipeline`]: crate::transform::ConversionPipeline

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::converter::Warnings;
use crate::error::BridgeResult;

// =============================================================================
// Entries
// =============================================================================

/// A widget converted by the registry or the pattern heuristic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEntry {
    pub original_type: String,
    pub converted_type: String,
    pub converter_name: String,
    pub data_loss: bool,
    pub warnings: Warnings,
}

/// A widget that degraded to markup or passed through unresolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEntry {
    pub original_type: String,
    pub reason: String,
    pub had_content: bool,
}

/// A recovered per-node failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub original_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Source settings with no faithful target representation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningEntry {
    pub original_type: String,
    pub lost_fields: Vec<String>,
}

/// Any log record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LogEntry {
    Success(SuccessEntry),
    Fallback(FallbackEntry),
    Error(ErrorEntry),
    Warning(WarningEntry),
}

// =============================================================================
// ConversionLogger
// =============================================================================

/// Append-only conversion audit trail
#[derive(Debug, Clone, Default)]
pub struct ConversionLogger {
    successes: Vec<SuccessEntry>,
    fallbacks: Vec<FallbackEntry>,
    errors: Vec<ErrorEntry>,
    warnings: Vec<WarningEntry>,
}

impl ConversionLogger {
    pub fn new() -> Self {
        Self::default()
    }

    impl_log_categories!(
        successes: SuccessEntry,
        fallbacks: FallbackEntry,
        errors: ErrorEntry,
        warnings: WarningEntry,
    );

    // ─────────────────────────────────────────────────────────────────────────
    // Recording
    // ─────────────────────────────────────────────────────────────────────────

    pub fn log_success(&mut self, entry: SuccessEntry) {
        tracing::debug!(
            original = %entry.original_type,
            converted = %entry.converted_type,
            converter = %entry.converter_name,
            data_loss = entry.data_loss,
            "widget converted"
        );
        self.successes.push(entry);
    }

    pub fn log_fallback(&mut self, entry: FallbackEntry) {
        tracing::warn!(
            original = %entry.original_type,
            had_content = entry.had_content,
            reason = %entry.reason,
            "widget fell back"
        );
        self.fallbacks.push(entry);
    }

    pub fn log_error(&mut self, entry: ErrorEntry) {
        tracing::warn!(
            original = %entry.original_type,
            node = entry.node_id.as_deref().unwrap_or("-"),
            message = %entry.message,
            "conversion error recovered"
        );
        self.errors.push(entry);
    }

    pub fn log_warning(&mut self, entry: WarningEntry) {
        tracing::debug!(
            original = %entry.original_type,
            lost = ?entry.lost_fields,
            "settings dropped"
        );
        self.warnings.push(entry);
    }

    /// Record any entry in its category
    pub fn record(&mut self, entry: LogEntry) {
        match entry {
            LogEntry::Success(e) => self.log_success(e),
            LogEntry::Fallback(e) => self.log_fallback(e),
            LogEntry::Error(e) => self.log_error(e),
            LogEntry::Warning(e) => self.log_warning(e),
        }
    }

    /// Clear all four categories together
    pub fn reset(&mut self) {
        self.successes.clear();
        self.fallbacks.clear();
        self.errors.clear();
        self.warnings.clear();
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.fallbacks.is_empty() && self.errors.is_empty() && self.warnings.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reporting
    // ─────────────────────────────────────────────────────────────────────────

    /// Aggregate counts against the number of nodes in the converted tree
    pub fn summarize(&self, total_nodes: usize) -> ConversionSummary {
        let converted_lossy = self.successes.iter().filter(|s| s.data_loss).count();
        let converted_clean = self.successes.len() - converted_lossy;
        let unchanged = total_nodes
            .saturating_sub(self.successes.len())
            .saturating_sub(self.fallbacks.len())
            .saturating_sub(self.errors.len());

        ConversionSummary {
            total_nodes,
            converted_clean,
            converted_lossy,
            fallbacks: self.fallbacks.len(),
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            unchanged,
        }
    }

    /// Read-only snapshot of the trail
    pub fn stats(&self) -> LoggerStats {
        let mut by_converter = BTreeMap::new();
        for s in &self.successes {
            *by_converter.entry(s.converter_name.clone()).or_insert(0) += 1;
        }

        LoggerStats {
            successes: self.successes.len(),
            lossy: self.successes.iter().filter(|s| s.data_loss).count(),
            fallbacks: self.fallbacks.len(),
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            by_converter,
            fallback_types: self.fallbacks.iter().map(|f| f.original_type.clone()).collect(),
        }
    }

    /// Summary plus every entry, as JSON
    pub fn to_json_report(&self, total_nodes: usize) -> BridgeResult<Value> {
        Ok(json!({
            "summary": serde_json::to_value(self.summarize(total_nodes))?,
            "successes": serde_json::to_value(&self.successes)?,
            "fallbacks": serde_json::to_value(&self.fallbacks)?,
            "errors": serde_json::to_value(&self.errors)?,
            "warnings": serde_json::to_value(&self.warnings)?,
        }))
    }
}

// =============================================================================
// Summary & stats
// =============================================================================

/// Per-conversion counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub total_nodes: usize,
    pub converted_clean: usize,
    pub converted_lossy: usize,
    pub fallbacks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub unchanged: usize,
}

impl ConversionSummary {
    /// Widgets converted with or without loss
    pub fn converted(&self) -> usize {
        self.converted_clean + self.converted_lossy
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes: {} converted ({} lossy), {} fallbacks, {} errors, {} warnings, {} unchanged",
            self.total_nodes,
            self.converted(),
            self.converted_lossy,
            self.fallbacks,
            self.errors,
            self.warnings,
            self.unchanged
        )
    }
}

/// Snapshot returned by [`ConversionLogger::stats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerStats {
    pub successes: usize,
    pub lossy: usize,
    pub fallbacks: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Successful conversions per converter name
    pub by_converter: BTreeMap<String, usize>,
    /// Original types that fell back, in order
    pub fallback_types: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================
