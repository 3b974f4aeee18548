//! Widget-type and settings migration.
//!
//! Applies the static tables in [`tables`]:
//!
//! 1. **Type migration**: deprecated-type table (unconditional), then each
//!    single-step table of the version chain in order.
//! 2. **Settings migration**: common renames, then the rename table of the
//!    resolved widget type, then value transforms keyed by the new key.
//!    Unmapped keys pass through. Identifier keys are defaulted last.

pub mod tables;

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::node::Settings;
use crate::version::VersionPair;

use self::tables::{
    COMMON_RENAMES, CONTAINER_RULE_KEY, DEPRECATED_TYPES, IDENTIFIER_KEYS, SETTINGS_RULES,
    SettingsRule, VERSION_STEPS,
};

type RenameMap = FxHashMap<&'static str, &'static str>;

// =============================================================================
// SettingsMigrator
// =============================================================================

/// Indexed view over the migration tables
#[derive(Debug, Clone)]
pub struct SettingsMigrator {
    deprecated: RenameMap,
    steps: FxHashMap<(u32, u32), RenameMap>,
    rules: FxHashMap<&'static str, &'static SettingsRule>,
}

impl Default for SettingsMigrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsMigrator {
    /// Index the built-in tables
    pub fn new() -> Self {
        Self {
            deprecated: DEPRECATED_TYPES.iter().copied().collect(),
            steps: VERSION_STEPS
                .iter()
                .map(|(pair, renames)| (*pair, renames.iter().copied().collect()))
                .collect(),
            rules: SETTINGS_RULES.iter().map(|r| (r.widget_type, r)).collect(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Widget type
    // ─────────────────────────────────────────────────────────────────────────

    /// Migrate a widget type name across the given version pair
    pub fn migrate_widget_type(&self, widget_type: &str, versions: VersionPair) -> CompactString {
        let mut current: &str = self.deprecated.get(widget_type).copied().unwrap_or(widget_type);

        for step in versions.steps() {
            if let Some(&renamed) = self.steps.get(&step).and_then(|t| t.get(current)) {
                tracing::trace!(from = current, to = renamed, ?step, "widget type migrated");
                current = renamed;
            }
        }
        CompactString::from(current)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    /// Migrate the settings of a widget of `widget_type`
    pub fn migrate_widget(&self, widget_type: &str, settings: Settings) -> Settings {
        self.migrate(Some(widget_type), settings)
    }

    /// Migrate the settings of a container
    pub fn migrate_container(&self, settings: Settings) -> Settings {
        self.migrate(Some(CONTAINER_RULE_KEY), settings)
    }

    /// Migrate settings with the rule for `rule_key`, if any
    pub fn migrate(&self, rule_key: Option<&str>, settings: Settings) -> Settings {
        let mut settings = apply_renames(settings, COMMON_RENAMES);

        if let Some(rule) = rule_key.and_then(|k| self.rules.get(k)) {
            settings = apply_renames(settings, rule.renames);
            for (key, transform) in rule.transforms {
                if let Some(value) = settings.remove(*key) {
                    settings.insert((*key).to_string(), transform(value));
                }
            }
        }

        ensure_identifier_keys(&mut settings);
        settings
    }

    /// Check whether a settings rule exists for a widget type
    pub fn has_rule(&self, widget_type: &str) -> bool {
        self.rules.contains_key(widget_type)
    }
}

/// Rename keys; when both the old and the new key exist, the new one wins
fn apply_renames(settings: Settings, renames: &[(&str, &str)]) -> Settings {
    let mut out = Settings::new();
    let mut renamed: Vec<(&str, Value)> = Vec::new();

    for (key, value) in settings {
        match renames.iter().find(|(old, _)| *old == key) {
            Some((_, new)) => renamed.push((*new, value)),
            None => {
                out.insert(key, value);
            }
        }
    }
    for (new, value) in renamed {
        if !out.contains_key(new) {
            out.insert(new.to_string(), value);
        }
    }
    out
}

/// Insert empty-string defaults for the identifier slots
pub fn ensure_identifier_keys(settings: &mut Settings) {
    for key in IDENTIFIER_KEYS {
        settings
            .entry(*key)
            .or_insert_with(|| Value::String(String::new()));
    }
}

// =============================================================================
// Tests
// =============================================================================
