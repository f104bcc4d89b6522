//! User settings for caltable
//!
//! Preferences consulted by the command-line layer. The event store itself
//! never reads them.

use serde::{Deserialize, Serialize};

use super::paths::CaltablePaths;
use crate::error::CaltableError;

/// User settings for caltable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Reminder applied to new events that don't specify one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_reminder_minutes: Option<u32>,

    /// Snapshot current tables into the backup directory before a restore
    #[serde(default = "default_true")]
    pub pre_restore_backup: bool,

    /// Refuse adds/edits that overlap an existing event unless forced
    #[serde(default = "default_true")]
    pub check_conflicts: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_reminder_minutes: None,
            pre_restore_backup: true,
            check_conflicts: true,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &CaltablePaths) -> Result<Self, CaltableError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                CaltableError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                CaltableError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CaltablePaths) -> Result<(), CaltableError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            CaltableError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            CaltableError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
