//! Path management for caltable
//!
//! Every table file the event store and the backup coordinator touch is
//! resolved here, so nothing else in the crate hard-codes a file name.
//!
//! ## Path Resolution Order
//!
//! 1. `CALTABLE_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/caltable` or `~/.config/caltable`
//! 3. Windows: `%APPDATA%\caltable`

use std::path::PathBuf;

use crate::error::CaltableError;

/// File name of the core event table
pub const EVENTS_FILE: &str = "event.csv";
/// File name of the recurrence table
pub const RECURRENCE_FILE: &str = "recurrent.csv";
/// File name of the metadata table
pub const METADATA_FILE: &str = "additional.csv";
/// File name of the reminder table
pub const REMINDERS_FILE: &str = "reminder.csv";

/// Manages all paths used by caltable
#[derive(Debug, Clone)]
pub struct CaltablePaths {
    /// Base directory for all caltable data
    base_dir: PathBuf,
}

impl CaltablePaths {
    /// Create a new CaltablePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CaltableError> {
        let base_dir = if let Ok(custom) = std::env::var("CALTABLE_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create CaltablePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory holding the table files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the default backup directory
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Core table: id, title, description, start, end
    pub fn events_file(&self) -> PathBuf {
        self.data_dir().join(EVENTS_FILE)
    }

    /// Recurrence table: rows only for recurring events
    pub fn recurrence_file(&self) -> PathBuf {
        self.data_dir().join(RECURRENCE_FILE)
    }

    /// Metadata table: location, category, priority
    pub fn metadata_file(&self) -> PathBuf {
        self.data_dir().join(METADATA_FILE)
    }

    /// Reminder table: minutes before start
    pub fn reminders_file(&self) -> PathBuf {
        self.data_dir().join(REMINDERS_FILE)
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), CaltableError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CaltableError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CaltableError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| CaltableError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CaltableError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                CaltableError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("caltable"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CaltableError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CaltableError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("caltable"))
}
