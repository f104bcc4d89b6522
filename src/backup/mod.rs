//! Backup and restore for caltable
//!
//! # Archive Format
//!
//! A backup is one text file made of named sections:
//!
//! ```text
//! --- event.csv ---
//! eventId,title,description,startDateTime,endDateTime
//! 1,Standup,,2025-10-05T09:00:00,2025-10-05T09:15:00
//! --- recurrent.csv ---
//! eventId,recurrentInterval,recurrentTimes,recurrentEndDate
//! 1,1d,5,0
//! ```
//!
//! Only the core and recurrence tables are archived. Restoring merges or
//! replaces the core table through the event store, while recurrence lines
//! are copied as they are.
//!
//! # Example
//!
//! ```rust,ignore
//! use caltable::backup::{restore_backup, BackupManager};
//!
//! let manager = BackupManager::new(paths.clone());
//! let path = manager.create_default_backup()?;
//!
//! // Later, merge it back into a store
//! let report = restore_backup(&path, false, &store)?;
//! println!("{}", report.summary());
//! ```

mod archive;
mod manager;
mod restore;

pub use archive::{marker_line, parse_marker, BackupArchive, Section, MISSING_FILE_LINE};
pub use manager::{BackupInfo, BackupManager};
pub use restore::{restore_backup, validate_backup, RestoreReport, ValidationReport};
