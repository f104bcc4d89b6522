//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the event store.

pub mod backup;
pub mod event;

pub use backup::{handle_backup_command, BackupCommands};
pub use event::{handle_event_command, EventCommands};
