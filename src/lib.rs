//! caltable - flat-file calendar event store
//!
//! Calendar events are kept in a handful of comma-separated table files
//! joined by event id. This library loads them into memory, assigns and
//! reconciles ids, expands recurring events into concrete occurrences,
//! detects time conflicts, and archives the tables into a single sectioned
//! backup file that can be restored or merged back.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Events, recurrence rules, reminders and ids
//! - `storage`: Table codec and the event store
//! - `schedule`: Recurrence expansion and conflict detection
//! - `backup`: Sectioned backup archives and restore
//! - `cli`: Command handlers for the binary
//! - `display`: Plain-text formatting for terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use caltable::config::paths::CaltablePaths;
//! use caltable::storage::EventStore;
//!
//! let paths = CaltablePaths::new()?;
//! let (store, report) = EventStore::open(paths)?;
//! for event in store.events()? {
//!     println!("{}", event);
//! }
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod schedule;
pub mod storage;

pub use error::{CaltableError, CaltableResult};
