//! Storage layer for caltable
//!
//! Events live in four comma-separated table files joined by event id:
//! the core table, and the optional recurrence, metadata and reminder tables.

pub mod codec;
pub mod file_io;
pub mod store;
pub mod tables;

pub use codec::{decode, decode_table, encode, encode_table, SkippedLine, TableRecord};
pub use store::{EventStore, LoadReport, MergeReport};
pub use tables::{CoreRow, MetadataRow, RecurrenceRow, ReminderRow};
