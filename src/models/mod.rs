//! Core data models for caltable
//!
//! This module contains the data structures that represent the calendar
//! domain: events, their recurrence rules, reminders and identifiers.

pub mod event;
pub mod ids;

pub use event::{
    Event, EventDraft, Frequency, RecurrenceRule, Reminder, DEFAULT_CATEGORY, DEFAULT_LOCATION,
    DEFAULT_PRIORITY, MAX_OCCURRENCES,
};
pub use ids::EventId;
