//! Scheduling over stored events: recurrence expansion and conflict checks

pub mod conflict;
pub mod recurrence;

pub use conflict::{find_conflicts, find_occurrence_conflicts, has_conflict, overlaps};
pub use recurrence::{expand, expand_all, occurrences, Occurrence, Occurrences};
