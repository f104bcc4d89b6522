//! Display formatting for terminal output

pub mod event;

pub use event::{
    format_conflicts, format_event_details, format_event_list, format_event_row,
    format_occurrences, format_skipped,
};
