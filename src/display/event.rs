//! Event display formatting
//!
//! Plain-text list and detail views of events for terminal output.

use crate::models::Event;
use crate::schedule::Occurrence;
use crate::storage::SkippedLine;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Format a single event as a list row
pub fn format_event_row(event: &Event) -> String {
    let repeat = match &event.recurrence {
        Some(rule) => format!(" [{}]", rule),
        None => String::new(),
    };

    format!(
        "{:>4} {} {}-{} {}{}",
        event.id.get(),
        event.start.format(DATE_FORMAT),
        event.start.format(TIME_FORMAT),
        format_end(event),
        truncate(&event.title, 30),
        repeat
    )
}

/// Format a list of events with a header
pub fn format_event_list(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4} {:10} {:11} {}\n",
        "ID", "Date", "Time", "Title"
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for event in events {
        output.push_str(&format_event_row(event));
        output.push('\n');
    }

    output.push_str(&format!("\nTotal: {} event(s)\n", events.len()));
    output
}

/// Format event details for display
pub fn format_event_details(event: &Event) -> String {
    let mut output = String::new();

    output.push_str(&format!("Event:       #{}\n", event.id));
    output.push_str(&format!("Title:       {}\n", event.title));
    if !event.description.is_empty() {
        output.push_str("Description:\n");
        for line in event.description.lines() {
            output.push_str(&format!("  {}\n", line));
        }
    }
    output.push_str(&format!(
        "Start:       {}\n",
        event.start.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "End:         {}\n",
        event.end.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "Duration:    {}\n",
        format_minutes(event.duration().num_minutes())
    ));

    if !event.location.is_empty() {
        output.push_str(&format!("Location:    {}\n", event.location));
    }
    output.push_str(&format!("Category:    {}\n", event.category));
    output.push_str(&format!("Priority:    {}\n", event.priority));

    if let Some(reminder) = event.reminder {
        output.push_str(&format!(
            "Reminder:    {} ({})\n",
            reminder,
            reminder.fires_at(event.start).format("%Y-%m-%d %H:%M")
        ));
    }

    if let Some(rule) = &event.recurrence {
        output.push_str(&format!(
            "Repeats:     {} for {} occurrence(s)\n",
            rule.frequency, rule.occurrences
        ));
    }

    output
}

/// Format the occurrences of one event, one per line
pub fn format_occurrences(occurrences: &[Occurrence]) -> String {
    let mut output = String::new();

    for occ in occurrences {
        output.push_str(&format!(
            "{} {}-{} {}\n",
            occ.event.start.format(DATE_FORMAT),
            occ.event.start.format(TIME_FORMAT),
            format_end(&occ.event),
            occ.label()
        ));
    }

    output
}

/// Format the events a candidate clashes with
pub fn format_conflicts(candidate: &Event, conflicts: &[&Event]) -> String {
    let mut output = format!(
        "'{}' overlaps {} existing event(s):\n",
        candidate.title,
        conflicts.len()
    );
    for event in conflicts {
        output.push_str(&format!("  {}\n", event));
    }
    output
}

/// Format rows dropped while reading tables
pub fn format_skipped(skipped: &[SkippedLine]) -> String {
    let mut output = String::new();
    for line in skipped {
        output.push_str(&format!("  skipped {}\n", line));
    }
    output
}

/// End time, with the date when the event runs past its start day
fn format_end(event: &Event) -> String {
    if event.end.date() == event.start.date() {
        event.end.format(TIME_FORMAT).to_string()
    } else {
        event.end.format("%m-%d %H:%M").to_string()
    }
}

fn format_minutes(total: i64) -> String {
    let (hours, minutes) = (total / 60, total % 60);
    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
