//! Event CLI commands
//!
//! Thin glue between clap arguments and the event store. Drafts are
//! validated here before they reach the store, which accepts anything
//! well-typed.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::event::{
    format_conflicts, format_event_details, format_event_list, format_occurrences,
};
use crate::error::{CaltableError, CaltableResult};
use crate::models::{Event, EventDraft, EventId, Frequency, RecurrenceRule, Reminder};
use crate::schedule::{find_occurrence_conflicts, occurrences};
use crate::storage::EventStore;

/// Event subcommands
#[derive(Subcommand)]
pub enum EventCommands {
    /// Add a new event
    Add {
        /// Event title
        title: String,
        /// Start time (YYYY-MM-DD HH:MM)
        #[arg(short, long)]
        start: String,
        /// End time (YYYY-MM-DD HH:MM)
        #[arg(short, long, conflicts_with = "minutes")]
        end: Option<String>,
        /// Length in minutes, instead of an end time
        #[arg(short, long)]
        minutes: Option<u32>,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Location
        #[arg(short, long)]
        location: Option<String>,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Priority (e.g. LOW, MEDIUM, HIGH)
        #[arg(short, long)]
        priority: Option<String>,
        /// Repeat daily, weekly or monthly
        #[arg(short, long, requires = "times")]
        repeat: Option<String>,
        /// Number of occurrences when repeating
        #[arg(short, long)]
        times: Option<u32>,
        /// Reminder, in minutes before the start
        #[arg(long)]
        reminder: Option<u32>,
        /// Add even if it overlaps another event
        #[arg(short, long)]
        force: bool,
    },
    /// List events
    List {
        /// Only events on this day (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        date: Option<String>,
        /// Start of a date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End of a date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show event details
    Show {
        /// Event ID
        id: String,
    },
    /// Edit an event
    Edit {
        /// Event ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New start time; the length is kept unless --end is given
        #[arg(short, long)]
        start: Option<String>,
        /// New end time
        #[arg(short, long)]
        end: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New location
        #[arg(short, long)]
        location: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// Repeat daily, weekly or monthly
        #[arg(short, long, requires = "times")]
        repeat: Option<String>,
        /// Number of occurrences when repeating
        #[arg(short, long)]
        times: Option<u32>,
        /// Stop repeating
        #[arg(long, conflicts_with = "repeat")]
        no_repeat: bool,
        /// New reminder, in minutes before the start
        #[arg(long)]
        reminder: Option<u32>,
        /// Remove the reminder
        #[arg(long, conflicts_with = "reminder")]
        no_reminder: bool,
        /// Save even if it overlaps another event
        #[arg(short, long)]
        force: bool,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
    /// List every occurrence of an event
    Occurrences {
        /// Event ID
        id: String,
    },
    /// Find events by exact title
    Search {
        /// Title to match
        title: String,
    },
}

/// Handle an event command
pub fn handle_event_command(
    store: &EventStore,
    settings: &Settings,
    cmd: EventCommands,
) -> CaltableResult<()> {
    match cmd {
        EventCommands::Add {
            title,
            start,
            end,
            minutes,
            description,
            location,
            category,
            priority,
            repeat,
            times,
            reminder,
            force,
        } => {
            let start = parse_datetime(&start)?;
            let end = match (end, minutes) {
                (Some(end), _) => parse_datetime(&end)?,
                (None, Some(minutes)) => start + Duration::minutes(i64::from(minutes)),
                (None, None) => start + Duration::hours(1),
            };

            let mut draft = EventDraft::new(title, description, start, end);
            if let Some(location) = location {
                draft.location = location;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if let Some(priority) = priority {
                draft.priority = priority.to_uppercase();
            }
            draft.recurrence = parse_recurrence(repeat.as_deref(), times)?;
            draft.reminder = reminder
                .or(settings.default_reminder_minutes)
                .map(Reminder::minutes_before);

            draft.validate()?;

            let candidate = Event::from_draft(store.next_id()?, draft.clone());
            check_conflicts(store, settings, &candidate, force)?;

            let event = store.add(draft)?;
            println!("Added event #{}: {}", event.id, event.title);
        }

        EventCommands::List { date, from, to } => {
            let events = match (date, from, to) {
                (Some(date), _, _) => store.on_date(parse_date(&date)?)?,
                (None, None, None) => store.events()?,
                (None, from, to) => {
                    let from = match from {
                        Some(s) => parse_date(&s)?,
                        None => NaiveDate::MIN,
                    };
                    let to = match to {
                        Some(s) => parse_date(&s)?,
                        None => NaiveDate::MAX,
                    };
                    store.in_date_range(from, to)?
                }
            };

            print!("{}", format_event_list(&events));
        }

        EventCommands::Show { id } => {
            let event = find_event(store, &id)?;
            print!("{}", format_event_details(&event));
        }

        EventCommands::Edit {
            id,
            title,
            start,
            end,
            description,
            location,
            category,
            priority,
            repeat,
            times,
            no_repeat,
            reminder,
            no_reminder,
            force,
        } => {
            let mut event = find_event(store, &id)?;

            if let Some(title) = title {
                event.title = title;
            }
            if let Some(start) = start {
                let length = event.duration();
                event.start = parse_datetime(&start)?;
                event.end = event.start + length;
            }
            if let Some(end) = end {
                event.end = parse_datetime(&end)?;
            }
            if let Some(description) = description {
                event.description = description;
            }
            if let Some(location) = location {
                event.location = location;
            }
            if let Some(category) = category {
                event.category = category;
            }
            if let Some(priority) = priority {
                event.priority = priority.to_uppercase();
            }
            if no_repeat {
                event.recurrence = None;
            } else if repeat.is_some() {
                event.recurrence = parse_recurrence(repeat.as_deref(), times)?;
            } else if let (Some(times), Some(rule)) = (times, event.recurrence.as_mut()) {
                rule.occurrences = times;
            }
            if no_reminder {
                event.reminder = None;
            } else if let Some(minutes) = reminder {
                event.reminder = Some(Reminder::minutes_before(minutes));
            }

            event.to_draft().validate()?;
            check_conflicts(store, settings, &event, force)?;

            if !store.update(event.clone())? {
                return Err(CaltableError::event_not_found(id));
            }
            println!("Updated event #{}: {}", event.id, event.title);
        }

        EventCommands::Delete { id } => {
            let event_id = parse_id(&id)?;
            if !store.delete(event_id)? {
                return Err(CaltableError::event_not_found(id));
            }
            println!("Deleted event #{}", event_id);
        }

        EventCommands::Occurrences { id } => {
            let event = find_event(store, &id)?;
            let list: Vec<_> = occurrences(&event).collect();
            print!("{}", format_occurrences(&list));
        }

        EventCommands::Search { title } => {
            let events = store.by_title(&title)?;
            print!("{}", format_event_list(&events));
        }
    }

    Ok(())
}

/// Refuse `candidate` if any of its occurrences overlaps a stored one
fn check_conflicts(
    store: &EventStore,
    settings: &Settings,
    candidate: &Event,
    force: bool,
) -> CaltableResult<()> {
    if force || !settings.check_conflicts {
        return Ok(());
    }

    let existing = store.events()?;
    let clashes = find_occurrence_conflicts(candidate, &existing);
    if clashes.is_empty() {
        return Ok(());
    }

    let mut others: Vec<&Event> = Vec::new();
    for (_, other) in &clashes {
        if !others.iter().any(|e| e.id == other.id && e.start == other.start) {
            others.push(other);
        }
    }
    eprint!("{}", format_conflicts(candidate, &others));

    Err(CaltableError::Validation(
        "Event overlaps existing events (use --force to save anyway)".into(),
    ))
}

fn find_event(store: &EventStore, id: &str) -> CaltableResult<Event> {
    let event_id = parse_id(id)?;
    store
        .find_by_id(event_id)?
        .ok_or_else(|| CaltableError::event_not_found(id))
}

fn parse_id(id: &str) -> CaltableResult<EventId> {
    id.parse()
        .map_err(|_| CaltableError::Validation(format!("Invalid event ID: '{}'", id)))
}

fn parse_recurrence(
    repeat: Option<&str>,
    times: Option<u32>,
) -> CaltableResult<Option<RecurrenceRule>> {
    let Some(repeat) = repeat else {
        return Ok(None);
    };
    let frequency = Frequency::parse(repeat).ok_or_else(|| {
        CaltableError::Validation(format!(
            "Invalid repeat '{}'. Use daily, weekly or monthly",
            repeat
        ))
    })?;
    let times = times.ok_or_else(|| {
        CaltableError::Validation("--times is required with --repeat".into())
    })?;
    Ok(Some(RecurrenceRule::new(frequency, times)))
}

/// Parse a date and time as typed on the command line
pub fn parse_datetime(s: &str) -> CaltableResult<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| {
            CaltableError::Validation(format!(
                "Invalid date/time '{}'. Use YYYY-MM-DD HH:MM",
                s
            ))
        })
}

/// Parse a date as typed on the command line
pub fn parse_date(s: &str) -> CaltableResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        CaltableError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-10-05 09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2025-10-05T09:30:00").unwrap(), expected);
        assert!(parse_datetime("tomorrow").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-10-05").unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 5).unwrap()
        );
        assert!(parse_date("05/10/2025").is_err());
    }

    #[test]
    fn test_parse_recurrence() {
        assert_eq!(parse_recurrence(None, Some(3)).unwrap(), None);
        assert_eq!(
            parse_recurrence(Some("weekly"), Some(3)).unwrap(),
            Some(RecurrenceRule::new(Frequency::Weekly, 3))
        );
        assert!(parse_recurrence(Some("yearly"), Some(3)).is_err());
        assert!(parse_recurrence(Some("daily"), None).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("#7").unwrap(), EventId::new(7));
        assert!(parse_id("seven").unwrap_err().is_validation());
    }
}
