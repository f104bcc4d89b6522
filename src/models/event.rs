//! Event model
//!
//! One event shape covers both plain and recurring events: a recurring event
//! is simply an event whose `recurrence` is `Some`. Location, category and
//! priority are plain strings whose defaults are applied when the metadata
//! table is joined in, not by the core table.

use chrono::{Duration, NaiveDateTime};
use std::fmt;

use super::ids::EventId;
use crate::error::{CaltableError, CaltableResult};

/// Location used when an event has no metadata row
pub const DEFAULT_LOCATION: &str = "";
/// Category used when an event has no metadata row
pub const DEFAULT_CATEGORY: &str = "General";
/// Priority used when an event has no metadata row
pub const DEFAULT_PRIORITY: &str = "MEDIUM";
/// Longest series a new or edited event may declare
pub const MAX_OCCURRENCES: u32 = 10_000;

/// How far each occurrence of a recurring event moves
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    /// An interval code this crate doesn't understand, kept verbatim so a
    /// save writes it back unchanged. Expands with no advance.
    Unrecognized(String),
}

impl Frequency {
    /// Short interval code stored in the recurrence table
    pub fn code(&self) -> &str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1w",
            Self::Monthly => "1m",
            Self::Unrecognized(code) => code,
        }
    }

    /// Decode an interval code by its unit suffix (`1d`, `1w`, `1m`)
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if code.ends_with('d') {
            Self::Daily
        } else if code.ends_with('w') {
            Self::Weekly
        } else if code.ends_with('m') {
            Self::Monthly
        } else {
            Self::Unrecognized(code.to_string())
        }
    }

    /// Parse a user-facing name (daily, weekly, monthly)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Self::Daily),
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "DAILY"),
            Self::Weekly => write!(f, "WEEKLY"),
            Self::Monthly => write!(f, "MONTHLY"),
            Self::Unrecognized(code) => write!(f, "UNRECOGNIZED({})", code),
        }
    }
}

/// Repeat rule attached to an event's first occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Total number of occurrences, including the first
    pub occurrences: u32,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, occurrences: u32) -> Self {
        Self {
            frequency,
            occurrences,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.frequency, self.occurrences)
    }
}

/// Reminder offset in minutes before an event starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder(u32);

impl Reminder {
    pub fn minutes_before(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// When the reminder fires for an event starting at `start`
    pub fn fires_at(&self, start: NaiveDateTime) -> NaiveDateTime {
        start - Duration::minutes(i64::from(self.0))
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        if m < 60 {
            write!(f, "{} minutes before", m)
        } else if m == 1440 {
            write!(f, "1 day before")
        } else if m % 1440 == 0 {
            write!(f, "{} days before", m / 1440)
        } else if m % 60 == 0 {
            write!(f, "{} hours before", m / 60)
        } else {
            write!(f, "{} minutes before", m)
        }
    }
}

/// Everything about an event except its id, as supplied for a new event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reminder: Option<Reminder>,
    pub location: String,
    pub category: String,
    pub priority: String,
    pub recurrence: Option<RecurrenceRule>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

impl EventDraft {
    /// A plain event with default metadata and no reminder
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            start,
            end,
            reminder: None,
            location: default_location(),
            category: default_category(),
            priority: default_priority(),
            recurrence: None,
        }
    }

    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    pub fn with_reminder(mut self, reminder: Reminder) -> Self {
        self.reminder = Some(reminder);
        self
    }

    pub fn with_metadata(
        mut self,
        location: impl Into<String>,
        category: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        self.location = location.into();
        self.category = category.into();
        self.priority = priority.into();
        self
    }

    /// Caller-side checks; the store stores whatever it is given.
    pub fn validate(&self) -> CaltableResult<()> {
        if self.title.trim().is_empty() {
            return Err(CaltableError::Validation("Event title cannot be empty".into()));
        }
        if self.start >= self.end {
            return Err(CaltableError::Validation(format!(
                "Event must end after it starts ({} >= {})",
                self.start, self.end
            )));
        }
        if let Some(rule) = &self.recurrence {
            if rule.occurrences == 0 {
                return Err(CaltableError::Validation(
                    "Recurring event needs at least one occurrence".into(),
                ));
            }
            if rule.occurrences > MAX_OCCURRENCES {
                return Err(CaltableError::Validation(format!(
                    "Recurring event can have at most {} occurrences",
                    MAX_OCCURRENCES
                )));
            }
        }
        Ok(())
    }
}

/// A stored calendar event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reminder: Option<Reminder>,
    pub location: String,
    pub category: String,
    pub priority: String,
    pub recurrence: Option<RecurrenceRule>,
}

impl Event {
    /// Attach an id to a draft
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            start: draft.start,
            end: draft.end,
            reminder: draft.reminder,
            location: draft.location,
            category: draft.category,
            priority: draft.priority,
            recurrence: draft.recurrence,
        }
    }

    /// Strip the id, e.g. to edit fields and validate again
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start: self.start,
            end: self.end,
            reminder: self.reminder,
            location: self.location.clone(),
            category: self.category.clone(),
            priority: self.priority.clone(),
            recurrence: self.recurrence.clone(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Whether location, category and priority are all at their defaults
    pub fn has_default_metadata(&self) -> bool {
        self.location == DEFAULT_LOCATION
            && self.category == DEFAULT_CATEGORY
            && self.priority == DEFAULT_PRIORITY
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({} -> {})",
            self.id,
            self.title,
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_frequency_codes() {
        assert_eq!(Frequency::Daily.code(), "1d");
        assert_eq!(Frequency::Weekly.code(), "1w");
        assert_eq!(Frequency::Monthly.code(), "1m");

        assert_eq!(Frequency::from_code("1d"), Frequency::Daily);
        assert_eq!(Frequency::from_code("2w"), Frequency::Weekly);
        assert_eq!(Frequency::from_code(" 1m "), Frequency::Monthly);
        assert_eq!(
            Frequency::from_code("1y"),
            Frequency::Unrecognized("1y".into())
        );
        assert_eq!(Frequency::Unrecognized("1y".into()).code(), "1y");
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(Frequency::parse("Weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("MONTHLY"), Some(Frequency::Monthly));
        assert_eq!(Frequency::parse("yearly"), None);
    }

    #[test]
    fn test_reminder_display() {
        assert_eq!(Reminder::minutes_before(15).to_string(), "15 minutes before");
        assert_eq!(Reminder::minutes_before(120).to_string(), "2 hours before");
        assert_eq!(Reminder::minutes_before(1440).to_string(), "1 day before");
        assert_eq!(Reminder::minutes_before(2880).to_string(), "2 days before");
        assert_eq!(Reminder::minutes_before(90).to_string(), "90 minutes before");
    }

    #[test]
    fn test_reminder_fires_at() {
        let reminder = Reminder::minutes_before(30);
        assert_eq!(
            reminder.fires_at(at(5, 10)),
            at(5, 9) + Duration::minutes(30)
        );
    }

    #[test]
    fn test_draft_defaults() {
        let draft = EventDraft::new("Standup", "", at(5, 9), at(5, 10));
        assert_eq!(draft.location, "");
        assert_eq!(draft.category, "General");
        assert_eq!(draft.priority, "MEDIUM");
        assert!(draft.reminder.is_none());
        assert!(draft.recurrence.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(EventDraft::new("Ok", "", at(5, 9), at(5, 10)).validate().is_ok());

        let err = EventDraft::new("Backwards", "", at(5, 10), at(5, 9))
            .validate()
            .unwrap_err();
        assert!(err.is_validation());

        let err = EventDraft::new("Zero", "", at(5, 9), at(5, 9))
            .validate()
            .unwrap_err();
        assert!(err.is_validation());

        let err = EventDraft::new("  ", "", at(5, 9), at(5, 10))
            .validate()
            .unwrap_err();
        assert!(err.is_validation());

        let err = EventDraft::new("Never", "", at(5, 9), at(5, 10))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 0))
            .validate()
            .unwrap_err();
        assert!(err.is_validation());

        assert!(EventDraft::new("Long", "", at(5, 9), at(5, 10))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, MAX_OCCURRENCES))
            .validate()
            .is_ok());
        let err = EventDraft::new("Endless", "", at(5, 9), at(5, 10))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 4_000_000_000))
            .validate()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_event_from_draft_round_trip() {
        let draft = EventDraft::new("Review", "quarterly", at(6, 14), at(6, 16))
            .with_reminder(Reminder::minutes_before(10))
            .with_metadata("Room 4", "Work", "HIGH")
            .with_recurrence(RecurrenceRule::new(Frequency::Monthly, 3));
        let event = Event::from_draft(EventId::new(3), draft.clone());

        assert_eq!(event.id, EventId::new(3));
        assert!(event.is_recurring());
        assert!(!event.has_default_metadata());
        assert_eq!(event.duration(), Duration::hours(2));
        assert_eq!(event.to_draft(), draft);
    }
}
