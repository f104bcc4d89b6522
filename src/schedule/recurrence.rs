//! Recurrence expansion
//!
//! Turns an event carrying a `RecurrenceRule` into its concrete occurrences.
//! Each occurrence starts one period after the previous one. For monthly
//! rules the day is clamped to the end of a shorter month, and the clamped
//! day is what the next step starts from (Jan 31 -> Feb 28 -> Mar 28).
//! Every occurrence keeps the first one's duration exactly.

use chrono::{Days, Months, NaiveDateTime};
use tracing::warn;

use crate::models::{Event, Frequency};

/// One concrete instance of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// 1-based position in the series
    pub index: u32,
    /// Length of the series
    pub total: u32,
    pub event: Event,
}

impl Occurrence {
    /// Title with the position appended, e.g. "Standup (2/5)". Display only.
    pub fn label(&self) -> String {
        format!("{} ({}/{})", self.event.title, self.index, self.total)
    }
}

/// Start of the occurrence one period after `previous`.
///
/// Unrecognized frequencies don't advance. Returns `None` only if the date
/// leaves chrono's representable range.
pub fn advance(previous: NaiveDateTime, frequency: &Frequency) -> Option<NaiveDateTime> {
    match frequency {
        Frequency::Daily => previous.checked_add_days(Days::new(1)),
        Frequency::Weekly => previous.checked_add_days(Days::new(7)),
        Frequency::Monthly => previous.checked_add_months(Months::new(1)),
        Frequency::Unrecognized(_) => Some(previous),
    }
}

/// Iterator over the occurrences of one event
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    event: &'a Event,
    total: u32,
    emitted: u32,
    // Start of the next occurrence; None once the calendar range runs out
    next_start: Option<NaiveDateTime>,
}

impl<'a> Occurrences<'a> {
    fn new(event: &'a Event) -> Self {
        let total = match &event.recurrence {
            Some(rule) => {
                if let Frequency::Unrecognized(code) = &rule.frequency {
                    warn!(
                        id = %event.id,
                        code = %code,
                        "unrecognized recurrence interval, occurrences will not advance"
                    );
                }
                rule.occurrences
            }
            None => 1,
        };
        Self {
            event,
            total,
            emitted: 0,
            next_start: Some(event.start),
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.total {
            return None;
        }

        let start = self.next_start?;
        let end = start.checked_add_signed(self.event.duration())?;

        self.emitted += 1;
        self.next_start = match &self.event.recurrence {
            Some(rule) => advance(start, &rule.frequency),
            None => None,
        };

        let mut event = self.event.clone();
        event.start = start;
        event.end = end;
        event.recurrence = None;

        Some(Occurrence {
            index: self.emitted,
            total: self.total,
            event,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.emitted) as usize;
        (0, Some(left))
    }
}

/// Occurrences of an event; a plain event has exactly one, itself
pub fn occurrences(event: &Event) -> Occurrences<'_> {
    Occurrences::new(event)
}

/// Concrete events for one event definition
pub fn expand(event: &Event) -> Vec<Event> {
    occurrences(event).map(|o| o.event).collect()
}

/// Concrete events for a whole set, in input order
pub fn expand_all(events: &[Event]) -> Vec<Event> {
    events.iter().flat_map(expand).collect()
}
