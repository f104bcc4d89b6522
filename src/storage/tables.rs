//! Row types for the four table files
//!
//! Each table is keyed by event id. The core table is authoritative; the
//! recurrence, metadata and reminder tables only decorate events that exist
//! in it and may be missing altogether.

use chrono::NaiveDateTime;
use csv::StringRecord;

use super::codec::{
    expect_fields, field, format_timestamp, parse_count, parse_id, parse_timestamp, TableRecord,
};
use crate::config::paths::{EVENTS_FILE, METADATA_FILE, RECURRENCE_FILE, REMINDERS_FILE};
use crate::error::RecordError;
use crate::models::{Event, EventId, Frequency, RecurrenceRule, Reminder};

/// Value written to the unused `recurrentEndDate` column
pub const END_DATE_PLACEHOLDER: &str = "0";

/// Core table row: id, title, description, start, end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreRow {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CoreRow {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
        }
    }
}

impl TableRecord for CoreRow {
    const TABLE: &'static str = EVENTS_FILE;
    const HEADER: &'static [&'static str] = &[
        "eventId",
        "title",
        "description",
        "startDateTime",
        "endDateTime",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.description.clone(),
            format_timestamp(&self.start),
            format_timestamp(&self.end),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, RecordError> {
        expect_fields::<Self>(fields)?;
        Ok(Self {
            id: parse_id(field(fields, 0))?,
            title: field(fields, 1).to_string(),
            description: field(fields, 2).to_string(),
            start: parse_timestamp("startDateTime", field(fields, 3))?,
            end: parse_timestamp("endDateTime", field(fields, 4))?,
        })
    }
}

/// Recurrence table row: id, interval code, occurrence count, end-date placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRow {
    pub id: EventId,
    pub rule: RecurrenceRule,
}

impl RecurrenceRow {
    pub fn from_event(event: &Event) -> Option<Self> {
        event.recurrence.as_ref().map(|rule| Self {
            id: event.id,
            rule: rule.clone(),
        })
    }
}

impl TableRecord for RecurrenceRow {
    const TABLE: &'static str = RECURRENCE_FILE;
    const HEADER: &'static [&'static str] = &[
        "eventId",
        "recurrentInterval",
        "recurrentTimes",
        "recurrentEndDate",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.rule.frequency.code().to_string(),
            self.rule.occurrences.to_string(),
            END_DATE_PLACEHOLDER.to_string(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, RecordError> {
        expect_fields::<Self>(fields)?;
        let id = parse_id(field(fields, 0))?;
        let frequency = Frequency::from_code(field(fields, 1));
        let occurrences = parse_count("recurrentTimes", field(fields, 2))?;
        if occurrences == 0 {
            return Err(RecordError::InvalidNumber {
                field: "recurrentTimes",
                value: field(fields, 2).to_string(),
            });
        }
        // recurrentEndDate is never honored; occurrence count ends the series
        Ok(Self {
            id,
            rule: RecurrenceRule::new(frequency, occurrences),
        })
    }
}

/// Metadata table row: id, location, category, priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub id: EventId,
    pub location: String,
    pub category: String,
    pub priority: String,
}

impl MetadataRow {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            location: event.location.clone(),
            category: event.category.clone(),
            priority: event.priority.clone(),
        }
    }
}

impl TableRecord for MetadataRow {
    const TABLE: &'static str = METADATA_FILE;
    const HEADER: &'static [&'static str] = &["eventId", "location", "category", "priority"];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.location.clone(),
            self.category.clone(),
            self.priority.clone(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, RecordError> {
        expect_fields::<Self>(fields)?;
        Ok(Self {
            id: parse_id(field(fields, 0))?,
            location: field(fields, 1).to_string(),
            category: field(fields, 2).to_string(),
            priority: field(fields, 3).to_string(),
        })
    }
}

/// Reminder table row: id, minutes before start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRow {
    pub id: EventId,
    pub reminder: Reminder,
}

impl ReminderRow {
    pub fn from_event(event: &Event) -> Option<Self> {
        event.reminder.map(|reminder| Self {
            id: event.id,
            reminder,
        })
    }
}

impl TableRecord for ReminderRow {
    const TABLE: &'static str = REMINDERS_FILE;
    const HEADER: &'static [&'static str] = &["eventId", "minutesBefore"];

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.reminder.minutes().to_string()]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, RecordError> {
        expect_fields::<Self>(fields)?;
        Ok(Self {
            id: parse_id(field(fields, 0))?,
            reminder: Reminder::minutes_before(parse_count("minutesBefore", field(fields, 1))?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec::{decode, encode, encode_table};
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_core_row_round_trip_with_awkward_text() {
        let row = CoreRow {
            id: EventId::new(12),
            title: "Lunch, \"the usual\"".into(),
            description: "bring:\n- notes, pens\n- \"laptop\"".into(),
            start: ts(12, 0),
            end: ts(13, 15),
        };
        let line = encode(&row);
        assert_eq!(decode::<CoreRow>(&line).unwrap(), row);
    }

    #[test]
    fn test_core_row_encoding() {
        let row = CoreRow {
            id: EventId::new(1),
            title: "Test Meeting".into(),
            description: "Demo".into(),
            start: ts(11, 0),
            end: ts(12, 0),
        };
        assert_eq!(
            encode(&row),
            "1,Test Meeting,Demo,2025-10-05T11:00:00,2025-10-05T12:00:00"
        );
    }

    #[test]
    fn test_core_row_rejects_short_line() {
        let err = decode::<CoreRow>("1,Only title").unwrap_err();
        assert_eq!(
            err,
            RecordError::FieldCount {
                expected: 5,
                found: 2
            }
        );
    }

    #[test]
    fn test_core_row_rejects_bad_timestamp() {
        let err = decode::<CoreRow>("1,a,b,tomorrow,2025-10-05T12:00:00").unwrap_err();
        assert!(matches!(err, RecordError::InvalidTimestamp { field: "startDateTime", .. }));
    }

    #[test]
    fn test_recurrence_row() {
        let row = decode::<RecurrenceRow>("4,1w,6,0").unwrap();
        assert_eq!(row.id, EventId::new(4));
        assert_eq!(row.rule, RecurrenceRule::new(Frequency::Weekly, 6));
        assert_eq!(encode(&row), "4,1w,6,0");

        let odd = decode::<RecurrenceRow>("5,1y,2,0").unwrap();
        assert_eq!(odd.rule.frequency, Frequency::Unrecognized("1y".into()));
        assert_eq!(encode(&odd), "5,1y,2,0");

        assert!(decode::<RecurrenceRow>("5,1d,0,0").is_err());
        assert!(decode::<RecurrenceRow>("5,1d,many,0").is_err());
    }

    #[test]
    fn test_metadata_row() {
        let row = decode::<MetadataRow>("2,\"Hall A, 2nd floor\",Work,HIGH").unwrap();
        assert_eq!(row.location, "Hall A, 2nd floor");
        assert_eq!(row.category, "Work");
        assert_eq!(row.priority, "HIGH");
    }

    #[test]
    fn test_reminder_row() {
        let row = decode::<ReminderRow>("3,45").unwrap();
        assert_eq!(row.reminder.minutes(), 45);
        assert!(decode::<ReminderRow>("3,-5").is_err());
    }

    #[test]
    fn test_headers() {
        let empty: Vec<CoreRow> = Vec::new();
        assert_eq!(
            encode_table(&empty),
            "eventId,title,description,startDateTime,endDateTime\n"
        );
        assert_eq!(
            RecurrenceRow::header_line(),
            "eventId,recurrentInterval,recurrentTimes,recurrentEndDate"
        );
        assert_eq!(MetadataRow::header_line(), "eventId,location,category,priority");
    }
}
