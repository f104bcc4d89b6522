//! Record codec for the comma-separated table files
//!
//! Encoding quotes a field only when it contains the separator, a quote or a
//! line break, doubling interior quotes. Decoding goes through the `csv`
//! reader so that quoted fields spanning several physical lines come back
//! intact. A row that fails to decode is reported as a [`SkippedLine`] and
//! never stops the rest of the table from loading.

use std::fmt;

use chrono::NaiveDateTime;
use csv::{ByteRecord, StringRecord};

use crate::error::RecordError;
use crate::models::EventId;

/// Text form of every timestamp in the tables
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepted on read only: the same form with the seconds left off
const TIMESTAMP_FORMAT_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// A typed row of one of the table files
pub trait TableRecord: Sized {
    /// Table name, used for section markers and diagnostics
    const TABLE: &'static str;
    /// Column names written as the header row
    const HEADER: &'static [&'static str];

    /// Field values in header order, unescaped
    fn to_fields(&self) -> Vec<String>;

    /// Build a row from already-split fields
    fn from_fields(fields: &StringRecord) -> Result<Self, RecordError>;

    /// The header row, encoded
    fn header_line() -> String {
        Self::HEADER.join(",")
    }
}

/// A row that was dropped while reading a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub table: &'static str,
    /// 1-based physical line where the row starts (0 if unknown)
    pub line: u64,
    pub content: String,
    pub reason: RecordError,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line {}: {} [{}]",
            self.table, self.line, self.reason, self.content
        )
    }
}

/// Rows decoded from one table, plus what was skipped
#[derive(Debug)]
pub struct TableRead<R> {
    pub rows: Vec<R>,
    pub skipped: Vec<SkippedLine>,
}

impl<R> Default for TableRead<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Quote a field if it contains a separator, quote or line break
pub fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Encode a row as one logical line (no terminator)
pub fn encode<R: TableRecord>(record: &R) -> String {
    record
        .to_fields()
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode a whole table: header row, then one row per record, each newline-terminated
pub fn encode_table<'a, R, I>(records: I) -> String
where
    R: TableRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut out = R::header_line();
    out.push('\n');
    for record in records {
        out.push_str(&encode(record));
        out.push('\n');
    }
    out
}

fn table_reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(data)
}

/// Decode a single logical line
pub fn decode<R: TableRecord>(line: &str) -> Result<R, RecordError> {
    let mut reader = table_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => R::from_fields(&record),
        Some(Err(e)) => Err(RecordError::Malformed(e.to_string())),
        None => Err(RecordError::Malformed("no record on line".into())),
    }
}

/// Decode every row of a table's contents.
///
/// Blank lines and `#` comment lines are ignored, as is any row whose first
/// field is the table's id-column name (a header, wherever it appears). A
/// row that is not valid UTF-8 is skipped like any other malformed row.
pub fn decode_table<R: TableRecord>(data: impl AsRef<[u8]>) -> TableRead<R> {
    let mut read = TableRead::default();
    let mut reader = table_reader(data.as_ref());

    for result in reader.byte_records() {
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                read.skipped.push(SkippedLine {
                    table: R::TABLE,
                    line,
                    content: String::new(),
                    reason: RecordError::Malformed(e.to_string()),
                });
                continue;
            }
        };

        let line = bytes.position().map(|p| p.line()).unwrap_or(0);
        let record = match StringRecord::from_byte_record(bytes) {
            Ok(record) => record,
            Err(e) => {
                let reason = RecordError::Malformed(e.utf8_error().to_string());
                read.skipped.push(SkippedLine {
                    table: R::TABLE,
                    line,
                    content: lossy_content(&e.into_byte_record()),
                    reason,
                });
                continue;
            }
        };

        if is_blank(&record) || is_header::<R>(&record) {
            continue;
        }

        match R::from_fields(&record) {
            Ok(row) => read.rows.push(row),
            Err(reason) => read.skipped.push(SkippedLine {
                table: R::TABLE,
                line,
                content: record.iter().collect::<Vec<_>>().join(","),
                reason,
            }),
        }
    }

    read
}

fn lossy_content(bytes: &ByteRecord) -> String {
    bytes
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty()) && record.len() <= 1
}

fn is_header<R: TableRecord>(record: &StringRecord) -> bool {
    match (record.get(0), R::HEADER.first()) {
        (Some(first), Some(column)) => first.trim().eq_ignore_ascii_case(column),
        _ => false,
    }
}

/// Check the field count of a row against its header
pub fn expect_fields<R: TableRecord>(fields: &StringRecord) -> Result<(), RecordError> {
    if fields.len() != R::HEADER.len() {
        return Err(RecordError::FieldCount {
            expected: R::HEADER.len(),
            found: fields.len(),
        });
    }
    Ok(())
}

/// Field `idx` as a string (caller has already checked the count)
pub fn field(fields: &StringRecord, idx: usize) -> &str {
    fields.get(idx).unwrap_or("")
}

pub fn parse_id(value: &str) -> Result<EventId, RecordError> {
    match value.trim().parse::<u32>() {
        Ok(raw) if raw > 0 => Ok(EventId::new(raw)),
        _ => Err(RecordError::InvalidNumber {
            field: "eventId",
            value: value.to_string(),
        }),
    }
}

pub fn parse_count(field: &'static str, value: &str) -> Result<u32, RecordError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| RecordError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, RecordError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT_NO_SECONDS))
        .map_err(|_| RecordError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Minimal two-column record to exercise the generic machinery
    #[derive(Debug, PartialEq)]
    struct NoteRow {
        id: EventId,
        text: String,
    }

    impl TableRecord for NoteRow {
        const TABLE: &'static str = "notes.csv";
        const HEADER: &'static [&'static str] = &["eventId", "text"];

        fn to_fields(&self) -> Vec<String> {
            vec![self.id.to_string(), self.text.clone()]
        }

        fn from_fields(fields: &StringRecord) -> Result<Self, RecordError> {
            expect_fields::<Self>(fields)?;
            Ok(Self {
                id: parse_id(field(fields, 0))?,
                text: field(fields, 1).to_string(),
            })
        }
    }

    fn note(id: u32, text: &str) -> NoteRow {
        NoteRow {
            id: EventId::new(id),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn test_encode_decode_awkward_text() {
        for text in [
            "",
            "plain",
            "comma, inside",
            "\"quoted\"",
            "line one\nline two",
            "crlf\r\ninside",
            "all, \"of\"\nthem,,",
            "trailing space ",
            "\"",
        ] {
            let row = note(7, text);
            let line = encode(&row);
            assert_eq!(decode::<NoteRow>(&line).unwrap(), row, "text: {:?}", text);
        }
    }

    #[test]
    fn test_decode_field_count() {
        let err = decode::<NoteRow>("1,a,b").unwrap_err();
        assert_eq!(
            err,
            RecordError::FieldCount {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_decode_bad_id() {
        assert!(matches!(
            decode::<NoteRow>("x,a").unwrap_err(),
            RecordError::InvalidNumber { .. }
        ));
        assert!(matches!(
            decode::<NoteRow>("0,a").unwrap_err(),
            RecordError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn test_decode_table_skips_and_continues() {
        let text = "eventId,text\n1,first\n\n# a comment\nbroken\n2,\"multi\nline\"\nEVENTID,text\n3,third\n";
        let read = decode_table::<NoteRow>(text);

        assert_eq!(
            read.rows,
            vec![note(1, "first"), note(2, "multi\nline"), note(3, "third")]
        );
        assert_eq!(read.skipped.len(), 1);
        let skipped = &read.skipped[0];
        assert_eq!(skipped.table, "notes.csv");
        assert!(skipped.line > 0);
        assert_eq!(skipped.content, "broken");
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let data = b"eventId,text\n1,first\n2,caf\xe9\n3,third\n";
        let read = decode_table::<NoteRow>(&data[..]);

        assert_eq!(read.rows, vec![note(1, "first"), note(3, "third")]);
        assert_eq!(read.skipped.len(), 1);
        assert_eq!(read.skipped[0].line, 3);
        assert_eq!(read.skipped[0].content, "2,caf\u{fffd}");
        assert!(matches!(read.skipped[0].reason, RecordError::Malformed(_)));
    }

    #[test]
    fn test_encode_table() {
        let rows = vec![note(1, "a"), note(2, "b,c")];
        assert_eq!(encode_table(&rows), "eventId,text\n1,a\n2,\"b,c\"\n");
    }

    #[test]
    fn test_timestamps() {
        let ts = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "2025-12-31T14:30:00");
        assert_eq!(parse_timestamp("start", "2025-12-31T14:30:00").unwrap(), ts);
        assert_eq!(parse_timestamp("start", "2025-12-31T14:30").unwrap(), ts);
        assert!(parse_timestamp("start", "2025-12-31 14:30").is_err());
        assert!(parse_timestamp("start", "").is_err());
    }
}
