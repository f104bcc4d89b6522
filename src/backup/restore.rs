//! Restoring a store from a backup archive
//!
//! Recurrence lines are copied to the recurrence table as they are, with no
//! id remapping in either mode. Core lines are decoded into events; in
//! overwrite mode they replace the core table, otherwise they are merged
//! into the store with colliding ids remapped.
//!
//! Archives carry no metadata or reminders, so an overwrite restore resets
//! those tables to their headers. Otherwise rows left from the replaced
//! events would rejoin whichever restored event reuses their id.

use std::path::Path;

use tracing::{info, warn};

use super::archive::BackupArchive;
use crate::config::paths::{EVENTS_FILE, RECURRENCE_FILE};
use crate::error::{CaltableError, CaltableResult};
use crate::models::{Event, EventDraft};
use crate::storage::codec::{decode_table, encode_table, SkippedLine, TableRead};
use crate::storage::file_io::{append_lines, join_lines, write_text_atomic};
use crate::storage::{CoreRow, EventStore, MergeReport, MetadataRow, ReminderRow};

/// Result of a restore operation
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Whether the store's tables were replaced rather than merged into
    pub overwrite: bool,
    /// Events decoded from the archive
    pub restored: usize,
    /// Recurrence lines copied to the recurrence table
    pub recurrence_lines: usize,
    /// Id changes made while merging; empty in overwrite mode
    pub merge: MergeReport,
    /// Archive lines that failed to decode
    pub skipped: Vec<SkippedLine>,
}

impl RestoreReport {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let mode = if self.overwrite { "replaced" } else { "merged" };
        let mut out = format!(
            "Restored {} event(s) ({}), {} recurrence line(s)",
            self.restored, mode, self.recurrence_lines
        );
        if !self.merge.remapped.is_empty() {
            out.push_str(&format!(", {} renumbered", self.merge.remapped.len()));
        }
        if !self.skipped.is_empty() {
            out.push_str(&format!(", {} line(s) skipped", self.skipped.len()));
        }
        out
    }
}

/// Section overview of an archive, read without restoring it
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// (section name, line count) in archive order
    pub sections: Vec<(String, usize)>,
    /// Decodable events in the core section
    pub events: usize,
    /// Core section lines that would be skipped
    pub skipped: usize,
}

impl ValidationReport {
    pub fn has_events(&self) -> bool {
        self.sections.iter().any(|(name, _)| name == EVENTS_FILE)
    }

    pub fn has_recurrence(&self) -> bool {
        self.sections.iter().any(|(name, _)| name == RECURRENCE_FILE)
    }

    /// Both known sections present
    pub fn is_complete(&self) -> bool {
        self.has_events() && self.has_recurrence()
    }

    pub fn summary(&self) -> String {
        if self.sections.is_empty() {
            return "Not a backup archive (no sections)".into();
        }
        let kind = if self.is_complete() {
            "Complete backup"
        } else {
            "Partial backup"
        };
        format!(
            "{}: {} event(s), {} invalid line(s)",
            kind, self.events, self.skipped
        )
    }
}

/// Inspect an archive without restoring it
pub fn validate_backup(path: &Path) -> CaltableResult<ValidationReport> {
    let archive = BackupArchive::read(path)?;
    let core = decode_core(&archive);

    Ok(ValidationReport {
        sections: archive
            .sections()
            .iter()
            .map(|s| (s.name.clone(), s.lines.len()))
            .collect(),
        events: core.rows.len(),
        skipped: core.skipped.len(),
    })
}

/// Restore the archive at `path` into `store`.
///
/// With `overwrite` every table is replaced: recurrence and core from the
/// archive (an absent recurrence section leaves that table empty), metadata
/// and reminders with just their headers. The store then reloads from them. Without it, the archived events are merged into
/// the store and the archived recurrence lines are appended to the
/// recurrence table.
pub fn restore_backup(
    path: &Path,
    overwrite: bool,
    store: &EventStore,
) -> CaltableResult<RestoreReport> {
    let archive = BackupArchive::read(path)?;
    if archive.is_empty() {
        return Err(CaltableError::Validation(format!(
            "{} contains no backup sections",
            path.display()
        )));
    }

    let recurrence = archive.section(RECURRENCE_FILE);
    let core = decode_core(&archive);
    for skipped in &core.skipped {
        warn!("skipping invalid event line during restore: {}", skipped);
    }

    let mut report = RestoreReport {
        overwrite,
        restored: core.rows.len(),
        recurrence_lines: recurrence.map_or(0, <[String]>::len),
        skipped: core.skipped,
        ..RestoreReport::default()
    };

    let paths = store.paths();
    if overwrite {
        let no_metadata: Vec<MetadataRow> = Vec::new();
        let no_reminders: Vec<ReminderRow> = Vec::new();

        write_text_atomic(
            paths.recurrence_file(),
            &join_lines(recurrence.unwrap_or_default()),
        )?;
        write_text_atomic(paths.events_file(), &encode_table(&core.rows))?;
        write_text_atomic(paths.metadata_file(), &encode_table(&no_metadata))?;
        write_text_atomic(paths.reminders_file(), &encode_table(&no_reminders))?;
        store.load()?;
    } else {
        let events: Vec<Event> = core
            .rows
            .into_iter()
            .map(|row| {
                Event::from_draft(
                    row.id,
                    EventDraft::new(row.title, row.description, row.start, row.end),
                )
            })
            .collect();
        report.merge = store.append_merge(events)?;

        // The merge rewrote every table from memory, so append afterwards
        // and reload to pick the lines up
        if let Some(lines) = recurrence {
            append_lines(paths.recurrence_file(), lines)?;
            store.load()?;
        }
    }

    info!(
        path = %path.display(),
        overwrite,
        events = report.restored,
        "restored backup"
    );
    Ok(report)
}

fn decode_core(archive: &BackupArchive) -> TableRead<CoreRow> {
    let lines = archive.section(EVENTS_FILE).unwrap_or_default();
    decode_table::<CoreRow>(&join_lines(lines))
}
