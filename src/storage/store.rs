//! Event store backed by the comma-separated table files
//!
//! The store owns the authoritative in-memory event list and the next-id
//! counter. Every mutation rewrites all tables before it is committed to
//! memory, and runs under the store's write lock together with that rewrite.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::codec::{decode_table, encode_table, SkippedLine, TableRead, TableRecord};
use super::file_io::{read_bytes, write_text_atomic};
use super::tables::{CoreRow, MetadataRow, RecurrenceRow, ReminderRow};
use crate::config::paths::CaltablePaths;
use crate::error::{CaltableError, CaltableResult, RecordError};
use crate::models::{
    Event, EventDraft, EventId, RecurrenceRule, Reminder, DEFAULT_CATEGORY, DEFAULT_LOCATION,
    DEFAULT_PRIORITY,
};

/// Outcome of loading the tables
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of events now in memory
    pub loaded: usize,
    /// Rows dropped from any table
    pub skipped: Vec<SkippedLine>,
    /// Whether the core table was missing and has been created
    pub created: bool,
}

/// Outcome of merging foreign events into the store
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Events added with their own id
    pub kept: Vec<EventId>,
    /// Events that collided, as (incoming id, assigned id)
    pub remapped: Vec<(EventId, EventId)>,
}

impl MergeReport {
    pub fn added(&self) -> usize {
        self.kept.len() + self.remapped.len()
    }
}

struct StoreState {
    events: Vec<Event>,
    // None once the largest id is u32::MAX
    next_id: Option<EventId>,
}

impl StoreState {
    fn empty() -> Self {
        Self {
            events: Vec::new(),
            next_id: Some(EventId::new(1)),
        }
    }
}

/// The single source of truth for events
pub struct EventStore {
    paths: CaltablePaths,
    state: RwLock<StoreState>,
}

impl EventStore {
    /// Create an empty store over the given tables without touching disk
    pub fn new(paths: CaltablePaths) -> Self {
        Self {
            paths,
            state: RwLock::new(StoreState::empty()),
        }
    }

    /// Create a store and load it from disk
    pub fn open(paths: CaltablePaths) -> CaltableResult<(Self, LoadReport)> {
        let store = Self::new(paths);
        let report = store.load()?;
        Ok((store, report))
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &CaltablePaths {
        &self.paths
    }

    fn read_state(&self) -> CaltableResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|e| CaltableError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_state(&self) -> CaltableResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| CaltableError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load all tables from disk, replacing the in-memory set.
    ///
    /// A missing core table is created with just its header. Missing or
    /// unreadable recurrence/metadata/reminder tables count as empty.
    pub fn load(&self) -> CaltableResult<LoadReport> {
        let mut state = self.write_state()?;
        let mut report = LoadReport::default();

        let events_file = self.paths.events_file();
        let core = match read_bytes(&events_file)? {
            Some(data) => decode_table::<CoreRow>(&data),
            None => {
                let empty: Vec<CoreRow> = Vec::new();
                write_text_atomic(&events_file, &encode_table(&empty))?;
                info!(path = %events_file.display(), "created empty event table");
                report.created = true;
                TableRead::default()
            }
        };

        let recurrence = read_aux::<RecurrenceRow>(&self.paths.recurrence_file());
        let metadata = read_aux::<MetadataRow>(&self.paths.metadata_file());
        let reminders = read_aux::<ReminderRow>(&self.paths.reminders_file());

        report.skipped.extend(core.skipped);
        report.skipped.extend(recurrence.skipped);
        report.skipped.extend(metadata.skipped);
        report.skipped.extend(reminders.skipped);

        let (events, duplicates) =
            join_tables(core.rows, recurrence.rows, metadata.rows, reminders.rows);
        report.skipped.extend(duplicates);

        for skipped in &report.skipped {
            warn!("skipping invalid row: {}", skipped);
        }

        state.next_id = next_id_after(&events);
        state.events = events;
        report.loaded = state.events.len();

        info!(
            events = report.loaded,
            skipped = report.skipped.len(),
            "loaded event tables"
        );
        Ok(report)
    }

    /// Write all tables from the current in-memory set
    pub fn save(&self) -> CaltableResult<()> {
        let state = self.read_state()?;
        self.write_tables(&state.events)
    }

    /// Core, recurrence, metadata, then reminder table, each replaced in turn
    fn write_tables(&self, events: &[Event]) -> CaltableResult<()> {
        let core: Vec<CoreRow> = events.iter().map(CoreRow::from_event).collect();
        let recurrence: Vec<RecurrenceRow> =
            events.iter().filter_map(RecurrenceRow::from_event).collect();
        let metadata: Vec<MetadataRow> = events.iter().map(MetadataRow::from_event).collect();
        let reminders: Vec<ReminderRow> =
            events.iter().filter_map(ReminderRow::from_event).collect();

        write_text_atomic(self.paths.events_file(), &encode_table(&core))?;
        write_text_atomic(self.paths.recurrence_file(), &encode_table(&recurrence))?;
        write_text_atomic(self.paths.metadata_file(), &encode_table(&metadata))?;
        write_text_atomic(self.paths.reminders_file(), &encode_table(&reminders))?;

        debug!(events = events.len(), "saved event tables");
        Ok(())
    }

    /// Assign the next id to a new event, store and persist it
    pub fn add(&self, draft: EventDraft) -> CaltableResult<Event> {
        let mut state = self.write_state()?;

        let id = state.next_id.ok_or_else(ids_exhausted)?;
        let event = Event::from_draft(id, draft);
        let mut events = state.events.clone();
        events.push(event.clone());

        self.write_tables(&events)?;
        state.events = events;
        state.next_id = event.id.next();

        info!(id = %event.id, "added event");
        Ok(event)
    }

    /// Replace the event with the same id. Returns false if there is none.
    pub fn update(&self, event: Event) -> CaltableResult<bool> {
        let mut state = self.write_state()?;

        let Some(pos) = state.events.iter().position(|e| e.id == event.id) else {
            return Ok(false);
        };

        let mut events = state.events.clone();
        events[pos] = event;
        self.write_tables(&events)?;
        state.events = events;

        Ok(true)
    }

    /// Remove the event with this id. Returns false if there is none.
    pub fn delete(&self, id: EventId) -> CaltableResult<bool> {
        let mut state = self.write_state()?;

        if !state.events.iter().any(|e| e.id == id) {
            return Ok(false);
        }

        let events: Vec<Event> = state.events.iter().filter(|e| e.id != id).cloned().collect();
        self.write_tables(&events)?;
        state.events = events;

        info!(id = %id, "deleted event");
        Ok(true)
    }

    /// Look up an event by id
    pub fn find_by_id(&self, id: EventId) -> CaltableResult<Option<Event>> {
        let state = self.read_state()?;
        Ok(state.events.iter().find(|e| e.id == id).cloned())
    }

    /// Snapshot of every event, in insertion order
    pub fn events(&self) -> CaltableResult<Vec<Event>> {
        let state = self.read_state()?;
        Ok(state.events.clone())
    }

    /// Count events
    pub fn count(&self) -> CaltableResult<usize> {
        let state = self.read_state()?;
        Ok(state.events.len())
    }

    /// The id the next `add` will assign
    pub fn next_id(&self) -> CaltableResult<EventId> {
        let state = self.read_state()?;
        state.next_id.ok_or_else(ids_exhausted)
    }

    /// Replace the whole set, recompute the next id and persist
    pub fn replace_all(&self, events: Vec<Event>) -> CaltableResult<()> {
        let mut state = self.write_state()?;

        self.write_tables(&events)?;
        state.next_id = next_id_after(&events);
        state.events = events;

        Ok(())
    }

    /// Append foreign events, giving each one whose id is already taken a
    /// fresh id one past the running maximum. Ids that are free are kept.
    pub fn append_merge(&self, incoming: Vec<Event>) -> CaltableResult<MergeReport> {
        let mut state = self.write_state()?;

        let mut events = state.events.clone();
        let mut taken: HashSet<EventId> = events.iter().map(|e| e.id).collect();
        let mut running_max = events.iter().map(|e| e.id).max().unwrap_or(EventId::new(0));
        let mut report = MergeReport::default();

        for mut event in incoming {
            if taken.contains(&event.id) {
                running_max = running_max.next().ok_or_else(ids_exhausted)?;
                report.remapped.push((event.id, running_max));
                event.id = running_max;
            } else {
                running_max = running_max.max(event.id);
                report.kept.push(event.id);
            }
            taken.insert(event.id);
            events.push(event);
        }

        self.write_tables(&events)?;
        state.next_id = next_id_after(&events);
        state.events = events;

        info!(
            added = report.added(),
            remapped = report.remapped.len(),
            "merged events"
        );
        Ok(report)
    }

    /// Events starting on the given day
    pub fn on_date(&self, date: NaiveDate) -> CaltableResult<Vec<Event>> {
        self.in_date_range(date, date)
    }

    /// Events whose start date falls within `from..=to`
    pub fn in_date_range(&self, from: NaiveDate, to: NaiveDate) -> CaltableResult<Vec<Event>> {
        let state = self.read_state()?;
        Ok(state
            .events
            .iter()
            .filter(|e| {
                let day = e.start.date();
                day >= from && day <= to
            })
            .cloned()
            .collect())
    }

    /// Events with exactly this title
    pub fn by_title(&self, title: &str) -> CaltableResult<Vec<Event>> {
        let state = self.read_state()?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.title == title)
            .cloned()
            .collect())
    }
}

/// One past the largest id, or 1 for an empty set
fn next_id_after(events: &[Event]) -> Option<EventId> {
    match events.iter().map(|e| e.id).max() {
        Some(max) => max.next(),
        None => Some(EventId::new(1)),
    }
}

fn ids_exhausted() -> CaltableError {
    CaltableError::Storage("event ids exhausted".into())
}

fn read_aux<R: TableRecord>(path: &std::path::Path) -> TableRead<R> {
    match read_bytes(path) {
        Ok(Some(data)) => decode_table::<R>(&data),
        Ok(None) => TableRead::default(),
        Err(e) => {
            warn!(table = R::TABLE, "treating unreadable table as empty: {}", e);
            TableRead::default()
        }
    }
}

/// Join the tables by id into full events, in core-table order.
///
/// Core rows repeating an earlier id are returned as skipped lines. In the
/// other tables the first row for an id wins, and rows for ids missing from
/// the core table are ignored.
fn join_tables(
    core: Vec<CoreRow>,
    recurrence: Vec<RecurrenceRow>,
    metadata: Vec<MetadataRow>,
    reminders: Vec<ReminderRow>,
) -> (Vec<Event>, Vec<SkippedLine>) {
    let mut rules: HashMap<EventId, RecurrenceRule> = HashMap::new();
    for row in recurrence {
        rules.entry(row.id).or_insert(row.rule);
    }
    let mut meta: HashMap<EventId, MetadataRow> = HashMap::new();
    for row in metadata {
        meta.entry(row.id).or_insert(row);
    }
    let mut alarms: HashMap<EventId, Reminder> = HashMap::new();
    for row in reminders {
        alarms.entry(row.id).or_insert(row.reminder);
    }

    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(core.len());
    let mut duplicates = Vec::new();

    for row in core {
        if !seen.insert(row.id) {
            duplicates.push(SkippedLine {
                table: CoreRow::TABLE,
                line: 0,
                content: super::codec::encode(&row),
                reason: RecordError::DuplicateId(row.id.get()),
            });
            continue;
        }

        let (location, category, priority) = match meta.remove(&row.id) {
            Some(m) => (m.location, m.category, m.priority),
            None => (
                DEFAULT_LOCATION.to_string(),
                DEFAULT_CATEGORY.to_string(),
                DEFAULT_PRIORITY.to_string(),
            ),
        };

        events.push(Event {
            id: row.id,
            title: row.title,
            description: row.description,
            start: row.start,
            end: row.end,
            reminder: alarms.remove(&row.id),
            location,
            category,
            priority,
            recurrence: rules.remove(&row.id),
        });
    }

    for id in rules.keys().chain(meta.keys()).chain(alarms.keys()) {
        debug!(id = %id, "ignoring row for unknown event");
    }

    (events, duplicates)
}
