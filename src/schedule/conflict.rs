//! Time conflict detection
//!
//! Two events conflict when their half-open intervals `[start, end)` overlap.
//! An event that ends exactly when another starts does not conflict with it.
//! Events sharing an id never conflict with each other, so an event being
//! edited is not reported against its own stored copy.

use super::recurrence::occurrences;
use crate::models::Event;

/// Whether two events' intervals overlap
pub fn overlaps(a: &Event, b: &Event) -> bool {
    a.start < b.end && a.end > b.start
}

/// Whether `candidate` overlaps any event in `existing` other than itself
pub fn has_conflict(candidate: &Event, existing: &[Event]) -> bool {
    existing
        .iter()
        .any(|other| other.id != candidate.id && overlaps(candidate, other))
}

/// Every event in `existing` that `candidate` overlaps, in input order
pub fn find_conflicts<'a>(candidate: &Event, existing: &'a [Event]) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|other| other.id != candidate.id && overlaps(candidate, other))
        .collect()
}

/// Conflicts between any occurrence of `candidate` and any occurrence of the
/// events in `existing`.
///
/// Returns `(candidate occurrence, clashing occurrence)` pairs. Occurrences
/// are generated lazily; starts never decrease within a series, so the scan
/// of another series stops at its first occurrence starting after the
/// candidate occurrence ends.
pub fn find_occurrence_conflicts(candidate: &Event, existing: &[Event]) -> Vec<(Event, Event)> {
    let mut clashes = Vec::new();

    for other in existing.iter().filter(|e| e.id != candidate.id) {
        for mine in occurrences(candidate) {
            let a = mine.event;
            for theirs in occurrences(other) {
                if theirs.event.start >= a.end {
                    break;
                }
                if overlaps(&a, &theirs.event) {
                    clashes.push((a.clone(), theirs.event));
                }
            }
        }
    }

    clashes
}
