//! Consolidation of per-page records into one record per registration.

use indexmap::IndexMap;

use crate::record::{MergedRecord, PageRecord};

/// Merge page records by registration number.
///
/// Records without a registration are dropped. The first record of a
/// registration seeds its merged record; later records only fill fields that
/// are still empty. A final pass backfills a missing name from the first
/// record of the same registration that has one. Output order is the order
/// in which registrations first appear.
pub fn merge_records(records: &[PageRecord]) -> Vec<MergedRecord> {
    let mut merged: IndexMap<String, MergedRecord> = IndexMap::new();

    for record in records {
        let registration = record.registration.trim();
        if registration.is_empty() {
            continue;
        }
        match merged.get_mut(registration) {
            None => {
                merged.insert(registration.to_string(), MergedRecord::from(record));
            }
            Some(existing) => fill_missing(existing, record),
        }
    }

    for (registration, entry) in merged.iter_mut() {
        if !entry.name.is_empty() {
            continue;
        }
        if let Some(name) = records
            .iter()
            .filter(|r| r.registration.trim() == registration.as_str())
            .map(|r| r.name.as_str())
            .find(|name| !name.is_empty())
        {
            entry.name = name.to_string();
        }
    }

    merged.into_values().collect()
}

fn fill_missing(existing: &mut MergedRecord, record: &PageRecord) {
    if existing.name.is_empty() && !record.name.is_empty() {
        existing.name = record.name.clone();
    }
    if existing.total_marks.is_none() && record.total_marks.is_some() {
        existing.total_marks = record.total_marks;
    }
    if existing.sgpa.is_empty() && !record.sgpa.is_empty() {
        existing.sgpa = record.sgpa.clone();
    }
    if existing.grade.is_empty() && !record.grade.is_empty() {
        existing.grade = record.grade.clone();
    }
}
