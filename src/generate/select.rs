use std::collections::HashSet;

use tracing::info;

use crate::parsing::records::OligoRecord;

/// The longest record; the first one wins ties.
#[must_use]
pub fn longest(records: &[OligoRecord]) -> Option<&OligoRecord> {
    records.iter().fold(None, |best: Option<&OligoRecord>, record| match best {
        Some(b) if b.len() >= record.len() => Some(b),
        _ => Some(record),
    })
}

/// Drop records whose sequence repeats an earlier record's, keeping the first
/// occurrence. Returns the kept records in input order.
#[must_use]
pub fn deduplicate(records: Vec<OligoRecord>) -> Vec<OligoRecord> {
    let before = records.len();
    let mut seen = HashSet::new();
    let kept: Vec<OligoRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.sequence.clone()))
        .collect();
    if kept.len() < before {
        info!("Removed {} duplicate sequence(s)", before - kept.len());
    }
    kept
}
