//! Union hit counts for degenerate oligos.
//!
//! A record is a hit when at least one concrete variant of the oligo occurs in
//! its sequence. Record positions must be concrete bases: an ambiguity code in
//! the record never matches, as with a literal search for each variant.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::core::alphabet::Symbol;
use crate::parsing::records::OligoRecord;

/// Hit count of one oligo over a record collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResult {
    pub name: String,
    pub oligo: String,
    /// Concrete sequences the oligo stands for, saturating at `u64::MAX`
    pub variants: u64,
    /// Records containing at least one variant
    pub hits: usize,
    pub total: usize,
}

/// Number of concrete sequences a degenerate oligo stands for.
#[must_use]
pub fn variant_count(oligo: &[Symbol]) -> u64 {
    oligo
        .iter()
        .fold(1u64, |acc, s| acc.saturating_mul(u64::from(s.degeneracy())))
}

/// True iff some window of `sequence` is a concrete variant of `oligo`.
#[must_use]
pub fn contains_variant(oligo: &[Symbol], sequence: &[u8]) -> bool {
    if oligo.is_empty() || sequence.len() < oligo.len() {
        return false;
    }
    // 0 marks bytes that are not a concrete base
    let masks: Vec<u8> = sequence
        .iter()
        .map(|&b| match Symbol::from_byte(b) {
            Some(s) if !s.is_degenerate() => s.mask(),
            _ => 0,
        })
        .collect();

    masks.windows(oligo.len()).any(|window| {
        window
            .iter()
            .zip(oligo)
            .all(|(&base, symbol)| base & symbol.mask() != 0)
    })
}

/// Count the records that contain any concrete variant of `oligo`.
#[must_use]
pub fn verify_oligo(name: &str, oligo: &[Symbol], records: &[OligoRecord]) -> VerifyResult {
    let hits = records
        .par_iter()
        .filter(|r| contains_variant(oligo, r.sequence.as_bytes()))
        .count();
    let oligo_text: String = oligo.iter().map(|s| s.to_char()).collect();
    debug!("{name} ({oligo_text}): {hits}/{} records", records.len());

    VerifyResult {
        name: name.to_string(),
        oligo: oligo_text,
        variants: variant_count(oligo),
        hits,
        total: records.len(),
    }
}
