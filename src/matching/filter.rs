//! Threshold filtering of match results into report rows.

use serde::Serialize;

use crate::core::oligo::{SourceCoord, Strand};
use crate::core::types::Confidence;
use crate::matching::selector::{MatchHit, MatchResult};
use crate::store::OligoSet;

/// Default minimum score for a hit to be reported
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.90;

/// One reported (query, master) hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub query_id: String,
    pub master_id: String,
    pub query_source: SourceCoord,
    pub master_source: SourceCoord,
    pub score: f64,
    /// Score as a percentage, rounded half up to two decimals
    pub percent_hit: f64,
    pub matches: u32,
    pub length: u32,
    pub offset: u32,
    /// Strand of the master window
    pub strand: Strand,
    pub confidence: Confidence,
}

/// Score as a percentage rounded half up to two decimals.
///
/// ```
/// use fops::matching::filter::percent_hit;
///
/// assert!((percent_hit(17.0 / 18.0) - 94.44).abs() < 1e-9);
/// assert!((percent_hit(0.123_45) - 12.35).abs() < 1e-9);
/// ```
#[must_use]
pub fn percent_hit(score: f64) -> f64 {
    // Work in hundredths of a percent; the epsilon absorbs binary
    // representation error so x.xx5 rounds up.
    let scaled = score * 10_000.0;
    (scaled + 1e-6).round() / 100.0
}

/// Keep hits with `score >= threshold`, preserving per-query order.
///
/// Queries with no surviving hit are dropped.
#[must_use]
pub fn filter_results(results: &[MatchResult], threshold: f64) -> Vec<MatchResult> {
    results
        .iter()
        .filter_map(|result| {
            let hits: Vec<MatchHit> = result
                .hits
                .iter()
                .filter(|hit| hit.score() >= threshold)
                .copied()
                .collect();
            (!hits.is_empty()).then(|| MatchResult {
                query_index: result.query_index,
                hits,
            })
        })
        .collect()
}

/// Resolve hits against the oligo sets they index into.
///
/// Hits whose query or master index is out of range are skipped.
#[must_use]
pub fn to_report_rows(results: &[MatchResult], queries: &OligoSet, masters: &OligoSet) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for result in results {
        let Some(query) = queries.get(result.query_index) else {
            continue;
        };
        for hit in &result.hits {
            let Some(master) = masters.get(hit.master_index) else {
                continue;
            };
            let score = hit.score();
            rows.push(ReportRow {
                query_id: query.id.clone(),
                master_id: master.id.clone(),
                query_source: query.source.clone(),
                master_source: master.source.clone(),
                score,
                percent_hit: percent_hit(score),
                matches: hit.matches,
                length: hit.length,
                offset: hit.offset,
                strand: master.source.strand,
                confidence: Confidence::from_score(score),
            });
        }
    }
    rows
}

/// Threshold results and turn the survivors into report rows, in query order
/// and best-first within a query.
#[must_use]
pub fn filter(
    results: &[MatchResult],
    threshold: f64,
    queries: &OligoSet,
    masters: &OligoSet,
) -> Vec<ReportRow> {
    to_report_rows(&filter_results(results, threshold), queries, masters)
}
