//! Per-query best-match accumulation.
//!
//! Hits are ranked by descending compatible-position count, then ascending
//! master index, then ascending offset. A [`TopK`] keeps at most one hit per
//! master, so merging the same partial results twice, or in any order, gives
//! the same final list.

use std::cmp::Ordering;

use serde::Serialize;

use crate::matching::scoring::ScoreCell;
use crate::utils::validation::count_to_f64;

/// One retained (master, score, offset) for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchHit {
    pub master_index: usize,
    /// Compatible positions
    pub matches: u32,
    /// Compared length (the query length)
    pub length: u32,
    /// Offset into the master window
    pub offset: u32,
}

impl MatchHit {
    #[must_use]
    pub fn from_cell(master_index: usize, cell: ScoreCell, length: u32) -> Self {
        Self {
            master_index,
            matches: cell.matches,
            length,
            offset: cell.offset,
        }
    }

    /// Fraction of compatible positions in `[0, 1]`
    #[must_use]
    pub fn score(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        f64::from(self.matches) / f64::from(self.length)
    }

    /// Total order used for selection: better hits compare as `Less`.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .matches
            .cmp(&self.matches)
            .then(self.master_index.cmp(&other.master_index))
            .then(self.offset.cmp(&other.offset))
    }
}

/// Bounded, ordered set of the best hits seen so far for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopK {
    k: usize,
    hits: Vec<MatchHit>,
}

impl TopK {
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            hits: Vec::with_capacity(k.min(64)),
        }
    }

    /// Offer a hit; keeps it if it ranks within the best `k`.
    pub fn offer(&mut self, hit: MatchHit) {
        if self.k == 0 {
            return;
        }
        // Fast reject: worse than the current worst of a full list
        if self.hits.len() == self.k {
            if let Some(worst) = self.hits.last() {
                if hit.rank_cmp(worst) != Ordering::Less {
                    return;
                }
            }
        }

        if let Some(pos) = self
            .hits
            .iter()
            .position(|h| h.master_index == hit.master_index)
        {
            if hit.rank_cmp(&self.hits[pos]) != Ordering::Less {
                return;
            }
            self.hits.remove(pos);
        }

        let at = self
            .hits
            .binary_search_by(|h| h.rank_cmp(&hit))
            .unwrap_or_else(|insert_at| insert_at);
        self.hits.insert(at, hit);
        self.hits.truncate(self.k);
    }

    /// Fold another accumulator for the same query into this one.
    pub fn merge(&mut self, other: &TopK) {
        for hit in &other.hits {
            self.offer(*hit);
        }
    }

    #[must_use]
    pub fn hits(&self) -> &[MatchHit] {
        &self.hits
    }

    #[must_use]
    pub fn into_hits(self) -> Vec<MatchHit> {
        self.hits
    }
}

/// Final best matches for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub query_index: usize,
    /// Best first
    pub hits: Vec<MatchHit>,
}

impl MatchResult {
    #[must_use]
    pub fn best(&self) -> Option<&MatchHit> {
        self.hits.first()
    }

    #[must_use]
    pub fn best_score(&self) -> f64 {
        self.best().map_or(0.0, MatchHit::score)
    }
}

/// Accumulators for a contiguous range of queries, produced by one worker.
#[derive(Debug, Clone)]
pub struct PartialResults {
    pub query_start: usize,
    pub tops: Vec<TopK>,
    /// Master tiles fully scored against this query range
    pub completed_master_tiles: usize,
    pub cancelled: bool,
}

/// Merge partial results for `num_queries` queries into final per-query lists.
///
/// Partials may overlap in query range and arrive in any order; the result is
/// the same for every permutation.
pub fn merge_partials<I>(num_queries: usize, k: usize, partials: I) -> Vec<MatchResult>
where
    I: IntoIterator<Item = PartialResults>,
{
    let mut tops: Vec<TopK> = (0..num_queries).map(|_| TopK::new(k)).collect();
    for partial in partials {
        for (i, top) in partial.tops.iter().enumerate() {
            if let Some(acc) = tops.get_mut(partial.query_start + i) {
                acc.merge(top);
            }
        }
    }

    tops.into_iter()
        .enumerate()
        .map(|(query_index, top)| MatchResult {
            query_index,
            hits: top.into_hits(),
        })
        .collect()
}

/// Share of scores at or above `threshold`, for summaries.
#[must_use]
pub fn fraction_at_or_above(results: &[MatchResult], threshold: f64) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let hits = results
        .iter()
        .filter(|r| r.best().is_some_and(|h| h.score() >= threshold))
        .count();
    count_to_f64(hits) / count_to_f64(results.len())
}
