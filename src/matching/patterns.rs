//! Degenerate primer pattern search.
//!
//! For each query, every combination of `ambiguities` interior positions
//! (at least `flank` symbols away from either end) is replaced with `N`, and
//! the resulting pattern is counted against the master collection. A master
//! supports a pattern when every position is compatible. The most widely
//! supported patterns per query are reported.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::alphabet::Symbol;
use crate::core::oligo::{Collection, OligoError};
use crate::matching::filter::percent_hit;
use crate::matching::scoring::count_compatible;
use crate::matching::MatchError;
use crate::store::packed::pack;
use crate::store::OligoSet;
use crate::utils::validation::count_to_f64;

/// Upper bound on patterns generated for a single query
pub const DEFAULT_MAX_COMBINATIONS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternConfig {
    /// Symbols kept fixed at each end of the query
    pub flank: usize,
    /// Positions replaced with `N` per pattern
    pub ambiguities: usize,
    /// Patterns reported per query
    pub top_n: usize,
    /// Queries that would generate more patterns are skipped
    pub max_combinations: u64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            flank: 1,
            ambiguities: 3,
            top_n: 5,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

/// One degenerate pattern and its support in the master collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternHit {
    pub query_id: String,
    /// Query sequence with the ambiguous positions set to `N`
    pub pattern: String,
    /// 1-based ambiguous positions, ascending
    pub positions: Vec<usize>,
    /// Masters fully compatible with the pattern
    pub master_count: usize,
    /// Distinct source sequences among those masters
    pub source_count: usize,
}

impl PatternHit {
    /// Positions joined with `-`, e.g. `2-5-9`
    #[must_use]
    pub fn positions_label(&self) -> String {
        self.positions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Percentage of `total_masters` supporting a pattern, rounded half up to
/// two decimals.
#[must_use]
pub fn support_percent(hit: &PatternHit, total_masters: usize) -> f64 {
    if total_masters == 0 {
        return 0.0;
    }
    percent_hit(count_to_f64(hit.master_count) / count_to_f64(total_masters))
}

/// Keep patterns supported by at least `min_percent` of the masters.
///
/// With `distinct_percent`, only the first pattern of each query at a given
/// rounded percentage is kept. Input order is preserved.
#[must_use]
pub fn cull_by_percent(
    hits: Vec<PatternHit>,
    total_masters: usize,
    min_percent: f64,
    distinct_percent: bool,
) -> Vec<PatternHit> {
    let mut seen: HashSet<(String, u64)> = HashSet::new();
    hits.into_iter()
        .filter(|hit| {
            let percent = support_percent(hit, total_masters);
            if percent < min_percent {
                return false;
            }
            !distinct_percent || seen.insert((hit.query_id.clone(), percent.to_bits()))
        })
        .collect()
}

/// Lexicographic k-combinations of `start..end`.
#[derive(Debug, Clone)]
pub struct Combinations {
    end: usize,
    current: Vec<usize>,
    done: bool,
}

impl Combinations {
    #[must_use]
    pub fn new(start: usize, end: usize, k: usize) -> Self {
        Self {
            end,
            current: (start..start + k).collect(),
            done: start + k > end,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();

        let k = self.current.len();
        // Rightmost position that can still advance
        let pivot = (0..k).rev().find(|&i| self.current[i] < self.end - k + i);
        match pivot {
            Some(i) => {
                self.current[i] += 1;
                for j in i + 1..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(item)
    }
}

/// `n choose k`, saturating at `u64::MAX`.
#[must_use]
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    u64::try_from(acc).unwrap_or(u64::MAX)
}

/// The `top_n` best patterns seen so far, best first: higher master count,
/// then earlier arrival. Combinations arrive in lexicographic order, so
/// arrival order breaks ties by position set.
#[derive(Debug)]
struct BestPatterns {
    top_n: usize,
    entries: Vec<(Vec<usize>, usize, usize)>,
}

impl BestPatterns {
    fn new(top_n: usize) -> Self {
        Self {
            top_n,
            entries: Vec::with_capacity(top_n + 1),
        }
    }

    /// Slot a pattern with this count would take; equal counts go after
    /// existing entries.
    fn slot(&self, master_count: usize) -> usize {
        self.entries.partition_point(|e| e.1 >= master_count)
    }

    fn admits(&self, master_count: usize) -> bool {
        self.slot(master_count) < self.top_n
    }

    fn insert(&mut self, positions: Vec<usize>, master_count: usize, source_count: usize) {
        let slot = self.slot(master_count);
        if slot < self.top_n {
            self.entries.insert(slot, (positions, master_count, source_count));
            self.entries.truncate(self.top_n);
        }
    }
}

/// Search degenerate patterns for every query.
///
/// Results are grouped by query in query order, best pattern first: more
/// supporting masters first, then the lexicographically smaller position set.
///
/// # Errors
///
/// Returns `MatchError::InvalidConfig` if `top_n` or `ambiguities` is zero,
/// and `MatchError::Oligo` with a `LengthMismatch` if the master length
/// differs from the query length.
pub fn search_patterns(
    queries: &OligoSet,
    masters: &OligoSet,
    config: &PatternConfig,
) -> Result<Vec<PatternHit>, MatchError> {
    if config.top_n == 0 {
        return Err(MatchError::InvalidConfig("top_n must be positive".to_string()));
    }
    if config.ambiguities == 0 {
        return Err(MatchError::InvalidConfig("ambiguities must be positive".to_string()));
    }
    if let Some(first_master) = masters.get(0) {
        if !queries.is_empty() && masters.oligo_length() != queries.oligo_length() {
            return Err(OligoError::LengthMismatch {
                record: first_master.id.clone(),
                collection: Collection::Master,
                expected: queries.oligo_length(),
                found: masters.oligo_length(),
            }
            .into());
        }
    }
    if masters.is_empty() {
        warn!("The master collection is empty; every pattern has zero support");
    }

    info!(
        "Searching patterns for {} queries against {} masters (flank {}, {} ambiguities)",
        queries.len(),
        masters.len(),
        config.flank,
        config.ambiguities
    );

    let per_query: Vec<Vec<PatternHit>> = (0..queries.len())
        .into_par_iter()
        .map(|index| search_query(queries, index, masters, config))
        .collect();
    Ok(per_query.into_iter().flatten().collect())
}

fn search_query(
    queries: &OligoSet,
    index: usize,
    masters: &OligoSet,
    config: &PatternConfig,
) -> Vec<PatternHit> {
    let Some(query) = queries.get(index) else {
        return Vec::new();
    };
    let length = query.len();
    let interior_end = length.saturating_sub(config.flank);
    let interior = interior_end.saturating_sub(config.flank);
    if interior < config.ambiguities {
        warn!(
            "Query '{}' (length {length}) is too short for {} ambiguities with flank {}; skipping",
            query.id, config.ambiguities, config.flank
        );
        return Vec::new();
    }
    let combinations = binomial(interior, config.ambiguities);
    if combinations > config.max_combinations {
        warn!(
            "Query '{}' would generate {combinations} patterns (limit {}); skipping",
            query.id, config.max_combinations
        );
        return Vec::new();
    }
    debug!("Query '{}': {combinations} patterns", query.id);

    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_OLIGO_LENGTH
    let full = length as u32;
    let mut best = BestPatterns::new(config.top_n);
    let mut symbols = query.symbols().to_vec();
    for positions in Combinations::new(config.flank, interior_end, config.ambiguities) {
        for &p in &positions {
            symbols[p] = Symbol::N;
        }
        let packed = pack(&symbols);
        for &p in &positions {
            symbols[p] = query.symbols()[p];
        }

        let master_count = supporting_masters(&packed, masters, full).count();
        if best.admits(master_count) {
            let sources: HashSet<&str> = supporting_masters(&packed, masters, full)
                .filter_map(|m| masters.get(m))
                .map(|master| master.source.sequence_id.as_str())
                .collect();
            best.insert(positions, master_count, sources.len());
        }
    }

    best.entries
        .into_iter()
        .map(|(positions, master_count, source_count)| {
            let pattern = query
                .symbols()
                .iter()
                .enumerate()
                .map(|(i, s)| if positions.contains(&i) { 'N' } else { s.to_char() })
                .collect();
            PatternHit {
                query_id: query.id.clone(),
                pattern,
                positions: positions.iter().map(|p| p + 1).collect(),
                master_count,
                source_count,
            }
        })
        .collect()
}

/// Indices of masters fully compatible with a packed pattern
fn supporting_masters<'a>(packed: &'a [u64], masters: &'a OligoSet, full: u32) -> impl Iterator<Item = usize> + 'a {
    (0..masters.len()).filter(move |&m| count_compatible(packed, masters.packed(m), 0) == full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oligo::{Oligo, SourceCoord, Strand};

    fn set(collection: Collection, seqs: &[(&str, &str)]) -> OligoSet {
        let oligos = seqs
            .iter()
            .enumerate()
            .map(|(i, (source, s))| {
                Oligo::parse(
                    format!("{collection}{i}"),
                    s,
                    SourceCoord::new(*source, i as u64, Strand::Forward),
                    collection,
                )
                .unwrap()
            })
            .collect();
        OligoSet::from_oligos(collection, oligos).unwrap()
    }

    #[test]
    fn test_combinations_are_lexicographic() {
        let all: Vec<Vec<usize>> = Combinations::new(1, 5, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![1, 2],
                vec![1, 3],
                vec![1, 4],
                vec![2, 3],
                vec![2, 4],
                vec![3, 4]
            ]
        );
        assert_eq!(Combinations::new(0, 2, 3).count(), 0);
        assert_eq!(Combinations::new(0, 16, 3).count() as u64, binomial(16, 3));
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(16, 3), 560);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(4, 0), 1);
        assert_eq!(binomial(200, 100), u64::MAX);
    }

    #[test]
    fn test_pattern_counts_supporting_masters() {
        let queries = set(Collection::Query, &[("q", "ACGTAC")]);
        let masters = set(
            Collection::Master,
            &[
                ("chr1", "ACGTAC"),
                ("chr1", "ATGTAC"),
                ("chr2", "ATCTAC"),
                ("chr3", "TTTTTT"),
            ],
        );
        let config = PatternConfig {
            flank: 1,
            ambiguities: 2,
            top_n: 2,
            ..PatternConfig::default()
        };
        let hits = search_patterns(&queries, &masters, &config).unwrap();
        assert_eq!(hits.len(), 2);

        // Positions 2 and 3 (1-based) cover both mismatching masters
        assert_eq!(hits[0].positions, vec![2, 3]);
        assert_eq!(hits[0].positions_label(), "2-3");
        assert_eq!(hits[0].pattern, "ANNTAC");
        assert_eq!(hits[0].master_count, 3);
        assert_eq!(hits[0].source_count, 2);

        // Next best: {2,4} and {2,5} both reach 2 masters; {2,4} comes first
        assert_eq!(hits[1].positions, vec![2, 4]);
        assert_eq!(hits[1].master_count, 2);
    }

    #[test]
    fn test_best_patterns_keeps_top_n_in_order() {
        let mut best = BestPatterns::new(3);
        for (i, count) in [2, 5, 2, 7, 5, 1, 7].into_iter().enumerate() {
            if best.admits(count) {
                best.insert(vec![i], count, 1);
            }
        }
        let kept: Vec<(usize, usize)> = best.entries.iter().map(|e| (e.0[0], e.1)).collect();
        assert_eq!(kept, vec![(3, 7), (6, 7), (1, 5)]);
        assert!(!best.admits(5));
        assert!(best.admits(6));
    }

    #[test]
    fn test_cull_by_percent() {
        let hit = |query: &str, master_count: usize| PatternHit {
            query_id: query.to_string(),
            pattern: "ANNT".to_string(),
            positions: vec![2, 3],
            master_count,
            source_count: 1,
        };
        let hits = vec![hit("q1", 9), hit("q1", 9), hit("q1", 7), hit("q2", 9)];
        assert!((support_percent(&hits[2], 9) - 77.78).abs() < 1e-9);

        let kept = cull_by_percent(hits.clone(), 9, 80.0, false);
        assert_eq!(kept.len(), 3);

        let kept = cull_by_percent(hits, 9, 0.0, true);
        let summary: Vec<(&str, usize)> = kept.iter().map(|h| (h.query_id.as_str(), h.master_count)).collect();
        assert_eq!(summary, vec![("q1", 9), ("q1", 7), ("q2", 9)]);
    }

    #[test]
    fn test_short_query_is_skipped() {
        let queries = set(Collection::Query, &[("q", "ACGT")]);
        let masters = set(Collection::Master, &[("chr1", "ACGT")]);
        let config = PatternConfig {
            flank: 1,
            ambiguities: 3,
            ..PatternConfig::default()
        };
        assert!(search_patterns(&queries, &masters, &config).unwrap().is_empty());
    }

    #[test]
    fn test_empty_masters_give_zero_support() {
        let queries = set(Collection::Query, &[("q", "ACGTACGT")]);
        let masters = OligoSet::empty(Collection::Master);
        let hits = search_patterns(&queries, &masters, &PatternConfig::default()).unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.iter().all(|h| h.master_count == 0 && h.source_count == 0));
        assert_eq!(hits[0].positions, vec![2, 3, 4]);
    }

    #[test]
    fn test_rejects_mismatched_lengths_and_zero_top_n() {
        let queries = set(Collection::Query, &[("q", "ACGTACGT")]);
        let masters = set(Collection::Master, &[("chr1", "ACGTAC")]);
        assert!(matches!(
            search_patterns(&queries, &masters, &PatternConfig::default()),
            Err(MatchError::Oligo(OligoError::LengthMismatch { .. }))
        ));

        let config = PatternConfig {
            top_n: 0,
            ..PatternConfig::default()
        };
        assert!(matches!(
            search_patterns(&queries, &queries, &config),
            Err(MatchError::InvalidConfig(_))
        ));
    }
}
