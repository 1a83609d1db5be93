//! Resource limit tests
//!
//! Verifies that oversized work is bounded: tiles are shrunk to fit the
//! memory budget, unsatisfiable budgets fail cleanly, pattern explosions are
//! skipped, and variant expansion refuses to blow up.

use fops::core::alphabet::expand_variants;
use fops::matching::dispatch::{TileDispatcher, TileJob};
use fops::matching::patterns::{binomial, search_patterns, PatternConfig};
use fops::matching::scoring::{ScoreArena, ScoreCell};
use fops::matching::selector::PartialResults;
use fops::parsing::records::OligoRecord;
use fops::utils::validation::{check_oligo_length, check_record_limit, MAX_OLIGO_LENGTH, MAX_RECORDS};
use fops::{
    build_oligo_set, CancellationToken, Collection, LengthMismatchPolicy, LengthRule, MatchError, MatchingConfig,
    MatchingEngine, OligoSet,
};

fn uniform_set(collection: Collection, n: usize, seq: &str) -> OligoSet {
    let records: Vec<OligoRecord> = (0..n)
        .map(|i| OligoRecord::untagged(format!("{collection}{i}"), seq))
        .collect();
    build_oligo_set(collection, &records, LengthRule::Exact(seq.len()), LengthMismatchPolicy::Abort).unwrap()
}

#[test]
fn test_tile_memory_never_exceeds_budget() {
    let queries = uniform_set(Collection::Query, 300, "ACGTACGTACGTACGTAC");
    let masters = uniform_set(Collection::Master, 500, "ACGTACGTACGTACGTAN");
    let budget = 64 * 64 * std::mem::size_of::<ScoreCell>();

    let config = MatchingConfig {
        tile_size: 4096,
        memory_budget_bytes: budget,
        max_tile_retries: 16,
        threads: 2,
        ..MatchingConfig::default()
    };
    let outcome = MatchingEngine::new(&queries, &masters, config).unwrap().run().unwrap();

    let tile = outcome.stats.tile_size;
    assert!(ScoreArena::required_bytes(tile.min(300), tile.min(500)) <= budget);
    assert_eq!(tile, 64);
    assert!(outcome.is_complete());
    assert!(outcome.results.iter().all(|r| (r.best_score() - 1.0).abs() < 1e-12));
}

#[test]
fn test_unsatisfiable_budget_fails_after_bounded_retries() {
    let queries = uniform_set(Collection::Query, 4, "ACGT");
    let masters = uniform_set(Collection::Master, 4, "ACGT");
    let config = MatchingConfig {
        tile_size: 1 << 20,
        memory_budget_bytes: 1,
        max_tile_retries: 5,
        ..MatchingConfig::default()
    };
    let err = MatchingEngine::new(&queries, &masters, config).unwrap().run().unwrap_err();
    match err {
        MatchError::TileBudgetExhausted { attempts, .. } => assert_eq!(attempts, 6),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cancellation_stops_before_scoring() {
    let queries = uniform_set(Collection::Query, 50, "ACGTACGT");
    let masters = uniform_set(Collection::Master, 50, "ACGTACGT");
    let token = CancellationToken::new();
    token.cancel();

    let outcome = MatchingEngine::new(&queries, &masters, MatchingConfig::default())
        .unwrap()
        .with_cancellation(token.clone())
        .run()
        .unwrap();
    assert!(token.is_cancelled());
    assert!(outcome.cancelled);
    assert_eq!(outcome.results.len(), 50);
}

/// Runs jobs in order and cancels the run once the first job has finished
struct CancelAfterFirstJob {
    token: CancellationToken,
}

impl TileDispatcher for CancelAfterFirstJob {
    fn name(&self) -> &'static str {
        "cancel-after-first"
    }

    fn dispatch(&self, jobs: usize, work: &TileJob<'_>) -> Vec<PartialResults> {
        (0..jobs)
            .map(|job| {
                let partial = work(job);
                self.token.cancel();
                partial
            })
            .collect()
    }
}

#[test]
fn test_cancellation_mid_run_keeps_completed_tiles() {
    let query_records: Vec<OligoRecord> = ["ACGTACGT", "TTGGCCAA", "ACGTTTTT", "GGGGACGT", "CATGCATG", "AAAACCCC"]
        .iter()
        .enumerate()
        .map(|(i, seq)| OligoRecord::untagged(format!("q{i}"), *seq))
        .collect();
    let master_records: Vec<OligoRecord> = ["ACGTACGN", "TTGGCCTT", "GGGGACGA", "CATGCNTG"]
        .iter()
        .enumerate()
        .map(|(i, seq)| OligoRecord::untagged(format!("m{i}"), *seq))
        .collect();
    let queries =
        build_oligo_set(Collection::Query, &query_records, LengthRule::Exact(8), LengthMismatchPolicy::Abort).unwrap();
    let masters =
        build_oligo_set(Collection::Master, &master_records, LengthRule::Exact(8), LengthMismatchPolicy::Abort).unwrap();
    let config = MatchingConfig {
        tile_size: 2,
        threads: 1,
        ..MatchingConfig::default()
    };

    let complete = MatchingEngine::new(&queries, &masters, config.clone()).unwrap().run().unwrap();
    assert!(complete.is_complete());

    let token = CancellationToken::new();
    let partial = MatchingEngine::new(&queries, &masters, config)
        .unwrap()
        .with_dispatcher(Box::new(CancelAfterFirstJob { token: token.clone() }))
        .with_cancellation(token)
        .run()
        .unwrap();

    // 3 query tiles x 2 master tiles; only the first query tile ran
    assert!(partial.cancelled);
    assert_eq!(partial.stats.total_tile_pairs, 6);
    assert_eq!(partial.stats.completed_tile_pairs, 2);

    assert_eq!(partial.results.len(), 6);
    assert_eq!(partial.results[..2], complete.results[..2]);
    assert!(partial.results[..2].iter().all(|r| !r.hits.is_empty()));
    assert!(partial.results[2..].iter().all(|r| r.hits.is_empty()));
}

#[test]
fn test_pattern_explosion_is_skipped() {
    let queries = uniform_set(Collection::Query, 1, &"ACGT".repeat(25));
    let masters = uniform_set(Collection::Master, 1, &"ACGT".repeat(25));
    let config = PatternConfig {
        ambiguities: 6,
        max_combinations: 1_000,
        ..PatternConfig::default()
    };
    assert!(binomial(98, 6) > 1_000);
    assert!(search_patterns(&queries, &masters, &config).unwrap().is_empty());
}

#[test]
fn test_variant_expansion_is_capped() {
    let symbols = fops::Oligo::parse(
        "n",
        &"N".repeat(40),
        fops::SourceCoord::new("n", 0, fops::Strand::Forward),
        Collection::Query,
    )
    .unwrap();
    assert!(expand_variants(symbols.symbols(), 1 << 20).is_none());
}

#[test]
fn test_input_limits() {
    assert!(check_record_limit(MAX_RECORDS).is_some());
    assert!(check_oligo_length(MAX_OLIGO_LENGTH + 1).is_some());
}
