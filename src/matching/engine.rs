use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::oligo::{Collection, OligoError};
use crate::matching::dispatch::{dispatcher_for, TileDispatcher};
use crate::matching::scoring::ScoreArena;
use crate::matching::selector::{merge_partials, MatchHit, MatchResult, PartialResults, TopK};
use crate::matching::MatchError;
use crate::store::OligoSet;

/// Default number of oligos per tile side
pub const DEFAULT_TILE_SIZE: usize = 1024;

/// Default score buffer budget per tile (256 MiB)
pub const DEFAULT_MEMORY_BUDGET_BYTES: usize = 256 * 1024 * 1024;

/// Default number of tile shrink attempts before giving up
pub const DEFAULT_MAX_TILE_RETRIES: u32 = 8;

/// Configuration for the matching engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Oligos per tile side (queries and masters)
    pub tile_size: usize,
    /// Upper bound on one tile's score buffer, in bytes
    pub memory_budget_bytes: usize,
    /// Hits kept per query
    pub top_k: usize,
    /// Search every offset of masters longer than the queries
    pub offset_search: bool,
    /// How many times to halve the tile size after `TileTooLarge`
    pub max_tile_retries: u32,
    /// Worker threads: 0 = all cores, 1 = serial
    pub threads: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            top_k: 1,
            offset_search: false,
            max_tile_retries: DEFAULT_MAX_TILE_RETRIES,
            threads: 0,
        }
    }
}

/// Shared flag for abandoning a run in flight.
///
/// Workers check it before each master tile; results merged up to that point
/// stay valid.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tile bookkeeping for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Tile size actually used after any shrinking
    pub tile_size: usize,
    /// Number of times the tile size was halved
    pub tile_retries: u32,
    pub query_tiles: usize,
    pub master_tiles: usize,
    /// (query tile, master tile) pairs scored
    pub completed_tile_pairs: usize,
    pub total_tile_pairs: usize,
    /// Offsets searched per (query, master) pair
    pub offsets: usize,
}

/// Output of one engine run
#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    /// One entry per query, in query order
    pub results: Vec<MatchResult>,
    pub stats: RunStats,
    /// True if the run was cancelled before every tile pair completed
    pub cancelled: bool,
}

impl ScreenOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.stats.completed_tile_pairs == self.stats.total_tile_pairs
    }
}

/// Tile shape for one attempt
#[derive(Debug, Clone, Copy)]
struct TilePlan {
    query_tile: usize,
    master_tile: usize,
}

impl TilePlan {
    fn query_ranges(self, total: usize) -> impl Iterator<Item = Range<usize>> {
        tile_ranges(total, self.query_tile)
    }
}

fn tile_ranges(total: usize, tile: usize) -> impl Iterator<Item = Range<usize>> {
    (0..total)
        .step_by(tile.max(1))
        .map(move |start| start..(start + tile).min(total))
}

/// The batched matching engine
pub struct MatchingEngine<'a> {
    queries: &'a OligoSet,
    masters: &'a OligoSet,
    config: MatchingConfig,
    dispatcher: Box<dyn TileDispatcher>,
    cancel: CancellationToken,
}

impl<'a> MatchingEngine<'a> {
    /// Create an engine over two oligo sets.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` for zero tile size or `top_k`,
    /// `MatchError::Oligo` with a `LengthMismatch` naming the first master if
    /// its length is incompatible with the queries, and `MatchError::ThreadPool`
    /// if the worker pool cannot be created.
    pub fn new(
        queries: &'a OligoSet,
        masters: &'a OligoSet,
        config: MatchingConfig,
    ) -> Result<Self, MatchError> {
        if config.tile_size == 0 {
            return Err(MatchError::InvalidConfig("tile_size must be positive".to_string()));
        }
        if config.top_k == 0 {
            return Err(MatchError::InvalidConfig("top_k must be positive".to_string()));
        }
        check_lengths(queries, masters, config.offset_search)?;

        let dispatcher = dispatcher_for(config.threads)?;
        Ok(Self {
            queries,
            masters,
            config,
            dispatcher,
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the worker backend
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Box<dyn TileDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Share a cancellation token with the caller
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Offsets searched per (query, master) pair
    #[must_use]
    pub fn offsets(&self) -> usize {
        if self.config.offset_search {
            self.masters
                .oligo_length()
                .saturating_sub(self.queries.oligo_length())
                + 1
        } else {
            1
        }
    }

    /// Score every query against every master and keep the best `top_k` hits
    /// per query.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::TileBudgetExhausted` if no tile size within the
    /// retry bound fits the memory budget.
    pub fn run(&self) -> Result<ScreenOutcome, MatchError> {
        let num_queries = self.queries.len();

        if self.queries.is_empty() || self.masters.is_empty() {
            let empty = if self.queries.is_empty() {
                Collection::Query
            } else {
                Collection::Master
            };
            warn!("The {empty} collection is empty; every query gets an empty result");
            return Ok(ScreenOutcome {
                results: merge_partials(num_queries, self.config.top_k, Vec::new()),
                stats: RunStats {
                    tile_size: self.config.tile_size,
                    offsets: self.offsets(),
                    ..RunStats::default()
                },
                cancelled: false,
            });
        }

        let mut tile_size = self.config.tile_size;
        let mut retries = 0;
        let plan = loop {
            let plan = TilePlan {
                query_tile: tile_size.min(num_queries),
                master_tile: tile_size.min(self.masters.len()),
            };
            match ScoreArena::check_budget(
                plan.query_tile,
                plan.master_tile,
                self.config.memory_budget_bytes,
            ) {
                Ok(bytes) => {
                    debug!(
                        "Tile {}x{} needs {bytes} bytes of score buffer",
                        plan.query_tile, plan.master_tile
                    );
                    break plan;
                }
                Err(err @ MatchError::TileTooLarge { .. }) => {
                    if retries >= self.config.max_tile_retries || tile_size == 1 {
                        return Err(MatchError::TileBudgetExhausted {
                            attempts: retries + 1,
                            last_tile_size: tile_size,
                        });
                    }
                    let smaller = (tile_size / 2).max(1);
                    warn!("{err}; retrying with tile size {smaller}");
                    tile_size = smaller;
                    retries += 1;
                }
                Err(other) => return Err(other),
            }
        };

        Ok(self.execute(plan, tile_size, retries))
    }

    fn execute(&self, plan: TilePlan, tile_size: usize, retries: u32) -> ScreenOutcome {
        let num_queries = self.queries.len();
        let num_masters = self.masters.len();
        let query_ranges: Vec<Range<usize>> = plan.query_ranges(num_queries).collect();
        let master_tiles = num_masters.div_ceil(plan.master_tile);
        let offsets = self.offsets();

        info!(
            "Scoring {num_queries} queries against {num_masters} masters: {} x {master_tiles} tiles of {}x{}, {offsets} offset(s), {} backend",
            query_ranges.len(),
            plan.query_tile,
            plan.master_tile,
            self.dispatcher.name()
        );

        let work = |job: usize| self.score_query_tile(query_ranges[job].clone(), plan, offsets);
        let partials = self.dispatcher.dispatch(query_ranges.len(), &work);

        let completed_tile_pairs = partials.iter().map(|p| p.completed_master_tiles).sum();
        let cancelled = partials.iter().any(|p| p.cancelled);
        let stats = RunStats {
            tile_size,
            tile_retries: retries,
            query_tiles: query_ranges.len(),
            master_tiles,
            completed_tile_pairs,
            total_tile_pairs: query_ranges.len() * master_tiles,
            offsets,
        };
        if cancelled {
            warn!(
                "Run cancelled after {}/{} tile pairs; results are partial",
                stats.completed_tile_pairs, stats.total_tile_pairs
            );
        }

        ScreenOutcome {
            results: merge_partials(num_queries, self.config.top_k, partials),
            stats,
            cancelled,
        }
    }

    /// Stream every master tile through one query tile, keeping per-query
    /// accumulators local to this worker.
    fn score_query_tile(&self, q_range: Range<usize>, plan: TilePlan, offsets: usize) -> PartialResults {
        #[allow(clippy::cast_possible_truncation)] // bounded by MAX_OLIGO_LENGTH
        let length = self.queries.oligo_length() as u32;
        let mut tops: Vec<TopK> = (0..q_range.len())
            .map(|_| TopK::new(self.config.top_k))
            .collect();
        let mut arena = ScoreArena::new(q_range.len(), plan.master_tile);
        let mut completed_master_tiles = 0;
        let mut cancelled = false;

        for m_range in tile_ranges(self.masters.len(), plan.master_tile) {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            arena.score_tile(self.queries, q_range.clone(), self.masters, m_range.clone(), offsets);
            for (row, top) in tops.iter_mut().enumerate() {
                for (cell, master_index) in arena.row(row).iter().zip(m_range.clone()) {
                    top.offer(MatchHit::from_cell(master_index, *cell, length));
                }
            }
            completed_master_tiles += 1;
        }

        PartialResults {
            query_start: q_range.start,
            tops,
            completed_master_tiles,
            cancelled,
        }
    }
}

fn check_lengths(queries: &OligoSet, masters: &OligoSet, offset_search: bool) -> Result<(), MatchError> {
    let Some(first_master) = masters.get(0) else {
        return Ok(());
    };
    if queries.is_empty() {
        return Ok(());
    }
    let query_len = queries.oligo_length();
    let master_len = masters.oligo_length();
    let compatible = if offset_search {
        master_len >= query_len
    } else {
        master_len == query_len
    };
    if compatible {
        return Ok(());
    }
    Err(OligoError::LengthMismatch {
        record: first_master.id.clone(),
        collection: Collection::Master,
        expected: query_len,
        found: master_len,
    }
    .into())
}
