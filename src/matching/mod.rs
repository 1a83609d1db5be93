//! Batched oligo matching.
//!
//! This module scores every query oligo against every master oligo and keeps
//! the best masters per query:
//!
//! - [`MatchingEngine`]: tiles both collections and streams the work
//! - [`scoring`]: packed compatibility counting over a reusable score buffer
//! - [`selector`]: per-query top-k accumulation and merging
//! - [`dispatch`]: serial and rayon backends for query-tile jobs
//! - [`filter`]: threshold filtering and report rows
//! - [`patterns`]: degenerate primer pattern search
//! - [`verify`]: union hit counts of degenerate oligos over raw sequences
//!
//! ## Scoring
//!
//! The score of a (query, master) pair is the fraction of positions whose
//! IUPAC symbols share at least one base. With offset search enabled, masters
//! may be longer than the queries and the best window wins.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fops::core::oligo::Collection;
//! use fops::matching::{MatchingConfig, MatchingEngine};
//! use fops::parsing::records::OligoRecord;
//! use fops::store::{build_oligo_set, LengthMismatchPolicy, LengthRule};
//!
//! let queries = build_oligo_set(
//!     Collection::Query,
//!     &[OligoRecord::untagged("q1", "ACGTRY")],
//!     LengthRule::Exact(6),
//!     LengthMismatchPolicy::Abort,
//! ).unwrap();
//! let masters = build_oligo_set(
//!     Collection::Master,
//!     &[OligoRecord::untagged("m1", "ACGTAC")],
//!     LengthRule::Exact(6),
//!     LengthMismatchPolicy::Abort,
//! ).unwrap();
//!
//! let engine = MatchingEngine::new(&queries, &masters, MatchingConfig::default()).unwrap();
//! let outcome = engine.run().unwrap();
//! println!("{:.2}", outcome.results[0].best_score());
//! ```

pub mod dispatch;
pub mod engine;
pub mod filter;
pub mod patterns;
pub mod scoring;
pub mod selector;
pub mod verify;

pub use engine::{CancellationToken, MatchingConfig, MatchingEngine, RunStats, ScreenOutcome};
pub use filter::{filter, ReportRow};
pub use selector::{MatchHit, MatchResult};

use thiserror::Error;

use crate::core::oligo::OligoError;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(
        "Tile of {query_tile}x{master_tile} oligos needs {required_bytes} bytes, budget is {budget_bytes}"
    )]
    TileTooLarge {
        query_tile: usize,
        master_tile: usize,
        required_bytes: usize,
        budget_bytes: usize,
    },

    #[error("No tile size fits the memory budget after {attempts} attempt(s); last tried {last_tile_size}")]
    TileBudgetExhausted { attempts: u32, last_tile_size: usize },

    #[error(transparent)]
    Oligo(#[from] OligoError),

    #[error("Invalid matching configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}
