//! # fops
//!
//! A library for screening nucleotide collections for degenerate oligonucleotide
//! primers ("fuzzy primers") that recur across a reference collection with high
//! fidelity.
//!
//! Given a set of query oligos and a much larger set of master oligos (windows
//! cut from many sequences), `fops` finds for every query the masters it matches
//! best under an IUPAC ambiguity-aware identity metric: a position counts when
//! the two symbols share at least one base.
//!
//! ## Features
//!
//! - **Packed scoring**: 4-bit base masks, 16 symbols per word, AND + popcount
//! - **Tiled streaming**: memory-bounded tiles with automatic shrink and retry
//! - **Parallel dispatch**: disjoint query tiles on a rayon pool
//! - **Offset search**: best window of masters longer than the queries
//! - **Pattern search**: degenerate variants of each query ranked by master support
//!
//! ## Example
//!
//! ```rust,no_run
//! use fops::{build_oligo_set, filter, Collection, LengthMismatchPolicy, LengthRule, MatchingEngine, ScreenConfig};
//! use fops::parsing::fasta::read_records;
//! use std::path::Path;
//!
//! let config = ScreenConfig::default();
//! let queries = build_oligo_set(
//!     Collection::Query,
//!     &read_records(Path::new("queries.fa")).unwrap(),
//!     LengthRule::Exact(config.oligo_length),
//!     LengthMismatchPolicy::Abort,
//! ).unwrap();
//! let masters = build_oligo_set(
//!     Collection::Master,
//!     &read_records(Path::new("masters.fa")).unwrap(),
//!     LengthRule::Exact(config.oligo_length),
//!     LengthMismatchPolicy::Abort,
//! ).unwrap();
//!
//! let engine = MatchingEngine::new(&queries, &masters, config.matching_config()).unwrap();
//! let outcome = engine.run().unwrap();
//!
//! for row in filter(&outcome.results, config.score_threshold, &queries, &masters) {
//!     println!("{} -> {}: {:.2}%", row.query_id, row.master_id, row.percent_hit);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Symbols, oligos and score classification
//! - [`store`]: Packed oligo collections
//! - [`matching`]: Matching engine, selection, filtering and pattern search
//! - [`parsing`]: FASTA input
//! - [`generate`]: Sliding-window oligo generation
//! - [`config`]: Run configuration
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod generate;
pub mod matching;
pub mod parsing;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::config::ScreenConfig;
pub use crate::core::alphabet::{compatible, Symbol};
pub use crate::core::oligo::{Collection, Oligo, OligoError, SourceCoord, Strand};
pub use crate::core::types::*;
pub use crate::matching::engine::{CancellationToken, MatchingConfig, MatchingEngine, ScreenOutcome};
pub use crate::matching::filter::{filter, ReportRow};
pub use crate::matching::selector::{MatchHit, MatchResult};
pub use crate::matching::MatchError;
pub use crate::store::{build_oligo_set, LengthMismatchPolicy, LengthRule, OligoSet};
