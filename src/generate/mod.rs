//! Oligo generation from source sequences.
//!
//! The stages that prepare query and master collections:
//!
//! - [`longest`]: pick the longest source sequence
//! - [`deduplicate`]: drop repeated sequences
//! - [`sliding_windows`]: cut sequences into fixed-length oligos
//! - [`write_fasta_file`]: write oligos with coordinate tags

pub mod select;
pub mod windows;
pub mod writer;

pub use select::{deduplicate, longest};
pub use windows::{sliding_windows, WindowConfig};
pub use writer::{write_fasta, write_fasta_file};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Invalid window: length {length} and step {step} must both be positive")]
    InvalidWindow { length: usize, step: usize },

    #[error("Invalid symbol {symbol:?} in sequence '{record}' at position {position}")]
    InvalidSymbol {
        record: String,
        /// 1-based
        position: usize,
        symbol: char,
    },
}
