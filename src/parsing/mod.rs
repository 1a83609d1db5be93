//! Readers for the sequence collections consumed by the screen.
//!
//! - **FASTA files**: plain or gzip/bgzip compressed, read with noodles
//! - **Oligo records**: FASTA records with optional `source=`/`start=`/`strand=`
//!   coordinate tags written by the oligo generator
//!
//! ## Example
//!
//! ```rust,no_run
//! use fops::parsing::fasta::read_records;
//! use std::path::Path;
//!
//! let records = read_records(Path::new("master_oligos.fasta")).unwrap();
//! for record in &records {
//!     println!("{} {} {}", record.id, record.source, record.sequence);
//! }
//! ```

use thiserror::Error;

pub mod fasta;
pub mod records;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many records: {0} exceeds maximum allowed")]
    TooManyRecords(usize),
}
