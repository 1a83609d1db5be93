//! Command-line interface for fops.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **screen**: Score query oligos against master oligos and report the best hits
//! - **generate**: Cut source sequences into sliding-window oligos
//! - **score**: Score two oligo strings against each other
//! - **patterns**: Search degenerate primer patterns for each query
//! - **expand**: List the concrete sequences a degenerate oligo stands for
//! - **verify**: Count the sequences containing any variant of a degenerate oligo
//!
//! ## Usage
//!
//! ```text
//! # Build masters from a genome collection and a query set from its longest sequence
//! fops generate genomes.fa --output masters.fa
//! fops generate genomes.fa --longest --dedup --output queries.fa
//!
//! # Screen with a 0.95 threshold, CSV output
//! fops --format csv screen queries.fa masters.fa --threshold 0.95
//!
//! # Degenerate pattern search
//! fops patterns queries.fa masters.fa --flank 1 --ambiguities 3 --top-n 5
//!
//! # How many genomes carry a variant of a degenerate primer
//! fops --format tsv verify ATNNNTCGGA genomes.fa --name P1
//! ```

use clap::{Parser, Subcommand};

pub mod expand;
pub mod generate;
pub mod output;
pub mod patterns;
pub mod score;
pub mod screen;
pub mod verify;

#[derive(Parser)]
#[command(name = "fops")]
#[command(version)]
#[command(about = "Screen nucleotide collections for degenerate oligo primers")]
#[command(
    long_about = "fops finds short degenerate oligonucleotides (\"fuzzy primers\") that recur across a reference collection with high fidelity.\n\nIt scores every query oligo against every master oligo under IUPAC ambiguity-aware identity and reports:\n- The best-matching masters per query above a score threshold\n- Degenerate patterns that maximize master support"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score query oligos against master oligos
    Screen(screen::ScreenArgs),

    /// Generate sliding-window oligos from FASTA sequences
    Generate(generate::GenerateArgs),

    /// Score two oligos against each other
    Score(score::ScoreArgs),

    /// Search degenerate primer patterns
    Patterns(patterns::PatternsArgs),

    /// Expand a degenerate oligo into concrete sequences
    Expand(expand::ExpandArgs),

    /// Count sequences containing any variant of a degenerate oligo
    Verify(verify::VerifyArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
    Csv,
}

impl OutputFormat {
    /// Field separator for delimited formats
    #[must_use]
    pub fn delimiter(self) -> Option<char> {
        match self {
            Self::Tsv => Some('\t'),
            Self::Csv => Some(','),
            Self::Text | Self::Json => None,
        }
    }

    /// File extension for timestamped report files
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Tsv => "tsv",
            Self::Csv => "csv",
        }
    }
}
