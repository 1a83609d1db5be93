//! Generate command - cut FASTA sequences into sliding-window oligos.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use crate::cli::output::open_output;
use crate::generate::{deduplicate, longest, sliding_windows, write_fasta, write_fasta_file, WindowConfig};
use crate::parsing::fasta::read_records;

#[derive(Args)]
pub struct GenerateArgs {
    /// Source sequences (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Oligo length
    #[arg(short, long, default_value = "18")]
    pub length: usize,

    /// Bases between consecutive window starts
    #[arg(short, long, default_value = "1")]
    pub step: usize,

    /// Also emit reverse-complement windows
    #[arg(long)]
    pub both_strands: bool,

    /// Only use the longest input sequence
    #[arg(long)]
    pub longest: bool,

    /// Drop input sequences identical to an earlier one before windowing
    #[arg(long)]
    pub dedup: bool,

    /// Output FASTA (gzip-compressed if it ends in .gz); stdout by default
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the generate command. Output is always FASTA.
///
/// # Errors
///
/// Returns an error if the input cannot be read, contains invalid symbols, or
/// the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenerateArgs, verbose: bool) -> anyhow::Result<()> {
    let mut records = read_records(&args.input)?;
    if records.is_empty() {
        warn!("No sequences found in {}", args.input.display());
    }

    if args.dedup {
        records = deduplicate(records);
    }

    if args.longest {
        records = longest(&records).cloned().into_iter().collect();
        if verbose {
            if let Some(record) = records.first() {
                eprintln!("Longest sequence: {} ({} bp)", record.id, record.len());
            }
        }
    }

    let config = WindowConfig {
        length: args.length,
        step: args.step,
        both_strands: args.both_strands,
    };
    let windows = sliding_windows(&records, &config)?;

    if verbose {
        eprintln!(
            "Generated {} oligos of length {} from {} sequence(s)",
            windows.len(),
            args.length,
            records.len()
        );
    }

    match &args.output {
        Some(path) => write_fasta_file(path, &windows)?,
        None => {
            let mut out = open_output(None)?;
            write_fasta(&mut out, &windows)?;
            out.flush()?;
        }
    }
    Ok(())
}
