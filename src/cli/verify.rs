//! Verify command - count the sequences hit by any variant of a degenerate oligo.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use crate::cli::output::{open_output, write_row};
use crate::cli::OutputFormat;
use crate::core::oligo::{Collection, Oligo, SourceCoord, Strand};
use crate::matching::verify::{verify_oligo, VerifyResult};
use crate::parsing::fasta::read_records;

#[derive(Args)]
pub struct VerifyArgs {
    /// Degenerate oligo, IUPAC symbols
    #[arg(required = true)]
    pub oligo: String,

    /// Sequences to search (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub fasta: PathBuf,

    /// Name written in the report
    #[arg(long, default_value = "oligo")]
    pub name: String,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the verify command
///
/// # Errors
///
/// Returns an error if the oligo is invalid or the FASTA file cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: VerifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let oligo = Oligo::parse(
        args.name.clone(),
        &args.oligo,
        SourceCoord::new(args.name.clone(), 0, Strand::Forward),
        Collection::Query,
    )?;
    let records = read_records(&args.fasta)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", args.fasta.display()))?;
    if records.is_empty() {
        warn!("No sequences found in {}", args.fasta.display());
    }

    let result = verify_oligo(&args.name, oligo.symbols(), &records);
    if verbose {
        eprintln!(
            "Searched {} variant(s) of {} in {} sequence(s)",
            result.variants, result.oligo, result.total
        );
    }

    let mut out = open_output(args.output.as_deref())?;
    write_result(&mut out, &result, format)?;
    out.flush()?;
    Ok(())
}

fn write_result(out: &mut dyn Write, result: &VerifyResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result)?;
            writeln!(out)?;
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let delimiter = format.delimiter().unwrap_or('\t');
            write_row(
                out,
                &[result.name.clone(), result.oligo.clone(), result.hits.to_string()],
                delimiter,
            )?;
        }
        OutputFormat::Text => {
            writeln!(out, "Oligo: {} ({} variants)", result.oligo, result.variants)?;
            writeln!(
                out,
                "Sequences with a hit: {} of {}",
                result.hits, result.total
            )?;
        }
    }
    Ok(())
}
