//! Patterns command - degenerate primer pattern search.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::cli::output::{open_output, report_destination, write_row};
use crate::cli::OutputFormat;
use crate::core::oligo::Collection;
use crate::matching::patterns::{cull_by_percent, search_patterns, support_percent, PatternConfig, PatternHit};
use crate::parsing::fasta::read_records;
use crate::store::{build_oligo_set, LengthMismatchPolicy, LengthRule};

#[derive(Args)]
pub struct PatternsArgs {
    /// Query oligos (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub query: PathBuf,

    /// Master oligos of the same length (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub master: PathBuf,

    /// Symbols kept fixed at each end of a query
    #[arg(long, default_value = "1")]
    pub flank: usize,

    /// Positions replaced with N per pattern
    #[arg(short, long, default_value = "3")]
    pub ambiguities: usize,

    /// Patterns reported per query
    #[arg(short = 'n', long, default_value = "5")]
    pub top_n: usize,

    /// Only report patterns supported by at least this percentage of masters
    #[arg(long, default_value = "80")]
    pub min_percent: f64,

    /// Report every pattern instead of one per query for each distinct
    /// support percentage
    #[arg(long)]
    pub all_percents: bool,

    /// Skip records with the wrong length instead of aborting
    #[arg(long)]
    pub skip_length_mismatch: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the report to a timestamped file in this directory
    #[arg(long, conflicts_with = "output")]
    pub report_dir: Option<PathBuf>,
}

/// Execute the patterns command
///
/// # Errors
///
/// Returns an error if inputs cannot be read or the search parameters are
/// invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PatternsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let policy = if args.skip_length_mismatch {
        LengthMismatchPolicy::Skip
    } else {
        LengthMismatchPolicy::Abort
    };

    let query_records = read_records(&args.query)?;
    let queries = build_oligo_set(Collection::Query, &query_records, LengthRule::UniformAtLeast(1), policy)?;
    let master_records = read_records(&args.master)?;
    let master_rule = if queries.is_empty() {
        LengthRule::UniformAtLeast(1)
    } else {
        LengthRule::Exact(queries.oligo_length())
    };
    let masters = build_oligo_set(Collection::Master, &master_records, master_rule, policy)?;

    if verbose {
        eprintln!(
            "Loaded {} queries and {} masters (oligo length {})",
            queries.len(),
            masters.len(),
            queries.oligo_length()
        );
    }

    let config = PatternConfig {
        flank: args.flank,
        ambiguities: args.ambiguities,
        top_n: args.top_n,
        ..PatternConfig::default()
    };
    let hits = search_patterns(&queries, &masters, &config)?;
    let hits = cull_by_percent(hits, masters.len(), args.min_percent, !args.all_percents);

    let destination = report_destination(args.output.as_deref(), args.report_dir.as_deref(), format);
    let mut out = open_output(destination.as_deref())?;
    write_report(&mut out, &hits, masters.len(), format)?;
    out.flush()?;

    if let Some(path) = destination {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn write_report(
    out: &mut dyn Write,
    hits: &[PatternHit],
    total_masters: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = hits
                .iter()
                .map(|h| {
                    serde_json::json!({
                        "query_id": h.query_id,
                        "pattern": h.pattern,
                        "positions": h.positions_label(),
                        "master_count": h.master_count,
                        "source_count": h.source_count,
                        "percent_hit": support_percent(h, total_masters),
                    })
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let delimiter = format.delimiter().unwrap_or('\t');
            let header = ["query_id", "pattern", "positions", "master_count", "source_count", "percent_hit"];
            write_row(out, &header.map(String::from), delimiter)?;
            for h in hits {
                write_row(
                    out,
                    &[
                        h.query_id.clone(),
                        h.pattern.clone(),
                        h.positions_label(),
                        h.master_count.to_string(),
                        h.source_count.to_string(),
                        format!("{:.2}", support_percent(h, total_masters)),
                    ],
                    delimiter,
                )?;
            }
        }
        OutputFormat::Text => {
            if hits.is_empty() {
                writeln!(out, "No patterns found.")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:<24} {:<32} {:<14} {:>8} {:>8} {:>8}",
                "Query", "Pattern", "Positions", "Masters", "Sources", "% Hit"
            )?;
            writeln!(out, "{}", "-".repeat(99))?;
            for h in hits {
                writeln!(
                    out,
                    "{:<24} {:<32} {:<14} {:>8} {:>8} {:>8.2}",
                    h.query_id,
                    h.pattern,
                    h.positions_label(),
                    h.master_count,
                    h.source_count,
                    support_percent(h, total_masters)
                )?;
            }
        }
    }
    Ok(())
}
