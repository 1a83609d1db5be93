//! Screen command - score query oligos against master oligos.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use crate::cli::output::{open_output, report_destination, write_row};
use crate::cli::OutputFormat;
use crate::config::ScreenConfig;
use crate::core::oligo::Collection;
use crate::matching::engine::{MatchingEngine, ScreenOutcome};
use crate::matching::filter::{filter, ReportRow};
use crate::matching::selector::fraction_at_or_above;
use crate::parsing::fasta::{is_fasta_file, read_records};
use crate::store::{build_oligo_set, LengthMismatchPolicy, LengthRule, OligoSet};

/// Columns of delimited screen reports
pub const REPORT_COLUMNS: [&str; 13] = [
    "query_id",
    "master_id",
    "query_source",
    "query_start",
    "master_source",
    "master_start",
    "strand",
    "score",
    "percent_hit",
    "matches",
    "length",
    "offset",
    "confidence",
];

#[derive(Args)]
pub struct ScreenArgs {
    /// Query oligos (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub query: PathBuf,

    /// Master oligos (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub master: PathBuf,

    /// JSON run configuration; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Query oligo length
    #[arg(short = 'l', long)]
    pub oligo_length: Option<usize>,

    /// Oligos per tile side
    #[arg(long)]
    pub tile_size: Option<usize>,

    /// Score buffer budget per tile, in bytes
    #[arg(long)]
    pub memory_budget: Option<usize>,

    /// Best masters kept per query
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Minimum score to report (0-1)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Allow masters longer than the queries and search every offset
    #[arg(long)]
    pub offset_search: bool,

    /// Skip records with the wrong length instead of aborting
    #[arg(long)]
    pub skip_length_mismatch: bool,

    /// Worker threads (0 = all cores, 1 = serial)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the report to a timestamped file in this directory
    #[arg(long, conflicts_with = "output")]
    pub report_dir: Option<PathBuf>,
}

impl ScreenArgs {
    /// Resolve the run configuration: defaults, then the config file, then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the merged
    /// configuration is invalid.
    pub fn resolve_config(&self) -> anyhow::Result<ScreenConfig> {
        let mut config = match &self.config {
            Some(path) => ScreenConfig::load_from_file(path)?,
            None => ScreenConfig::default(),
        };

        if let Some(v) = self.oligo_length {
            config.oligo_length = v;
        }
        if let Some(v) = self.tile_size {
            config.tile_size = v;
        }
        if let Some(v) = self.memory_budget {
            config.memory_budget_bytes = v;
        }
        if let Some(v) = self.top_k {
            config.top_k = v;
        }
        if let Some(v) = self.threshold {
            config.score_threshold = v;
        }
        if let Some(v) = self.threads {
            config.threads = v;
        }
        if self.offset_search {
            config.offset_search = true;
        }
        if self.skip_length_mismatch {
            config.length_mismatch = LengthMismatchPolicy::Skip;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute the screen command
///
/// # Errors
///
/// Returns an error if inputs cannot be read or parsed, the configuration is
/// invalid, or matching fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ScreenArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.resolve_config()?;

    let queries = load_collection(&args.query, Collection::Query, &config)?;
    let masters = load_collection(&args.master, Collection::Master, &config)?;
    if verbose {
        eprintln!(
            "Loaded {} queries and {} masters (oligo length {})",
            queries.len(),
            masters.len(),
            config.oligo_length
        );
    }

    let engine = MatchingEngine::new(&queries, &masters, config.matching_config())?;
    let outcome = engine.run()?;
    let rows = filter(&outcome.results, config.score_threshold, &queries, &masters);

    info!(
        "{} of {} queries have a hit at or above {:.2}",
        rows.iter()
            .map(|r| r.query_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len(),
        queries.len(),
        config.score_threshold
    );

    let destination = report_destination(args.output.as_deref(), args.report_dir.as_deref(), format);
    let mut out = open_output(destination.as_deref())?;
    match format {
        OutputFormat::Text => write_text_report(&mut out, &rows, &outcome, &config)?,
        OutputFormat::Json => write_json_report(&mut out, &rows, &outcome, &config)?,
        OutputFormat::Tsv | OutputFormat::Csv => {
            let delimiter = format.delimiter().unwrap_or('\t');
            write_delimited_report(&mut out, &rows, delimiter)?;
        }
    }
    out.flush()?;

    if let Some(path) = destination {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

/// Read one collection and build its oligo set under the run's length rule.
fn load_collection(path: &Path, collection: Collection, config: &ScreenConfig) -> anyhow::Result<OligoSet> {
    if !is_fasta_file(path) {
        warn!("{} does not have a FASTA extension; reading it as FASTA", path.display());
    }
    let records = read_records(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {collection} file {}: {e}", path.display()))?;
    let rule = match collection {
        Collection::Master if config.offset_search => LengthRule::UniformAtLeast(config.oligo_length),
        _ => LengthRule::Exact(config.oligo_length),
    };
    Ok(build_oligo_set(collection, &records, rule, config.length_mismatch)?)
}

fn write_text_report(
    out: &mut dyn Write,
    rows: &[ReportRow],
    outcome: &ScreenOutcome,
    config: &ScreenConfig,
) -> anyhow::Result<()> {
    let stats = &outcome.stats;
    writeln!(
        out,
        "Screened {} queries: {} tile pairs of {} (tile size {}, {} retries)",
        outcome.results.len(),
        stats.completed_tile_pairs,
        stats.total_tile_pairs,
        stats.tile_size,
        stats.tile_retries
    )?;
    writeln!(
        out,
        "Queries with a best hit at or above {:.2}: {:.1}%",
        config.score_threshold,
        fraction_at_or_above(&outcome.results, config.score_threshold) * 100.0
    )?;
    if outcome.cancelled {
        writeln!(out, "Run was cancelled; results are partial")?;
    }
    writeln!(out)?;

    if rows.is_empty() {
        writeln!(out, "No hits at or above the threshold.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<24} {:<24} {:>8} {:>9} {:>6}  {:<24} {:<8}",
        "Query", "Master", "Score", "% Hit", "Offset", "Master source", "Conf."
    )?;
    writeln!(out, "{}", "-".repeat(112))?;
    for row in rows {
        writeln!(
            out,
            "{:<24} {:<24} {:>8.4} {:>9.2} {:>6}  {:<24} {:<8}",
            row.query_id,
            row.master_id,
            row.score,
            row.percent_hit,
            row.offset,
            row.master_source.to_string(),
            row.confidence
        )?;
    }
    Ok(())
}

fn write_json_report(
    out: &mut dyn Write,
    rows: &[ReportRow],
    outcome: &ScreenOutcome,
    config: &ScreenConfig,
) -> anyhow::Result<()> {
    let report = serde_json::json!({
        "config": config,
        "stats": outcome.stats,
        "cancelled": outcome.cancelled,
        "queries": outcome.results.len(),
        "hits": rows,
    });
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// Write rows as TSV or CSV with a header line.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_delimited_report(out: &mut dyn Write, rows: &[ReportRow], delimiter: char) -> std::io::Result<()> {
    let header: Vec<String> = REPORT_COLUMNS.iter().map(ToString::to_string).collect();
    write_row(out, &header, delimiter)?;
    for row in rows {
        let fields = vec![
            row.query_id.clone(),
            row.master_id.clone(),
            row.query_source.sequence_id.clone(),
            row.query_source.start.to_string(),
            row.master_source.sequence_id.clone(),
            row.master_source.start.to_string(),
            row.strand.to_string(),
            format!("{:.4}", row.score),
            format!("{:.2}", row.percent_hit),
            row.matches.to_string(),
            row.length.to_string(),
            row.offset.to_string(),
            row.confidence.to_string(),
        ];
        write_row(out, &fields, delimiter)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oligo::{SourceCoord, Strand};
    use crate::core::types::Confidence;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ScreenArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let harness = Harness::parse_from([
            "fops", "q.fa", "m.fa", "--oligo-length", "20", "--threshold", "0.8", "--skip-length-mismatch",
        ]);
        let config = harness.args.resolve_config().unwrap();
        assert_eq!(config.oligo_length, 20);
        assert!((config.score_threshold - 0.8).abs() < 1e-12);
        assert_eq!(config.length_mismatch, LengthMismatchPolicy::Skip);
        assert_eq!(config.top_k, 1);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let harness = Harness::parse_from(["fops", "q.fa", "m.fa", "--threshold", "2.0"]);
        assert!(harness.args.resolve_config().is_err());
    }

    #[test]
    fn test_delimited_report() {
        let row = ReportRow {
            query_id: "q1".to_string(),
            master_id: "chr1_004".to_string(),
            query_source: SourceCoord::new("ref", 0, Strand::Forward),
            master_source: SourceCoord::new("chr1", 3, Strand::Reverse),
            score: 0.75,
            percent_hit: 75.0,
            matches: 3,
            length: 4,
            offset: 0,
            strand: Strand::Reverse,
            confidence: Confidence::Low,
        };
        let mut out = Vec::new();
        write_delimited_report(&mut out, &[row], ',').unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], REPORT_COLUMNS.join(","));
        assert_eq!(lines[1], "q1,chr1_004,ref,0,chr1,3,-,0.7500,75.00,3,4,0,LOW");
    }
}
