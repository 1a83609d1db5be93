//! Score command - compare two oligo strings directly.
//!
//! Shows the per-position compatibility of two equal-length oligos without
//! building oligo sets. With `--offset-search`, the second oligo may be longer
//! and its best window is used.

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::alphabet::compatible;
use crate::core::oligo::{Collection, Oligo, SourceCoord, Strand};
use crate::core::types::Confidence;
use crate::matching::filter::percent_hit;
use crate::matching::scoring::score_symbols;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// First oligo (query), IUPAC symbols
    #[arg(required = true)]
    pub a: String,

    /// Second oligo (master), IUPAC symbols
    #[arg(required = true)]
    pub b: String,

    /// Allow the second oligo to be longer and search every offset
    #[arg(long)]
    pub offset_search: bool,
}

/// Comparison of one query against the best window of one master
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PairScore {
    pub query: String,
    /// Master window that was scored
    pub window: String,
    pub offset: usize,
    pub score: f64,
    pub matches: usize,
    /// Compatibility per query position
    pub compatible: Vec<bool>,
}

/// Score `a` against `b` (or its best window).
///
/// # Errors
///
/// Returns an error if either string contains an invalid symbol, or the
/// lengths are incompatible.
pub fn score_pair(a: &str, b: &str, offset_search: bool) -> anyhow::Result<PairScore> {
    let coord = |id: &str| SourceCoord::new(id, 0, Strand::Forward);
    let query = Oligo::parse("a", a, coord("a"), Collection::Query)?;
    let master = Oligo::parse("b", b, coord("b"), Collection::Master)?;

    let fits = if offset_search {
        master.len() >= query.len()
    } else {
        master.len() == query.len()
    };
    if !fits {
        anyhow::bail!(
            "Cannot score a {}-symbol oligo against a {}-symbol oligo{}",
            query.len(),
            master.len(),
            if offset_search { "" } else { " (use --offset-search for longer masters)" }
        );
    }

    let mut best: Option<(usize, f64)> = None;
    for offset in 0..=master.len() - query.len() {
        let window = Oligo::from_symbols(
            "b",
            master.symbols()[offset..offset + query.len()].to_vec(),
            master.source.clone(),
            Collection::Master,
        );
        let score = score_symbols(&query, &window);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((offset, score));
        }
    }
    let (offset, score) = best.unwrap_or((0, 0.0));

    let window = &master.symbols()[offset..offset + query.len()];
    let compatible: Vec<bool> = query
        .symbols()
        .iter()
        .zip(window)
        .map(|(q, m)| compatible(*q, *m))
        .collect();
    Ok(PairScore {
        query: query.sequence(),
        window: window.iter().map(|s| s.to_char()).collect(),
        offset,
        score,
        matches: compatible.iter().filter(|c| **c).count(),
        compatible,
    })
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the oligos cannot be parsed or compared.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let result = score_pair(&args.a, &args.b, args.offset_search)?;

    match format {
        OutputFormat::Text => print_text_result(&result, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Tsv | OutputFormat::Csv => {
            let d = format.delimiter().unwrap_or('\t');
            println!("query{d}window{d}offset{d}score{d}percent_hit{d}matches{d}length");
            println!(
                "{}{d}{}{d}{}{d}{:.4}{d}{:.2}{d}{}{d}{}",
                result.query,
                result.window,
                result.offset,
                result.score,
                percent_hit(result.score),
                result.matches,
                result.compatible.len()
            );
        }
    }
    Ok(())
}

fn print_text_result(result: &PairScore, verbose: bool) {
    let marks: String = result
        .compatible
        .iter()
        .map(|c| if *c { '|' } else { ' ' })
        .collect();
    println!("Query   {}", result.query);
    println!("        {marks}");
    println!("Master  {}", result.window);
    println!();
    println!(
        "Score: {:.4} ({}/{} compatible, {:.2}%) {}",
        result.score,
        result.matches,
        result.compatible.len(),
        percent_hit(result.score),
        Confidence::from_score(result.score)
    );
    if verbose || result.offset > 0 {
        println!("Offset: {}", result.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_pair() {
        let result = score_pair("ACGT", "ACGG", false).unwrap();
        assert!((result.score - 0.75).abs() < 1e-12);
        assert_eq!(result.compatible, vec![true, true, true, false]);

        let result = score_pair("acgt", "ACGN", false).unwrap();
        assert!((result.score - 1.0).abs() < 1e-12);
        assert_eq!(result.query, "ACGT");
    }

    #[test]
    fn test_score_pair_offset_search() {
        let result = score_pair("GGCC", "ATATGGCCAT", true).unwrap();
        assert_eq!(result.offset, 4);
        assert_eq!(result.window, "GGCC");
        assert_eq!(result.matches, 4);
    }

    #[test]
    fn test_score_pair_rejects_bad_input() {
        assert!(score_pair("ACGT", "ACG", false).is_err());
        assert!(score_pair("ACGT", "ACGTA", false).is_err());
        assert!(score_pair("ACXT", "ACGT", false).is_err());
    }
}
