//! Expand command - list the concrete sequences of a degenerate oligo.

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::alphabet::expand_variants;
use crate::core::oligo::{Collection, Oligo, SourceCoord, Strand};

#[derive(Args)]
pub struct ExpandArgs {
    /// Degenerate oligo, IUPAC symbols
    #[arg(required = true)]
    pub oligo: String,

    /// Refuse to expand into more than this many sequences
    #[arg(long, default_value = "4096")]
    pub max_variants: usize,
}

/// Execute the expand command
///
/// # Errors
///
/// Returns an error if the oligo is invalid or has too many variants.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ExpandArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let oligo = Oligo::parse(
        "oligo",
        &args.oligo,
        SourceCoord::new("oligo", 0, Strand::Forward),
        Collection::Query,
    )?;
    let variants: Vec<String> = expand_variants(oligo.symbols(), args.max_variants)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "{} expands to more than {} sequences",
                oligo.sequence(),
                args.max_variants
            )
        })?
        .iter()
        .map(|v| v.iter().map(|s| s.to_char()).collect())
        .collect();

    if verbose {
        eprintln!("{} -> {} concrete sequence(s)", oligo.sequence(), variants.len());
    }

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "oligo": oligo.sequence(),
                "variants": variants,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text | OutputFormat::Tsv | OutputFormat::Csv => {
            for variant in &variants {
                println!("{variant}");
            }
        }
    }
    Ok(())
}
