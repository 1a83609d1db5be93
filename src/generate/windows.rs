use tracing::debug;

use crate::core::alphabet::{reverse_complement, Symbol};
use crate::core::oligo::{SourceCoord, Strand};
use crate::generate::GenerateError;
use crate::parsing::records::OligoRecord;

/// Sliding-window extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Window length in symbols
    pub length: usize,
    /// Distance between consecutive window starts
    pub step: usize,
    /// Also emit the reverse complement of every window
    pub both_strands: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            length: 18,
            step: 1,
            both_strands: false,
        }
    }
}

/// Cut every source sequence into overlapping windows.
///
/// Forward windows are named `{id}_{n:03}` with a 1-based counter per source
/// sequence; reverse-complement windows reuse the counter of their forward
/// window with an `_rc` suffix. Every window records its source sequence,
/// 0-based start and strand. Sequences shorter than the window yield nothing.
///
/// # Errors
///
/// Returns `GenerateError::InvalidWindow` for a zero length or step, and
/// `GenerateError::InvalidSymbol` for a sequence character outside the IUPAC
/// alphabet.
pub fn sliding_windows(
    records: &[OligoRecord],
    config: &WindowConfig,
) -> Result<Vec<OligoRecord>, GenerateError> {
    if config.length == 0 || config.step == 0 {
        return Err(GenerateError::InvalidWindow {
            length: config.length,
            step: config.step,
        });
    }

    let mut windows = Vec::new();
    for record in records {
        let symbols = parse_symbols(record)?;
        if symbols.len() < config.length {
            debug!(
                "Sequence '{}' ({} bp) is shorter than the window length {}",
                record.id,
                symbols.len(),
                config.length
            );
            continue;
        }

        for (n, start) in (0..=symbols.len() - config.length)
            .step_by(config.step)
            .enumerate()
        {
            let window = &symbols[start..start + config.length];
            let id = format!("{}_{:03}", record.id, n + 1);
            windows.push(OligoRecord::new(
                id.clone(),
                to_string(window),
                SourceCoord::new(record.id.clone(), start as u64, Strand::Forward),
            ));
            if config.both_strands {
                windows.push(OligoRecord::new(
                    format!("{id}_rc"),
                    to_string(&reverse_complement(window)),
                    SourceCoord::new(record.id.clone(), start as u64, Strand::Reverse),
                ));
            }
        }
    }
    Ok(windows)
}

fn parse_symbols(record: &OligoRecord) -> Result<Vec<Symbol>, GenerateError> {
    record
        .sequence
        .bytes()
        .enumerate()
        .map(|(i, byte)| {
            Symbol::from_byte(byte).ok_or_else(|| GenerateError::InvalidSymbol {
                record: record.id.clone(),
                position: i + 1,
                symbol: char::from(byte),
            })
        })
        .collect()
}

fn to_string(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.to_char()).collect()
}
