use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::alphabet::Symbol;

/// Which of the two input collections an oligo belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Query,
    Master,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Master => write!(f, "master"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strand {
    #[default]
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Parse `+`/`-` (also accepts `1`/`-1`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" | "1" | "+1" => Some(Self::Forward),
            "-" | "-1" => Some(Self::Reverse),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// Where an oligo was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceCoord {
    /// Identifier of the originating sequence
    pub sequence_id: String,
    /// 0-based start offset of the window in the originating sequence
    pub start: u64,
    pub strand: Strand,
}

impl SourceCoord {
    pub fn new(sequence_id: impl Into<String>, start: u64, strand: Strand) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            start,
            strand,
        }
    }
}

impl std::fmt::Display for SourceCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}({})", self.sequence_id, self.start, self.strand)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OligoError {
    #[error("Invalid symbol {symbol:?} in {collection} record '{record}' at position {position}")]
    InvalidSymbol {
        record: String,
        collection: Collection,
        /// 1-based position in the record's sequence
        position: usize,
        symbol: char,
    },

    #[error("Length mismatch in {collection} record '{record}': expected {expected}, found {found}")]
    LengthMismatch {
        record: String,
        collection: Collection,
        expected: usize,
        found: usize,
    },

    #[error("Empty sequence in {collection} record '{record}'")]
    EmptySequence { record: String, collection: Collection },
}

/// An immutable, fixed-length oligo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oligo {
    pub id: String,
    pub source: SourceCoord,
    pub collection: Collection,
    symbols: Vec<Symbol>,
}

impl Oligo {
    /// Parse a raw symbol string.
    ///
    /// # Errors
    ///
    /// Returns `OligoError::InvalidSymbol` for the first character outside the
    /// IUPAC alphabet, or `OligoError::EmptySequence` for an empty string.
    pub fn parse(
        id: impl Into<String>,
        sequence: &str,
        source: SourceCoord,
        collection: Collection,
    ) -> Result<Self, OligoError> {
        let id = id.into();
        if sequence.is_empty() {
            return Err(OligoError::EmptySequence {
                record: id,
                collection,
            });
        }

        let mut symbols = Vec::with_capacity(sequence.len());
        for (i, byte) in sequence.bytes().enumerate() {
            match Symbol::from_byte(byte) {
                Some(s) => symbols.push(s),
                None => {
                    return Err(OligoError::InvalidSymbol {
                        record: id,
                        collection,
                        position: i + 1,
                        symbol: sequence[i..].chars().next().unwrap_or('?'),
                    })
                }
            }
        }

        Ok(Self {
            id,
            source,
            collection,
            symbols,
        })
    }

    #[must_use]
    pub fn from_symbols(
        id: impl Into<String>,
        symbols: Vec<Symbol>,
        source: SourceCoord,
        collection: Collection,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            collection,
            symbols,
        }
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Sequence as an uppercase IUPAC string.
    #[must_use]
    pub fn sequence(&self) -> String {
        self.symbols.iter().map(|s| s.to_char()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> SourceCoord {
        SourceCoord::new("seq1", 0, Strand::Forward)
    }

    #[test]
    fn test_parse_oligo() {
        let oligo = Oligo::parse("q1", "acgtn", coord(), Collection::Query).unwrap();
        assert_eq!(oligo.len(), 5);
        assert_eq!(oligo.sequence(), "ACGTN");
        assert_eq!(oligo.collection, Collection::Query);
    }

    #[test]
    fn test_invalid_symbol_names_record_and_position() {
        let err = Oligo::parse("m7", "ACXT", coord(), Collection::Master).unwrap_err();
        assert_eq!(
            err,
            OligoError::InvalidSymbol {
                record: "m7".to_string(),
                collection: Collection::Master,
                position: 3,
                symbol: 'X',
            }
        );
        let message = err.to_string();
        assert!(message.contains("m7"));
        assert!(message.contains("master"));
        assert!(message.contains("position 3"));
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let err = Oligo::parse("q0", "", coord(), Collection::Query).unwrap_err();
        assert!(matches!(err, OligoError::EmptySequence { .. }));
    }

    #[test]
    fn test_strand_parse_and_display() {
        assert_eq!(Strand::parse("+"), Some(Strand::Forward));
        assert_eq!(Strand::parse("-1"), Some(Strand::Reverse));
        assert_eq!(Strand::parse("x"), None);
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert_eq!(coord().to_string(), "seq1:0(+)");
    }
}
