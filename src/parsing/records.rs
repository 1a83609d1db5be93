//! Sequence records exchanged with the oligo generator.
//!
//! Generated oligo FASTA headers carry their source coordinate as
//! whitespace-separated `key=value` tags in the description:
//!
//! ```text
//! >chr1_001 source=chr1 start=0 strand=+
//! ACGTACGTACGTACGTAC
//! ```
//!
//! Records without tags are treated as forward-strand windows starting at 0
//! of a sequence named after the record itself.

use serde::{Deserialize, Serialize};

use crate::core::oligo::{SourceCoord, Strand};

/// One raw sequence record: identifier, symbol string and origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OligoRecord {
    pub id: String,
    pub sequence: String,
    pub source: SourceCoord,
}

impl OligoRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>, source: SourceCoord) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
            source,
        }
    }

    /// Build a record whose source coordinate is the start of its own sequence.
    pub fn untagged(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        let id = id.into();
        let source = SourceCoord::new(id.clone(), 0, Strand::Forward);
        Self::new(id, sequence, source)
    }

    /// Build a record from a FASTA name and optional description, reading
    /// coordinate tags from the description when present.
    pub fn from_header(name: &str, description: Option<&str>, sequence: impl Into<String>) -> Self {
        let mut source = SourceCoord::new(name, 0, Strand::Forward);
        if let Some(desc) = description {
            apply_coordinate_tags(&mut source, desc);
        }
        Self::new(name, sequence, source)
    }

    /// Description text that `from_header` reads back into the same coordinate.
    #[must_use]
    pub fn coordinate_tags(&self) -> String {
        format!(
            "source={} start={} strand={}",
            self.source.sequence_id, self.source.start, self.source.strand
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

fn apply_coordinate_tags(source: &mut SourceCoord, description: &str) {
    for token in description.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key {
            "source" if !value.is_empty() => source.sequence_id = value.to_string(),
            "start" => {
                if let Ok(start) = value.parse() {
                    source.start = start;
                }
            }
            "strand" => {
                if let Some(strand) = Strand::parse(value) {
                    source.strand = strand;
                }
            }
            _ => {}
        }
    }
}
