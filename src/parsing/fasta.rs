//! FASTA record reader using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::parsing::records::OligoRecord;
use crate::parsing::ParseError;
use crate::utils::validation::check_record_limit;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read every record of a FASTA file.
///
/// Sequences are upper-cased; header coordinate tags are parsed into each
/// record's source coordinate. An empty file yields an empty vector.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, or `ParseError::TooManyRecords` if the limit is exceeded.
pub fn read_records(path: &Path) -> Result<Vec<OligoRecord>, ParseError> {
    let file = std::fs::File::open(path)?;
    let records = if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        read_records_from(reader)?
    } else {
        read_records_from(BufReader::new(file))?
    };

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read every record from any buffered FASTA source.
///
/// # Errors
///
/// Returns `ParseError::Noodles` if parsing fails or `ParseError::TooManyRecords`
/// if the limit is exceeded.
pub fn read_records_from<R: BufRead>(reader: R) -> Result<Vec<OligoRecord>, ParseError> {
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut records = Vec::new();

    for result in fasta_reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_record_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let description = record
            .description()
            .map(|d| String::from_utf8_lossy(d).to_string());
        let sequence: String = record
            .sequence()
            .as_ref()
            .iter()
            .map(|b| char::from(b.to_ascii_uppercase()))
            .collect();

        records.push(OligoRecord::from_header(
            &name,
            description.as_deref(),
            sequence,
        ));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oligo::{SourceCoord, Strand};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Oligos.FA")));

        assert!(!is_fasta_file(Path::new("test.csv")));
        assert!(!is_fasta_file(Path::new("test.fai")));
    }

    #[test]
    fn test_read_records() {
        let fasta_content =
            b">chr1_001 source=chr1 start=0 strand=+\nacgtac\ngt\n>chr1_002 source=chr1 start=1 strand=-\nCGTA\n>plain\nNNNN\n";

        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let records = read_records(temp.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "chr1_001");
        assert_eq!(records[0].sequence, "ACGTACGT");
        assert_eq!(records[1].source, SourceCoord::new("chr1", 1, Strand::Reverse));
        assert_eq!(records[2].source, SourceCoord::new("plain", 0, Strand::Forward));
    }

    #[test]
    fn test_read_gzipped_records() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        let mut encoder = GzEncoder::new(temp.reopen().unwrap(), Compression::default());
        encoder.write_all(b">q1\nACGT\n").unwrap();
        encoder.finish().unwrap();

        let records = read_records(temp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, "ACGT");
    }

    #[test]
    fn test_read_empty_fasta() {
        let temp = NamedTempFile::with_suffix(".fa").unwrap();
        let records = read_records(temp.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let result = read_records(Path::new("/nonexistent/oligos.fa"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
