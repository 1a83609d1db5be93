use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::parsing::records::OligoRecord;

/// Sequence line width of written FASTA
pub const LINE_WIDTH: usize = 80;

/// Write records as FASTA, wrapping sequences at [`LINE_WIDTH`].
///
/// Each header carries the record's coordinate tags so the file reads back
/// into the same records.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_fasta<W: Write>(writer: &mut W, records: &[OligoRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(writer, ">{} {}", record.id, record.coordinate_tags())?;
        for line in record.sequence.as_bytes().chunks(LINE_WIDTH) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Write records to a FASTA file, gzip-compressed when the path ends in `.gz`.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the file.
pub fn write_fasta_file(path: &Path, records: &[OligoRecord]) -> std::io::Result<()> {
    let file = File::create(path)?;
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz")) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_fasta(&mut encoder, records)?;
        encoder.finish()?.flush()
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta(&mut writer, records)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oligo::{SourceCoord, Strand};
    use crate::parsing::fasta::read_records;
    use tempfile::NamedTempFile;

    fn records() -> Vec<OligoRecord> {
        vec![
            OligoRecord::new("chr1_001", "ACGTRY", SourceCoord::new("chr1", 0, Strand::Forward)),
            OligoRecord::new("chr1_001_rc", "RYACGT", SourceCoord::new("chr1", 0, Strand::Reverse)),
        ]
    }

    #[test]
    fn test_write_fasta_headers() {
        let mut out = Vec::new();
        write_fasta(&mut out, &records()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(">chr1_001 source=chr1 start=0 strand=+\nACGTRY\n"));
        assert!(text.contains(">chr1_001_rc source=chr1 start=0 strand=-\n"));
    }

    #[test]
    fn test_long_sequences_wrap() {
        let long = OligoRecord::untagged("long", "A".repeat(170));
        let mut out = Vec::new();
        write_fasta(&mut out, &[long]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let widths: Vec<usize> = text.lines().skip(1).map(str::len).collect();
        assert_eq!(widths, vec![80, 80, 10]);
    }

    #[test]
    fn test_file_reads_back() {
        for suffix in [".fa", ".fa.gz"] {
            let temp = NamedTempFile::with_suffix(suffix).unwrap();
            write_fasta_file(temp.path(), &records()).unwrap();
            assert_eq!(read_records(temp.path()).unwrap(), records(), "{suffix}");
        }
    }
}
