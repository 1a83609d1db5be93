//! Output destinations and delimited-row helpers shared by commands.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::cli::OutputFormat;

/// Base name of timestamped report files
pub const REPORT_BASENAME: &str = "fops_report";

/// Open `path` for writing, or stdout when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// `{dir}/fops_report_{YYYYmmdd_HHMMSS}.{ext}`
#[must_use]
pub fn timestamped_report_path(dir: &Path, format: OutputFormat, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{REPORT_BASENAME}_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Resolve the destination of a report: an explicit file wins over a report
/// directory.
#[must_use]
pub fn report_destination(
    output: Option<&Path>,
    report_dir: Option<&Path>,
    format: OutputFormat,
) -> Option<PathBuf> {
    output
        .map(Path::to_path_buf)
        .or_else(|| report_dir.map(|dir| timestamped_report_path(dir, format, Local::now())))
}

/// Quote a CSV field if it contains the delimiter, a quote or a newline.
#[must_use]
pub fn escape_field(field: &str, delimiter: char) -> String {
    if delimiter == ',' && field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write one delimited row.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_row<W: Write + ?Sized>(writer: &mut W, fields: &[String], delimiter: char) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f, delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string());
    writeln!(writer, "{line}")
}
