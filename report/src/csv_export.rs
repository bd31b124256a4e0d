//! Generated text export

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use servebench_core::ResultRecord;

use crate::error::ReportResult;

/// End-of-sequence marker removed from exported outputs
const EOS_MARKER: &str = "</s>";

/// Writes one row per request, in request id order, holding its output text.
#[derive(Debug, Clone)]
pub struct CsvOutputSink {
    path: PathBuf,
}

impl CsvOutputSink {
    /// Sink writing to `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file and write every record's output
    pub fn export(&self, records: &[ResultRecord]) -> ReportResult<()> {
        let file = File::create(&self.path)?;
        write_outputs(file, records)?;
        tracing::info!(
            path = %self.path.display(),
            rows = records.len(),
            "Exported outputs"
        );
        Ok(())
    }
}

/// Write the output column of `records` to `writer`
pub fn write_outputs<W: Write>(writer: W, records: &[ResultRecord]) -> ReportResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for record in records {
        wtr.write_record([record.output_text.replace(EOS_MARKER, "")])?;
    }

    wtr.flush()?;
    Ok(())
}
