//! Prompts from one column of a CSV file

use std::path::{Path, PathBuf};

use servebench_core::{PromptSource, SamplerError};

/// Reads every row's value in one column, in file order.
#[derive(Debug, Clone)]
pub struct CsvPromptSource {
    path: PathBuf,
    column: usize,
    has_header: bool,
}

impl CsvPromptSource {
    /// Read column 0 of `path`, skipping the header row
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            column: 0,
            has_header: true,
        }
    }

    /// Read a different column
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Whether the first row is a header to skip
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Path of the input file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PromptSource for CsvPromptSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self) -> Result<Vec<String>, SamplerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .flexible(true)
            .from_path(&self.path)
            .map_err(csv_error)?;

        let mut prompts = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let value = record.get(self.column).ok_or_else(|| {
                SamplerError::Parse(format!(
                    "row {} of {} has no column {}",
                    row + 1,
                    self.path.display(),
                    self.column
                ))
            })?;
            prompts.push(value.to_string());
        }

        if prompts.is_empty() {
            return Err(SamplerError::Empty(self.path.display().to_string()));
        }

        tracing::info!(
            path = %self.path.display(),
            column = self.column,
            prompts = prompts.len(),
            "Loaded prompts"
        );
        Ok(prompts)
    }
}

fn csv_error(err: csv::Error) -> SamplerError {
    if !err.is_io_error() {
        return SamplerError::Parse(err.to_string());
    }
    match err.into_kind() {
        csv::ErrorKind::Io(e) => SamplerError::Io(e),
        other => SamplerError::Parse(format!("{other:?}")),
    }
}
