//! Report generation for benchmark results
//!
//! This crate provides report generators for:
//!
//! - The console summary
//! - Generated text (CSV)
//! - Run summaries (JSON)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod console;
pub mod csv_export;
pub mod error;
pub mod json_export;

pub use console::{print_summary, render_summary};
pub use csv_export::{write_outputs, CsvOutputSink};
pub use error::{ReportError, ReportResult};
pub use json_export::RunReport;
