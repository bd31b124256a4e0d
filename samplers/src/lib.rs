//! Prompt sources and prompt shaping
//!
//! This crate provides:
//!
//! - `CsvPromptSource`, an implementation of the `PromptSource` trait
//! - Prompt-count adjustment (replication and truncation)
//! - Model-specific prompt templates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adjust;
pub mod source;
pub mod template;

pub use adjust::adjust_prompt_count;
pub use source::CsvPromptSource;
pub use template::PromptTemplate;
