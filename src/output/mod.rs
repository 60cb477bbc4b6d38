//! Output module for rendering sessions and store statistics
//!
//! This module handles:
//! - JSON rendering of sessions and single-source results
//! - Markdown session summaries
//! - Store statistics for the console

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::session::ScrapingSession;
use crate::source::ScrapingResult;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Renders a session as pretty-printed JSON
pub fn session_to_json(session: &ScrapingSession) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Renders a single-source result as pretty-printed JSON
pub fn result_to_json(result: &ScrapingResult) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
