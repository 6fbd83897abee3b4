//! Persisted course lists: a JSON snapshot carrying settings alongside the
//! courses, and a flat CSV table of courses.

mod snapshot;
mod table;

pub use snapshot::Transcript;
pub use table::{read_courses, write_courses};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to access transcript file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid course table: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid transcript snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
