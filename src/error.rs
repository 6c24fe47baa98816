use thiserror::Error;

use crate::data::model::{Feature, SourceId};

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

/// Failures raised by loading, analysis and rendering.
///
/// Loaders wrap these in `anyhow::Error` with context; analysis functions
/// return them directly.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("dataset contains no observations")]
    EmptyDataset,

    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("row {row}: invalid label {value} (expected 1, -1 or 0)")]
    InvalidLabel { row: usize, value: i64 },

    #[error("cannot estimate density of {feature} for image {image}: {reason}")]
    DegenerateSample {
        feature: Feature,
        image: SourceId,
        reason: &'static str,
    },

    #[error("rendering failed: {0}")]
    Rendering(String),
}

// Only the message is kept so the error stays `Send + Sync` for `anyhow`.
impl From<eframe::Error> for AnalysisError {
    fn from(err: eframe::Error) -> Self {
        AnalysisError::Rendering(err.to_string())
    }
}
