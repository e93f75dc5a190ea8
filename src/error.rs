//! Error types for the fallible edges (tuning, settings and question bank loading)
//!
//! The simulation itself never fails; anything odd at runtime degrades to a no-op.

/// Errors raised while loading configuration or question data
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tuning values that cannot produce a playable game
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    /// A question that can never be answered correctly
    #[error("Invalid question {id}: {reason}")]
    InvalidQuestion { id: u32, reason: String },

    /// Question bank contains no questions
    #[error("Question bank is empty")]
    EmptyQuestionBank,
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;
