//! eaf-results: run artifacts on disk.

pub mod fingerprint;
pub mod store;
pub mod types;

pub use fingerprint::fingerprint;
pub use store::{ArtifactStore, SNAPSHOT_CSV, SUMMARY_JSON, SavedArtifacts, VISUALIZATION_JSON};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Artifact not found: {name}")]
    NotFound { name: String },
}
