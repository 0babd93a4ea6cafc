//! Failure conditions surfaced by the parse, ingest, and search commands.
//!
//! Command functions return `anyhow::Result`; these variants are the
//! distinct, user-visible conditions inside it. Callers that need to react
//! to one of them can `downcast_ref::<PipelineError>()`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input file (PDF or markdown) does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Chunking produced nothing where at least one chunk was required.
    #[error("no chunks produced from {}; check the input file", .0.display())]
    NoContent(PathBuf),

    /// The embedding provider's credential is not configured.
    #[error("{0} environment variable is not set")]
    MissingCredentials(String),

    /// Chunks and vectors disagree in count before persistence.
    #[error("number of chunks and embeddings must match ({chunks} chunks, {vectors} embeddings)")]
    CountMismatch { chunks: usize, vectors: usize },

    /// Search was run against a table that was never loaded.
    #[error("table '{table}' not found in database at {}", .path.display())]
    TableNotFound { table: String, path: PathBuf },

    #[error("query text must be provided")]
    EmptyQuery,

    #[error("invalid table name '{0}': use letters, digits, and underscores")]
    InvalidTableName(String),
}
