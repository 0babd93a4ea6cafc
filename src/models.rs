//! Core data models used throughout pdf-harness.
//!
//! These types represent the chunk records written to the vector store and
//! the hits returned from it.

use serde::Serialize;

/// A chunk of a markdown document, ready for storage.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// `"<source stem>-<chunk index>"`.
    pub id: String,
    pub source_path: String,
    pub chunk_index: i64,
    pub content: String,
    /// First markdown heading inside the chunk.
    pub section: Option<String>,
    /// SHA-256 of `content`, hex encoded.
    pub content_hash: String,
    pub vector: Vec<f32>,
}

/// A search result returned from the vector store.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub source_path: String,
    pub chunk_index: i64,
    pub content: String,
    pub section: Option<String>,
    /// Cosine similarity to the query vector.
    pub score: f64,
}
