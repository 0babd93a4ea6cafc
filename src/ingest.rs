//! Ingestion pipeline orchestration.
//!
//! Coordinates the load flow: markdown file → chunking → embedding →
//! records → vector store. Any failure aborts the whole load; the store is
//! only written once every chunk has a vector.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::chunk::{chunk_markdown, infer_section_title};
use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::error::PipelineError;
use crate::models::ChunkRecord;
use crate::store::VectorStore;

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source_path: String,
    pub chunks: usize,
    pub records_written: usize,
    pub table: String,
}

/// Entry point for `pdfh ingest`.
pub async fn run_ingest(config: &Config, markdown_path: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        let text = load_markdown(markdown_path)?;
        let chunks = chunk_markdown(
            &text,
            config.chunking.max_chars,
            config.chunking.overlap_chars,
        );
        println!("ingest {} (dry-run)", markdown_path.display());
        println!(
            "  chunking: max_chars={}, overlap_chars={}",
            config.chunking.max_chars, config.chunking.overlap_chars
        );
        println!("  chunks: {}", chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            println!("    #{}: {} chars", i, chunk.chars().count());
        }
        return Ok(());
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let report = ingest_markdown(config, provider.as_ref(), markdown_path).await?;

    println!("ingest {}", report.source_path);
    println!("  model: {}", provider.model_name());
    println!("  chunks: {}", report.chunks);
    println!(
        "  records written: {} (table: {})",
        report.records_written, report.table
    );
    println!("  database: {}", config.db.path.display());
    println!("ok");

    Ok(())
}

/// Load one markdown file into the vector store, replacing any earlier
/// load of the same path.
pub async fn ingest_markdown(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    markdown_path: &Path,
) -> Result<IngestReport> {
    tracing::info!(path = %markdown_path.display(), "loading markdown");
    let text = load_markdown(markdown_path)?;

    let chunks = chunk_markdown(
        &text,
        config.chunking.max_chars,
        config.chunking.overlap_chars,
    );
    if chunks.is_empty() {
        return Err(PipelineError::NoContent(markdown_path.to_path_buf()).into());
    }
    tracing::info!(
        chunks = chunks.len(),
        max_chars = config.chunking.max_chars,
        overlap_chars = config.chunking.overlap_chars,
        "chunked markdown"
    );

    tracing::info!(model = provider.model_name(), "creating embeddings");
    let vectors = embedding::embed_batched(
        provider,
        &chunks,
        config.embedding.batch_size,
        config.embedding.dims,
    )
    .await?;

    let records = records_from_chunks(&chunks, vectors, markdown_path)?;

    let store = VectorStore::open(config).await?;
    let written = store.replace_source(&records).await;
    let table = store.table().to_string();
    store.close().await;
    let written = written?;
    tracing::info!(records = written, table = %table, "wrote records");

    Ok(IngestReport {
        source_path: markdown_path.display().to_string(),
        chunks: chunks.len(),
        records_written: written,
        table,
    })
}

/// Read a markdown file, reporting a missing file as [`PipelineError::NotFound`].
pub fn load_markdown(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PipelineError::NotFound(path.to_path_buf()).into());
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read markdown file: {}", path.display()))
}

/// Pair chunks with their vectors and assign record identity.
///
/// Ids are `"<file stem>-<index>"`, so reloading the same file reuses them.
pub fn records_from_chunks(
    chunks: &[String],
    vectors: Vec<Vec<f32>>,
    source: &Path,
) -> Result<Vec<ChunkRecord>> {
    if chunks.len() != vectors.len() {
        return Err(PipelineError::CountMismatch {
            chunks: chunks.len(),
            vectors: vectors.len(),
        }
        .into());
    }

    let source_name = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let source_path = source.display().to_string();

    let records = chunks
        .iter()
        .zip(vectors)
        .enumerate()
        .map(|(idx, (text, vector))| ChunkRecord {
            id: format!("{}-{}", source_name, idx),
            source_path: source_path.clone(),
            chunk_index: idx as i64,
            content: text.clone(),
            section: infer_section_title(text),
            content_hash: content_hash(text),
            vector,
        })
        .collect();

    Ok(records)
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_from_chunks() {
        let chunks = vec![
            "# Widgets\n\nRed widget.".to_string(),
            "Blue widget.".to_string(),
        ];
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let records =
            records_from_chunks(&chunks, vectors, Path::new("docs/catalog_parsed.md")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "catalog_parsed-0");
        assert_eq!(records[1].id, "catalog_parsed-1");
        assert_eq!(records[0].source_path, "docs/catalog_parsed.md");
        assert_eq!(records[0].section.as_deref(), Some("Widgets"));
        assert_eq!(records[1].section, None);
        assert_eq!(records[1].chunk_index, 1);
        assert_eq!(records[1].vector, vec![0.0, 1.0]);
        assert_eq!(records[0].content_hash.len(), 64);
        assert_ne!(records[0].content_hash, records[1].content_hash);
    }

    #[test]
    fn test_records_count_mismatch() {
        let chunks = vec!["a".to_string(), "b".to_string()];
        let err = records_from_chunks(&chunks, vec![vec![1.0]], Path::new("x.md")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::CountMismatch {
                chunks: 2,
                vectors: 1
            })
        ));
    }

    #[test]
    fn test_load_missing_markdown() {
        let err = load_markdown(Path::new("/nonexistent/catalog.md")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NotFound(_))
        ));
    }
}
