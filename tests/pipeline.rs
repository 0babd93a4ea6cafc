//! Ingest → search through the library API with an in-process provider.

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use pdf_harness::config::Config;
use pdf_harness::embedding::EmbeddingProvider;
use pdf_harness::error::PipelineError;
use pdf_harness::ingest::ingest_markdown;
use pdf_harness::search::search;
use pdf_harness::store::VectorStore;

/// Embeds text as counts of a few keywords.
struct KeywordProvider;

const KEYWORDS: [&str; 3] = ["lamp", "fan", "chair"];

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    fn model_name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                KEYWORDS
                    .iter()
                    .map(|k| lower.matches(k).count() as f32 + 0.01)
                    .collect()
            })
            .collect())
    }
}

/// Drops the last vector of every batch.
struct ShortProvider;

#[async_trait]
impl EmbeddingProvider for ShortProvider {
    fn model_name(&self) -> &str {
        "short"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
    }
}

fn test_config(root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.db.path = root.join("data").join("vectors.sqlite");
    cfg.db.table = "pipeline_chunks".to_string();
    cfg.chunking.max_chars = 60;
    cfg.chunking.overlap_chars = 0;
    cfg.retrieval.top_k = 2;
    cfg
}

fn write(root: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = root.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_ingest_then_search() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let md = write(
        tmp.path(),
        "catalog_parsed.md",
        "# Lighting\nA brass lamp, a desk lamp, a floor lamp.\n\n\
         # Cooling\nA ceiling fan and a tower fan.\n\n\
         # Seating\nAn oak chair with a padded seat.\n",
    );

    let report = ingest_markdown(&cfg, &KeywordProvider, &md).await.unwrap();
    assert_eq!(report.chunks, 3);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.table, "pipeline_chunks");

    let hits = search(&cfg, &KeywordProvider, "which fan is quiet", None)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2, "limit defaults to retrieval.top_k");
    assert_eq!(hits[0].section.as_deref(), Some("Cooling"));
    assert_eq!(hits[0].id, "catalog_parsed-1");
    assert!(hits[0].score > hits[1].score);

    let hits = search(&cfg, &KeywordProvider, "lamp", Some(1)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk_index, 0);
}

#[tokio::test]
async fn test_reingest_replaces_previous_load() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let md = write(
        tmp.path(),
        "catalog.md",
        "First lamp paragraph.\n\nSecond fan paragraph that is long enough.\n\nThird chair.",
    );
    let other = write(tmp.path(), "other.md", "An unrelated chair.");

    ingest_markdown(&cfg, &KeywordProvider, &md).await.unwrap();
    ingest_markdown(&cfg, &KeywordProvider, &other).await.unwrap();

    fs::write(&md, "Only one lamp now.").unwrap();
    let report = ingest_markdown(&cfg, &KeywordProvider, &md).await.unwrap();
    assert_eq!(report.records_written, 1);

    let store = VectorStore::open(&cfg).await.unwrap();
    let md_source = md.display().to_string();
    let other_source = other.display().to_string();
    assert_eq!(store.count(Some(&md_source)).await.unwrap(), 1);
    assert_eq!(store.count(Some(&other_source)).await.unwrap(), 1);
    store.close().await;
}

#[tokio::test]
async fn test_blank_markdown_is_no_content() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let md = write(tmp.path(), "blank.md", "\n\n   \n\n");

    let err = ingest_markdown(&cfg, &KeywordProvider, &md)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoContent(_))
    ));
    assert!(!cfg.db.path.exists());
}

#[tokio::test]
async fn test_short_provider_aborts_before_writing() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let md = write(tmp.path(), "catalog.md", "One lamp.\n\nTwo fans.");

    let err = ingest_markdown(&cfg, &ShortProvider, &md).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::CountMismatch { .. })
    ));
    assert!(!cfg.db.path.exists());
}
