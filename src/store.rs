//! SQLite-backed vector store for chunk records.
//!
//! One table (named by `[db].table`) holds every chunk of every loaded
//! source. Vectors are stored as little-endian `f32` BLOBs and searched by
//! brute-force cosine similarity in Rust, which is plenty for the few
//! thousand chunks a catalog produces.
//!
//! Loading is *replace-by-source*: writing records for a source path first
//! deletes whatever that path contributed before, so re-ingesting a changed
//! document never leaves stale chunks behind.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::error::PipelineError;
use crate::models::{ChunkRecord, SearchHit};

pub struct VectorStore {
    pool: SqlitePool,
    table: String,
    path: PathBuf,
}

impl VectorStore {
    /// Connect to the configured database. Does not create the table.
    pub async fn open(config: &Config) -> Result<Self> {
        if !crate::config::is_valid_identifier(&config.db.table) {
            return Err(PipelineError::InvalidTableName(config.db.table.clone()).into());
        }
        let pool = db::connect(config).await?;
        Ok(Self {
            pool,
            table: config.db.table.clone(),
            path: config.db.path.clone(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the chunk table and its index. Idempotent.
    pub async fn create_table(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                source_path TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                section TEXT,
                content_hash TEXT NOT NULL,
                dims INTEGER NOT NULL,
                vector BLOB NOT NULL,
                ingested_at INTEGER NOT NULL
            )
            "#,
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_source_path ON {table}(source_path)",
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn table_exists(&self) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name = ?",
        )
        .bind(&self.table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Replace every row of the records' source paths with `records`.
    ///
    /// Runs in a single transaction; returns the number of rows written.
    pub async fn replace_source(&self, records: &[ChunkRecord]) -> Result<usize> {
        if records.is_empty() {
            bail!("No records to load into table '{}'", self.table);
        }

        self.create_table().await?;

        let sources: BTreeSet<&str> = records.iter().map(|r| r.source_path.as_str()).collect();
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for source in sources {
            let deleted = sqlx::query(&format!(
                "DELETE FROM {} WHERE source_path = ?",
                self.table
            ))
            .bind(source)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if deleted > 0 {
                tracing::debug!(source, deleted, "replaced previous chunks");
            }
        }

        let insert = format!(
            "INSERT INTO {} (id, source_path, chunk_index, content, section, content_hash, dims, vector, ingested_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.table
        );
        for record in records {
            sqlx::query(&insert)
                .bind(&record.id)
                .bind(&record.source_path)
                .bind(record.chunk_index)
                .bind(&record.content)
                .bind(&record.section)
                .bind(&record.content_hash)
                .bind(record.vector.len() as i64)
                .bind(vec_to_blob(&record.vector))
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(records.len())
    }

    /// Nearest neighbours of `query_vec` by cosine similarity.
    ///
    /// Ties break on `id` so repeated searches return the same order.
    pub async fn search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        if !self.table_exists().await? {
            return Err(PipelineError::TableNotFound {
                table: self.table.clone(),
                path: self.path.clone(),
            }
            .into());
        }

        let rows = sqlx::query(&format!(
            "SELECT id, source_path, chunk_index, content, section, vector FROM {}",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("vector");
                let vector = blob_to_vec(&blob);
                SearchHit {
                    id: row.get("id"),
                    source_path: row.get("source_path"),
                    chunk_index: row.get("chunk_index"),
                    content: row.get("content"),
                    section: row.get("section"),
                    score: cosine_similarity(query_vec, &vector) as f64,
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);

        Ok(hits)
    }

    /// Number of stored chunks, optionally for a single source.
    pub async fn count(&self, source_path: Option<&str>) -> Result<i64> {
        let count: i64 = match source_path {
            Some(source) => {
                sqlx::query_scalar(&format!(
                    "SELECT COUNT(*) FROM {} WHERE source_path = ?",
                    self.table
                ))
                .bind(source)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(tmp: &tempfile::TempDir) -> Config {
        let mut cfg = Config::default();
        cfg.db.path = tmp.path().join("data").join("vectors.sqlite");
        cfg.db.table = "chunks_test".to_string();
        cfg
    }

    fn record(source: &str, index: i64, content: &str, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: format!("{}-{}", source, index),
            source_path: source.to_string(),
            chunk_index: index,
            content: content.to_string(),
            section: None,
            content_hash: String::new(),
            vector,
        }
    }

    #[tokio::test]
    async fn test_create_table_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = VectorStore::open(&test_config(&tmp)).await.unwrap();
        assert!(!store.table_exists().await.unwrap());
        store.create_table().await.unwrap();
        store.create_table().await.unwrap();
        assert!(store.table_exists().await.unwrap());
        assert_eq!(store.count(None).await.unwrap(), 0);
        store.close().await;
    }

    #[tokio::test]
    async fn test_replace_source_drops_previous_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = VectorStore::open(&test_config(&tmp)).await.unwrap();

        let first = vec![
            record("a.md", 0, "one", vec![1.0, 0.0]),
            record("a.md", 1, "two", vec![0.0, 1.0]),
            record("a.md", 2, "three", vec![1.0, 1.0]),
        ];
        store.replace_source(&first).await.unwrap();
        store
            .replace_source(&[record("b.md", 0, "other", vec![1.0, 0.0])])
            .await
            .unwrap();

        let second = vec![record("a.md", 0, "only", vec![1.0, 0.0])];
        assert_eq!(store.replace_source(&second).await.unwrap(), 1);

        assert_eq!(store.count(Some("a.md")).await.unwrap(), 1);
        assert_eq!(store.count(Some("b.md")).await.unwrap(), 1);
        assert_eq!(store.count(None).await.unwrap(), 2);
        store.close().await;
    }

    #[tokio::test]
    async fn test_replace_source_rejects_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = VectorStore::open(&test_config(&tmp)).await.unwrap();
        assert!(store.replace_source(&[]).await.is_err());
        store.close().await;
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = VectorStore::open(&test_config(&tmp)).await.unwrap();
        store
            .replace_source(&[
                record("doc.md", 0, "east", vec![1.0, 0.0]),
                record("doc.md", 1, "north", vec![0.0, 1.0]),
                record("doc.md", 2, "north-east", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "north");
        assert_eq!(hits[1].content, "north-east");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!(hits[0].score >= hits[1].score);
        store.close().await;
    }

    #[tokio::test]
    async fn test_search_missing_table() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = VectorStore::open(&test_config(&tmp)).await.unwrap();
        let err = store.search(&[1.0], 5).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::TableNotFound { .. })
        ));
        store.close().await;
    }
}
