use anyhow::{bail, Result};

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::error::PipelineError;
use crate::models::SearchHit;
use crate::store::VectorStore;

/// Longest snippet printed per hit, in characters.
const SNIPPET_MAX_CHARS: usize = 500;

/// Entry point for `pdfh search`.
pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    if query.trim().is_empty() {
        return Err(PipelineError::EmptyQuery.into());
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let hits = search(config, provider.as_ref(), query, limit).await?;

    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}", format_hit(i + 1, hit));
    }

    Ok(())
}

/// Vector similarity search over the configured table.
///
/// Checks run in order: blank query, missing table, then the query is
/// embedded, so neither mistake costs an API call.
pub async fn search(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<SearchHit>> {
    if query.trim().is_empty() {
        return Err(PipelineError::EmptyQuery.into());
    }
    if limit == Some(0) {
        bail!("search limit must be at least 1");
    }

    let store = VectorStore::open(config).await?;
    let hits = search_store(&store, config, provider, query, limit).await;
    store.close().await;
    hits
}

async fn search_store(
    store: &VectorStore,
    config: &Config,
    provider: &dyn EmbeddingProvider,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<SearchHit>> {
    if !store.table_exists().await? {
        return Err(PipelineError::TableNotFound {
            table: config.db.table.clone(),
            path: config.db.path.clone(),
        }
        .into());
    }

    let query_vec = embedding::embed_query(provider, query).await?;
    let limit = limit.unwrap_or(config.retrieval.top_k);
    tracing::debug!(limit, dims = query_vec.len(), "searching");
    store.search(&query_vec, limit).await
}

/// One result line: `"<rank>. chunk #<i> (section: <s>) [<score>] -> <snippet>"`.
pub fn format_hit(rank: usize, hit: &SearchHit) -> String {
    format!(
        "{}. chunk #{} (section: {}) [{:.2}] -> {}",
        rank,
        hit.chunk_index,
        hit.section.as_deref().unwrap_or("-"),
        hit.score,
        snippet(&hit.content)
    )
}

/// Flatten newlines and cap the text at [`SNIPPET_MAX_CHARS`] characters.
pub fn snippet(content: &str) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() > SNIPPET_MAX_CHARS {
        let head: String = flat.chars().take(SNIPPET_MAX_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct PanicProvider;

    #[async_trait]
    impl EmbeddingProvider for PanicProvider {
        fn model_name(&self) -> &str {
            "panic"
        }

        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            panic!("embedding must not be requested");
        }
    }

    fn hit(content: &str, section: Option<&str>) -> SearchHit {
        SearchHit {
            id: "catalog-3".to_string(),
            source_path: "catalog.md".to_string(),
            chunk_index: 3,
            content: content.to_string(),
            section: section.map(str::to_string),
            score: 0.8765,
        }
    }

    #[test]
    fn test_snippet_short_text_flattened() {
        assert_eq!(snippet("line one\nline two"), "line one line two");
    }

    #[test]
    fn test_snippet_truncated() {
        let long = "x".repeat(600);
        let s = snippet(&long);
        assert_eq!(s.chars().count(), 500);
        assert!(s.ends_with("..."));
        assert_eq!(&s[..497], &long[..497]);
    }

    #[test]
    fn test_snippet_exactly_at_limit() {
        let exact = "y".repeat(500);
        assert_eq!(snippet(&exact), exact);
    }

    #[test]
    fn test_format_hit() {
        let line = format_hit(1, &hit("Red lamp\nbright", Some("Lighting")));
        assert_eq!(
            line,
            "1. chunk #3 (section: Lighting) [0.88] -> Red lamp bright"
        );
        let line = format_hit(2, &hit("plain", None));
        assert!(line.contains("(section: -)"));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let cfg = Config::default();
        let err = search(&cfg, &PanicProvider, "   ", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let cfg = Config::default();
        let err = search(&cfg, &PanicProvider, "red device", Some(0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[tokio::test]
    async fn test_missing_table_checked_before_embedding() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.db.path = tmp.path().join("vectors.sqlite");
        let err = search(&cfg, &PanicProvider, "red device", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::TableNotFound { .. })
        ));
    }
}
