//! Document retrieval interfaces.
//!
//! A retriever takes a text query and returns the most relevant documents.
//! [`VectorStoreRetriever`] is the workhorse: a bound view over a shared
//! [`VectorStore`] fixed to a constant result count, which is what a node
//! returns when the workflow asked for its `retriever` output socket.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::documents::Document;
use crate::core::error::{Error, Result};
use crate::core::vector_stores::VectorStore;

/// Number of results a retriever returns when nothing else was configured.
pub const DEFAULT_TOP_K: usize = 4;

/// Configuration for retriever searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of documents to retrieve
    pub k: usize,

    /// Minimum relevance score in [0, 1]; results below it are dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            k: DEFAULT_TOP_K,
            score_threshold: None,
        }
    }
}

impl SearchConfig {
    /// Create a new search configuration with the given k.
    #[must_use]
    pub fn new(k: usize) -> Self {
        SearchConfig {
            k,
            ..Default::default()
        }
    }

    /// Set the number of documents to retrieve.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the score threshold for filtering results.
    #[must_use]
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }
}

/// Abstract trait for document retrieval systems.
///
/// # Implementation
///
/// Implement `get_relevant_documents` to define retrieval logic:
///
/// ```rust,ignore
/// #[async_trait]
/// impl Retriever for MyRetriever {
///     async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
///         // Your retrieval logic here
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve the documents most relevant to `query`.
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>>;

    /// Get the name of this retriever for tracing/logging.
    fn name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Retriever")
            .to_string()
    }
}

/// Retriever wrapper around a shared [`VectorStore`].
///
/// Stateless beyond its binding: the store handle plus a fixed search
/// configuration. Constructed fresh per node execution and discarded when
/// the workflow run completes.
///
/// # Example
///
/// ```rust,ignore
/// use flowmesh::core::retrievers::{Retriever, VectorStoreRetriever};
///
/// let retriever = VectorStoreRetriever::new(store, 5);
/// let docs = retriever.get_relevant_documents("query").await?;
/// ```
pub struct VectorStoreRetriever {
    /// The underlying vector store.
    store: Arc<dyn VectorStore>,

    /// Search configuration (k, threshold).
    config: SearchConfig,
}

impl VectorStoreRetriever {
    /// Create a retriever bound to a fixed result count.
    pub fn new(store: Arc<dyn VectorStore>, k: usize) -> Self {
        VectorStoreRetriever {
            store,
            config: SearchConfig::new(k),
        }
    }

    /// Create a retriever from a full search configuration.
    pub fn with_config(store: Arc<dyn VectorStore>, config: SearchConfig) -> Self {
        VectorStoreRetriever { store, config }
    }

    /// The fixed result count this retriever is bound to.
    #[must_use]
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// The underlying store handle.
    #[must_use]
    pub fn store(&self) -> Arc<dyn VectorStore> {
        Arc::clone(&self.store)
    }

    fn validate_config(&self) -> Result<()> {
        if let Some(threshold) = self.config.score_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::config(format!(
                    "score_threshold must be in range [0.0, 1.0], got {threshold}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
        self.validate_config()?;

        match self.config.score_threshold {
            None => self.store.similarity_search(query, self.config.k).await,
            Some(threshold) => {
                let docs_with_scores = self
                    .store
                    .similarity_search_with_score(query, self.config.k)
                    .await?;
                Ok(docs_with_scores
                    .into_iter()
                    .filter(|(_, score)| *score >= threshold)
                    .map(|(doc, _)| doc)
                    .collect())
            }
        }
    }

    fn name(&self) -> String {
        "VectorStoreRetriever".to_string()
    }
}
