//! Vector stores for storing and searching embedded data.
//!
//! Vector stores store embedded data (vectors) and perform vector search to
//! find the most similar vectors to a query. A workflow node resolves a
//! backing collection once per execution, wraps it in a [`VectorStore`], and
//! hands it (or a retriever over it) to downstream nodes.
//!
//! # Core Concepts
//!
//! - **Vector Store**: storage and retrieval of embeddings with metadata
//! - **Similarity Search**: find the k most similar documents to a query
//! - **Distance Metrics**: measure similarity between vectors
//!
//! # Example
//!
//! ```rust,ignore
//! use flowmesh::core::vector_stores::VectorStore;
//!
//! // Add documents to a store
//! let ids = store.add_texts(&texts, None, None).await?;
//!
//! // Search for similar documents
//! let results = store.similarity_search("query text", 5).await?;
//! ```

use crate::core::{
    documents::Document,
    embeddings::Embeddings,
    error::{Error, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Distance metric used for vector similarity calculation.
///
/// Cosine suits normalized embeddings and is the default everywhere in this
/// workspace; the others exist for stores whose backing database reports a
/// different raw distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine distance: angle between vectors (0 = identical, 2 = opposite)
    #[default]
    Cosine,

    /// Euclidean distance: L2 norm (0 = identical)
    Euclidean,

    /// Dot product: inner product of vectors, higher = more similar
    DotProduct,
}

impl DistanceMetric {
    /// Calculate the raw distance between two vectors.
    ///
    /// # Errors
    ///
    /// Fails with a query error when dimensionalities differ.
    pub fn calculate(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(Error::query(format!(
                "Vector dimension mismatch: {} vs {}",
                a.len(),
                b.len()
            )));
        }

        match self {
            DistanceMetric::Cosine => Ok(Self::cosine_distance(a, b)),
            DistanceMetric::Euclidean => Ok(Self::euclidean_distance(a, b)),
            DistanceMetric::DotProduct => Ok(Self::dot_product(a, b)),
        }
    }

    /// Convert a raw distance to a normalized relevance score in [0, 1]
    /// (0 = dissimilar, 1 = most similar).
    #[must_use]
    pub fn distance_to_relevance(&self, distance: f32) -> f32 {
        match self {
            // Cosine distance is [0, 2]
            DistanceMetric::Cosine => 1.0 - (distance / 2.0),
            // Euclidean distance for normalized embeddings is [0, sqrt(2)]
            DistanceMetric::Euclidean => 1.0 - (distance / 2.0_f32.sqrt()),
            // Dot product of normalized vectors is [-1, 1]
            DistanceMetric::DotProduct => (distance + 1.0) / 2.0,
        }
    }

    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        let dot = Self::dot_product(a, b);
        let norm_a = Self::magnitude(a);
        let norm_b = Self::magnitude(b);

        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0; // Maximum distance for zero vectors
        }

        // Clamp to [-1, 1] to absorb floating point drift
        let similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
        1.0 - similarity
    }

    fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    fn dot_product(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    fn magnitude(v: &[f32]) -> f32 {
        v.iter().map(|x| x.powi(2)).sum::<f32>().sqrt()
    }
}

/// Core vector store trait for storing and searching embeddings.
///
/// Implementations integrate concrete vector databases; the contract is kept
/// object-safe (`&self` receivers, concrete slice parameters) so resolved
/// stores can be shared behind `Arc<dyn VectorStore>` between a node's
/// output and the retrievers bound over it. Stores needing mutation use
/// interior synchronization.
///
/// # Required Methods
///
/// - [`embeddings`](VectorStore::embeddings): the embedding capability in use
/// - [`add_texts`](VectorStore::add_texts): embed and persist texts
/// - [`similarity_search_with_score`](VectorStore::similarity_search_with_score)
///
/// Default implementations cover `add_documents` (delegates to `add_texts`)
/// and `similarity_search` (drops scores). `delete` is optional.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the embeddings instance used by this vector store.
    fn embeddings(&self) -> Arc<dyn Embeddings>;

    /// Get the distance metric used by this vector store.
    fn distance_metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }

    /// Embed texts and add them to the store.
    ///
    /// # Arguments
    ///
    /// * `texts` - texts to embed and persist
    /// * `metadatas` - optional per-text metadata (length must match)
    /// * `ids` - optional per-text ids (length must match; generated when
    ///   absent)
    ///
    /// # Returns
    ///
    /// The ids of the added records, in input order.
    ///
    /// # Errors
    ///
    /// Fails on length mismatches, embedding failures, or storage failures.
    /// Records accumulate: repeated calls append rather than replace.
    async fn add_texts(
        &self,
        texts: &[String],
        metadatas: Option<&[HashMap<String, serde_json::Value>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>>;

    /// Add documents to the store.
    ///
    /// `page_content` is embedded; metadata rides along. Document ids are
    /// used when present and no explicit `ids` are supplied.
    async fn add_documents(
        &self,
        documents: &[Document],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let metadatas: Vec<HashMap<String, serde_json::Value>> =
            documents.iter().map(|d| d.metadata.clone()).collect();

        let generated_ids: Vec<String>;
        let ids_ref = if let Some(ids) = ids {
            ids
        } else {
            generated_ids = documents
                .iter()
                .map(|doc| {
                    doc.id
                        .clone()
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
                })
                .collect();
            &generated_ids
        };

        self.add_texts(&texts, Some(&metadatas), Some(ids_ref)).await
    }

    /// Perform similarity search, returning the k most similar documents.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let docs_and_scores = self.similarity_search_with_score(query, k).await?;
        Ok(docs_and_scores.into_iter().map(|(doc, _)| doc).collect())
    }

    /// Perform similarity search with relevance scores.
    ///
    /// # Returns
    ///
    /// `(document, score)` pairs ordered most-similar first, score in [0, 1].
    ///
    /// # Errors
    ///
    /// Driver-level failures (e.g. query vector dimensionality mismatch)
    /// propagate as query errors; nothing is retried.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>>;

    /// Delete records by id (all records when `ids` is `None`).
    async fn delete(&self, _ids: Option<&[String]>) -> Result<bool> {
        Err(Error::NotImplemented(
            "delete not implemented for this vector store".to_string(),
        ))
    }
}

/// In-memory vector store implementation.
///
/// A simple store backed by a `HashMap`, useful for tests, prototyping, and
/// exercising the node contract without a database. Uses cosine similarity
/// by default.
pub struct InMemoryVectorStore {
    /// Internal storage: id -> stored record
    store: RwLock<HashMap<String, StoredDocument>>,
    /// Embeddings function
    embedding: Arc<dyn Embeddings>,
    /// Distance metric to use for similarity calculation
    metric: DistanceMetric,
}

/// Internal document representation with embedded vector.
#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    text: String,
    vector: Vec<f32>,
    metadata: HashMap<String, serde_json::Value>,
}

impl InMemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new(embedding: Arc<dyn Embeddings>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            embedding,
            metric: DistanceMetric::Cosine,
        }
    }

    /// Create an in-memory store with a specific distance metric.
    #[must_use]
    pub fn with_metric(embedding: Arc<dyn Embeddings>, metric: DistanceMetric) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            embedding,
            metric,
        }
    }

    /// Number of stored records.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn len(&self) -> usize {
        self.store.read().unwrap().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_poisoned() -> Error {
        Error::query("in-memory store lock poisoned")
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn embeddings(&self) -> Arc<dyn Embeddings> {
        Arc::clone(&self.embedding)
    }

    fn distance_metric(&self) -> DistanceMetric {
        self.metric
    }

    async fn add_texts(
        &self,
        texts: &[String],
        metadatas: Option<&[HashMap<String, serde_json::Value>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let text_count = texts.len();
        if let Some(metadatas) = metadatas {
            if metadatas.len() != text_count {
                return Err(Error::invalid_input(format!(
                    "Metadatas length ({}) must match texts length ({})",
                    metadatas.len(),
                    text_count
                )));
            }
        }
        if let Some(ids) = ids {
            if ids.len() != text_count {
                return Err(Error::invalid_input(format!(
                    "IDs length ({}) must match texts length ({})",
                    ids.len(),
                    text_count
                )));
            }
        }

        // Embed before taking the lock; the lock is never held across await.
        let vectors = self.embedding.embed_documents(texts).await?;

        let doc_ids: Vec<String> = if let Some(ids) = ids {
            ids.to_vec()
        } else {
            (0..text_count)
                .map(|_| uuid::Uuid::new_v4().to_string())
                .collect()
        };

        let mut store = self.store.write().map_err(|_| Self::lock_poisoned())?;
        for (idx, text) in texts.iter().enumerate() {
            let doc_id = doc_ids[idx].clone();
            let metadata = metadatas
                .and_then(|m| m.get(idx))
                .cloned()
                .unwrap_or_default();

            store.insert(
                doc_id.clone(),
                StoredDocument {
                    id: doc_id,
                    text: text.clone(),
                    vector: vectors[idx].clone(),
                    metadata,
                },
            );
        }

        Ok(doc_ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let query_vector = self.embedding.embed_query(query).await?;

        let store = self.store.read().map_err(|_| Self::lock_poisoned())?;
        let mut doc_scores: Vec<(&StoredDocument, f32)> = Vec::with_capacity(store.len());
        for doc in store.values() {
            let distance = self.metric.calculate(&query_vector, &doc.vector)?;
            doc_scores.push((doc, self.metric.distance_to_relevance(distance)));
        }

        doc_scores
            .sort_unstable_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        doc_scores.truncate(k);

        Ok(doc_scores
            .into_iter()
            .map(|(doc, score)| {
                (
                    Document {
                        id: Some(doc.id.clone()),
                        page_content: doc.text.clone(),
                        metadata: doc.metadata.clone(),
                    },
                    score,
                )
            })
            .collect())
    }

    async fn delete(&self, ids: Option<&[String]>) -> Result<bool> {
        let mut store = self.store.write().map_err(|_| Self::lock_poisoned())?;
        if let Some(ids) = ids {
            for id in ids {
                store.remove(id);
            }
        } else {
            store.clear();
        }
        Ok(true)
    }
}
