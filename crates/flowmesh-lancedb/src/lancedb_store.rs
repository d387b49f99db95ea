//! LanceDB-backed [`VectorStore`] implementation.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::{Float32Array, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::debug;
use uuid::Uuid;

use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table};

use flowmesh::core::documents::Document;
use flowmesh::core::embeddings::Embeddings;
use flowmesh::core::error::{Error, Result};
use flowmesh::core::vector_stores::{DistanceMetric, VectorStore};

use crate::connection::open_or_create;
use crate::schema::{
    batch_reader, rows_to_batch, DISTANCE_FIELD, ID_FIELD, METADATA_FIELD, TEXT_FIELD,
};

/// A vector store over one resolved LanceDB table.
///
/// Wraps the table handle and the embedding function into the uniform
/// similarity-search interface. Constructed fresh per node execution and
/// discarded when the execution's output is no longer referenced; no state
/// is cached across executions.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use flowmesh::core::embeddings::{Embeddings, MockEmbeddings};
/// use flowmesh::core::vector_stores::VectorStore;
/// use flowmesh::core::documents::Document;
/// use flowmesh_lancedb::{connection, LanceDbVectorStore};
///
/// # async fn example() -> flowmesh::core::Result<()> {
/// let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings::new(384));
///
/// let conn = connection::connect("data/lancedb").await?;
/// let store = LanceDbVectorStore::from_documents(
///     &conn,
///     "documents",
///     &[Document::new("Hello world"), Document::new("LanceDB is fast")],
///     Arc::clone(&embeddings),
/// )
/// .await?;
///
/// let results = store.similarity_search("greeting", 1).await?;
/// println!("Found: {}", results[0].page_content);
/// # Ok(())
/// # }
/// ```
pub struct LanceDbVectorStore {
    table: Table,
    embeddings: Arc<dyn Embeddings>,
}

impl LanceDbVectorStore {
    /// Wrap an already-resolved table.
    pub fn new(table: Table, embeddings: Arc<dyn Embeddings>) -> Self {
        Self { table, embeddings }
    }

    /// Resolve `table_name` (creating it from `documents` when absent) and
    /// wrap it. See [`crate::connection::open_or_create`] for the
    /// resolution rules.
    pub async fn from_documents(
        conn: &Connection,
        table_name: &str,
        documents: &[Document],
        embeddings: Arc<dyn Embeddings>,
    ) -> Result<Self> {
        let table = open_or_create(conn, table_name, documents, &embeddings).await?;
        Ok(Self::new(table, embeddings))
    }

    /// The name of the backing table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    /// Number of rows currently in the backing table.
    ///
    /// # Errors
    ///
    /// Surfaces driver failures as query errors.
    pub async fn count_rows(&self) -> Result<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| Error::query(format!("failed to count rows: {e}")))
    }
}

/// Map one result batch back to scored documents.
///
/// LanceDB returns the stored columns plus a `_distance` column; with the
/// cosine distance type that distance is in [0, 2] and converts to the
/// same relevance scale the rest of the workspace uses.
fn batch_to_scored_documents(batch: &RecordBatch) -> Result<Vec<(Document, f32)>> {
    let ids = string_column(batch, ID_FIELD)?;
    let texts = string_column(batch, TEXT_FIELD)?;
    let metadatas = string_column(batch, METADATA_FIELD)?;
    let distances = batch
        .column_by_name(DISTANCE_FIELD)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| Error::query("search results missing '_distance' column"))?;

    let mut results = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let metadata: HashMap<String, serde_json::Value> =
            serde_json::from_str(metadatas.value(row)).unwrap_or_default();

        let document = Document {
            id: Some(ids.value(row).to_string()),
            page_content: texts.value(row).to_string(),
            metadata,
        };
        let score = DistanceMetric::Cosine.distance_to_relevance(distances.value(row));
        results.push((document, score));
    }
    Ok(results)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::query(format!("search results missing '{name}' column")))
}

#[async_trait]
impl VectorStore for LanceDbVectorStore {
    fn embeddings(&self) -> Arc<dyn Embeddings> {
        Arc::clone(&self.embeddings)
    }

    fn distance_metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }

    async fn add_texts(
        &self,
        texts: &[String],
        metadatas: Option<&[HashMap<String, serde_json::Value>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(metas) = metadatas {
            if metas.len() != texts.len() {
                return Err(Error::invalid_input(format!(
                    "Metadatas length ({}) must match texts length ({})",
                    metas.len(),
                    texts.len()
                )));
            }
        }
        if let Some(ids) = ids {
            if ids.len() != texts.len() {
                return Err(Error::invalid_input(format!(
                    "IDs length ({}) must match texts length ({})",
                    ids.len(),
                    texts.len()
                )));
            }
        }

        let vectors = self.embeddings.embed_documents(texts).await?;

        let doc_ids: Vec<String> = if let Some(ids) = ids {
            ids.to_vec()
        } else {
            (0..texts.len())
                .map(|_| Uuid::new_v4().to_string())
                .collect()
        };
        let owned_metadatas: Vec<HashMap<String, serde_json::Value>> = match metadatas {
            Some(metas) => metas.to_vec(),
            None => vec![HashMap::new(); texts.len()],
        };

        let batch = rows_to_batch(&doc_ids, texts, &owned_metadatas, &vectors)?;
        debug!(
            table = self.table.name(),
            rows = batch.num_rows(),
            "adding texts"
        );
        self.table
            .add(batch_reader(batch))
            .execute()
            .await
            .map_err(|e| Error::query(format!("failed to add records: {e}")))?;

        Ok(doc_ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let query_vector = self.embeddings.embed_query(query).await?;

        debug!(table = self.table.name(), k, "similarity search");
        let mut stream = self
            .table
            .vector_search(query_vector)
            .map_err(|e| Error::query(format!("failed to build vector query: {e}")))?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| Error::query(format!("vector search failed: {e}")))?;

        let mut results = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| Error::query(format!("failed to read search results: {e}")))?
        {
            results.extend(batch_to_scored_documents(&batch)?);
        }

        // LanceDB returns nearest-first; keep at most k across batches.
        results.truncate(k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::embedding_schema;
    use arrow_array::FixedSizeListArray;
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc as StdArc;

    fn result_batch() -> RecordBatch {
        // Mimic a search result: stored columns plus _distance.
        let base = embedding_schema(2);
        let mut fields: Vec<Field> = base
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields.push(Field::new(DISTANCE_FIELD, DataType::Float32, true));
        let schema = StdArc::new(Schema::new(fields));

        let vectors = FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(
            vec![
                Some(vec![Some(1.0), Some(0.0)]),
                Some(vec![Some(0.0), Some(1.0)]),
            ]
            .into_iter(),
            2,
        );

        RecordBatch::try_new(
            schema,
            vec![
                StdArc::new(StringArray::from(vec!["id-1", "id-2"])),
                StdArc::new(StringArray::from(vec!["first", "second"])),
                StdArc::new(StringArray::from(vec![r#"{"source":"a"}"#, "{}"])),
                StdArc::new(vectors),
                StdArc::new(Float32Array::from(vec![0.0_f32, 1.0_f32])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn batch_parsing_maps_rows_and_scores() {
        let results = batch_to_scored_documents(&result_batch()).unwrap();
        assert_eq!(results.len(), 2);

        let (first, score) = &results[0];
        assert_eq!(first.id.as_deref(), Some("id-1"));
        assert_eq!(first.page_content, "first");
        assert_eq!(
            first.metadata.get("source"),
            Some(&serde_json::json!("a"))
        );
        // Cosine distance 0 -> relevance 1.0
        assert!((score - 1.0).abs() < 1e-6);

        // Cosine distance 1 (orthogonal) -> relevance 0.5
        assert!((results[1].1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn batch_parsing_requires_distance_column() {
        let base = embedding_schema(2);
        let vectors = FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(
            vec![Some(vec![Some(1.0), Some(0.0)])].into_iter(),
            2,
        );
        let batch = RecordBatch::try_new(
            base,
            vec![
                StdArc::new(StringArray::from(vec!["id-1"])),
                StdArc::new(StringArray::from(vec!["text"])),
                StdArc::new(StringArray::from(vec!["{}"])),
                StdArc::new(vectors),
            ],
        )
        .unwrap();

        let result = batch_to_scored_documents(&batch);
        assert!(matches!(result, Err(Error::Query(_))));
    }

    #[test]
    fn malformed_metadata_degrades_to_empty() {
        let batch = result_batch();
        // Row 1 metadata "{}" parses to empty; row 0 has a real key.
        let results = batch_to_scored_documents(&batch).unwrap();
        assert!(results[1].0.metadata.is_empty());
    }
}
