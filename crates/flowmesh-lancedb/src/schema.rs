//! Arrow schema and record batch construction for the LanceDB table layout.
//!
//! One row per embedded document: id, text, metadata (JSON-encoded), and the
//! vector as a fixed-size float list. The vector dimensionality is derived
//! from the embeddings at table-creation time and fixed for the table's
//! lifetime; LanceDB rejects later writes or queries with a different
//! dimensionality.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{ArrowError, DataType, Field, Schema};

use flowmesh::core::error::{Error, Result};

/// Field names used in LanceDB tables
pub(crate) const ID_FIELD: &str = "id";
pub(crate) const TEXT_FIELD: &str = "text";
pub(crate) const METADATA_FIELD: &str = "metadata";
pub(crate) const VECTOR_FIELD: &str = "vector";

/// Distance column LanceDB appends to vector search results
pub(crate) const DISTANCE_FIELD: &str = "_distance";

/// Build the table schema for the given embedding dimensionality.
pub(crate) fn embedding_schema(dimension: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(ID_FIELD, DataType::Utf8, false),
        Field::new(TEXT_FIELD, DataType::Utf8, false),
        Field::new(METADATA_FIELD, DataType::Utf8, false),
        Field::new(
            VECTOR_FIELD,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dimension,
            ),
            true,
        ),
    ]))
}

/// Assemble one record batch from parallel row slices.
///
/// Lengths must already be validated by the caller; the embedding
/// dimensionality is taken from the first vector.
pub(crate) fn rows_to_batch(
    ids: &[String],
    texts: &[String],
    metadatas: &[HashMap<String, serde_json::Value>],
    vectors: &[Vec<f32>],
) -> Result<RecordBatch> {
    let dimension = vectors.first().map_or(0, Vec::len);
    if dimension == 0 {
        return Err(Error::SchemaInference(
            "embedding produced zero-dimensional vectors".to_string(),
        ));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let schema = embedding_schema(dimension as i32);

    let metadata_jsons: Vec<String> = metadatas
        .iter()
        .map(|m| serde_json::to_string(m).unwrap_or_else(|_| "{}".to_string()))
        .collect();

    let vector_cells: Vec<Option<Vec<Option<f32>>>> = vectors
        .iter()
        .map(|v| Some(v.iter().copied().map(Some).collect()))
        .collect();

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let vector_array = FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(
        vector_cells.into_iter(),
        dimension as i32,
    );

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids.to_vec())),
            Arc::new(StringArray::from(texts.to_vec())),
            Arc::new(StringArray::from(metadata_jsons)),
            Arc::new(vector_array),
        ],
    )
    .map_err(|e| Error::query(format!("failed to assemble record batch: {e}")))
}

/// Wrap a single batch in the reader shape LanceDB's write paths expect.
pub(crate) fn batch_reader(
    batch: RecordBatch,
) -> Box<dyn arrow_array::RecordBatchReader + Send> {
    let schema = batch.schema();
    Box::new(RecordBatchIterator::new(
        vec![Ok::<RecordBatch, ArrowError>(batch)].into_iter(),
        schema,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_shape() {
        let schema = embedding_schema(3);
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.field(0).name(), ID_FIELD);
        assert!(matches!(
            schema.field(3).data_type(),
            DataType::FixedSizeList(_, 3)
        ));
    }

    #[test]
    fn rows_to_batch_builds_one_row_per_document() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let texts = vec!["first".to_string(), "second".to_string()];
        let metadatas = vec![HashMap::new(), HashMap::new()];
        let vectors = vec![vec![0.1, 0.2], vec![0.3, 0.4]];

        let batch = rows_to_batch(&ids, &texts, &metadatas, &vectors).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);
    }

    #[test]
    fn zero_dimensional_vectors_rejected() {
        let result = rows_to_batch(
            &["a".to_string()],
            &["text".to_string()],
            &[HashMap::new()],
            &[vec![]],
        );
        assert!(matches!(result, Err(Error::SchemaInference(_))));
    }
}
