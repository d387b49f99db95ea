//! LanceDB connection and table resolution.
//!
//! Connection handles are explicit: every operation takes the handle it
//! should run against, and nothing in this crate keeps process-wide driver
//! state. A handle lives for one node execution; there is no pooling and no
//! explicit teardown beyond the driver's own cleanup.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use lancedb::{Connection, Table};

use flowmesh::core::documents::Document;
use flowmesh::core::embeddings::Embeddings;
use flowmesh::core::error::{Error, Result};

use crate::schema::{batch_reader, rows_to_batch};

/// Open a connection to the database at `uri`.
///
/// The location may be a local path or any URI the driver understands
/// (`s3://`, `gs://`, ...). The driver may create on-disk structures when
/// the target does not exist yet. The returned handle is immediately usable
/// for table operations.
///
/// # Errors
///
/// Fails with a connection error on an empty URI or when the driver cannot
/// open the location. Never retried here.
pub async fn connect(uri: &str) -> Result<Connection> {
    if uri.trim().is_empty() {
        return Err(Error::connection("connection URI is empty"));
    }

    debug!(uri, "connecting to LanceDB");
    lancedb::connect(uri)
        .execute()
        .await
        .map_err(|e| Error::connection(format!("failed to open database at '{uri}': {e}")))
}

/// Open an existing table, failing when it is absent.
///
/// This is the read path of the "load existing index" flow: a missing table
/// is a hard failure, and nothing is created as a side effect.
///
/// # Errors
///
/// [`Error::CollectionNotFound`] when `table_name` is not in the database;
/// a connection error when listing or opening fails at the driver level.
pub async fn open_existing(conn: &Connection, table_name: &str) -> Result<Table> {
    let names = table_names(conn).await?;
    if !names.iter().any(|n| n == table_name) {
        return Err(Error::CollectionNotFound {
            name: table_name.to_string(),
        });
    }

    debug!(table = table_name, "opening existing table");
    conn.open_table(table_name)
        .execute()
        .await
        .map_err(|e| Error::connection(format!("failed to open table '{table_name}': {e}")))
}

/// Open `table_name`, creating it from `documents` when absent.
///
/// - Existing table: opened as-is (its stored schema wins; incompatible
///   future upserts are the driver's to reject), then the supplied
///   documents are embedded and appended. Repeated calls accumulate rows -
///   there is no de-duplication key in this flow.
/// - Missing table: created from the embedded documents, deriving the
///   vector dimensionality from the first embedding.
///
/// # Errors
///
/// [`Error::SchemaInference`] when the table must be created but
/// `documents` is empty - there is nothing to derive a schema from, and
/// returning a store with no backing table would only defer the failure.
pub async fn open_or_create(
    conn: &Connection,
    table_name: &str,
    documents: &[Document],
    embeddings: &Arc<dyn Embeddings>,
) -> Result<Table> {
    let names = table_names(conn).await?;

    if names.iter().any(|n| n == table_name) {
        let table = conn
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| Error::connection(format!("failed to open table '{table_name}': {e}")))?;

        if !documents.is_empty() {
            let batch = embed_documents(documents, embeddings).await?;
            debug!(
                table = table_name,
                rows = batch.num_rows(),
                "appending documents to existing table"
            );
            table
                .add(batch_reader(batch))
                .execute()
                .await
                .map_err(|e| {
                    Error::query(format!("failed to append to table '{table_name}': {e}"))
                })?;
        }
        return Ok(table);
    }

    if documents.is_empty() {
        return Err(Error::SchemaInference(format!(
            "cannot create table '{table_name}': no documents to derive a schema from"
        )));
    }

    let batch = embed_documents(documents, embeddings).await?;
    debug!(
        table = table_name,
        rows = batch.num_rows(),
        "creating table from documents"
    );
    conn.create_table(table_name, batch_reader(batch))
        .execute()
        .await
        .map_err(|e| Error::connection(format!("failed to create table '{table_name}': {e}")))
}

async fn table_names(conn: &Connection) -> Result<Vec<String>> {
    conn.table_names()
        .execute()
        .await
        .map_err(|e| Error::connection(format!("failed to list tables: {e}")))
}

/// Embed documents and lay them out as one record batch.
async fn embed_documents(
    documents: &[Document],
    embeddings: &Arc<dyn Embeddings>,
) -> Result<arrow_array::RecordBatch> {
    let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
    let vectors = embeddings.embed_documents(&texts).await?;

    let ids: Vec<String> = documents
        .iter()
        .map(|d| {
            d.id.clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string())
        })
        .collect();
    let metadatas: Vec<_> = documents.iter().map(|d| d.metadata.clone()).collect();

    rows_to_batch(&ids, &texts, &metadatas, &vectors)
}
