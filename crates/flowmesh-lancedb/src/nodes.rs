//! The LanceDB workflow nodes.
//!
//! Two thin nodes over the same resolution pipeline: connect to the
//! database, resolve the table (open-only for the load node, open-or-create
//! for the upsert node), wrap it in a [`LanceDbVectorStore`], and select the
//! requested output. Parameter and output socket names are host-facing
//! contract strings and must not change between versions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use flowmesh::core::error::Result;
use flowmesh::core::vector_stores::VectorStore;
use flowmesh::node::{
    NodeDescriptor, NodeOutput, OutputSpec, ParameterKind, ParameterSpec, RuntimeInputs,
    VectorStoreNode,
};

use crate::connection;
use crate::lancedb_store::LanceDbVectorStore;

/// Base type name shared by both nodes' outputs.
const NODE_TYPE: &str = "LanceDB";

/// Capabilities of the `retriever` output socket.
const RETRIEVER_CAPABILITIES: &[&str] = &[NODE_TYPE, "VectorStoreRetriever", "BaseRetriever"];

/// Capabilities of the `vectorStore` output socket: the generic store
/// surface plus retrieve-by-query.
const VECTOR_STORE_CAPABILITIES: &[&str] = &[NODE_TYPE, "VectorStore", "BaseRetriever"];

fn embeddings_param() -> ParameterSpec {
    ParameterSpec::new("embeddings", "Embeddings", ParameterKind::Embeddings)
}

fn uri_path_param() -> ParameterSpec {
    ParameterSpec::new("uriPath", "Connection URI", ParameterKind::Text)
        .with_description("Path to connect to LanceDB")
        .with_placeholder("/data/lancedb")
}

fn table_name_param() -> ParameterSpec {
    ParameterSpec::new("tableName", "Table Name", ParameterKind::Text)
        .with_description("Name of the table to store the index")
}

fn top_k_param() -> ParameterSpec {
    ParameterSpec::new("topK", "Top K", ParameterKind::Number)
        .with_description("Number of top results to fetch. Default to 4")
        .with_placeholder("4")
        .optional()
        .additional()
}

fn output_sockets(descriptor: NodeDescriptor) -> NodeDescriptor {
    descriptor
        .with_output(OutputSpec::new(
            "retriever",
            "LanceDB Retriever",
            RETRIEVER_CAPABILITIES,
        ))
        .with_output(OutputSpec::new(
            "vectorStore",
            "LanceDB Vector Store",
            VECTOR_STORE_CAPABILITIES,
        ))
}

/// Load an existing index from a LanceDB table.
///
/// The read path: the table must already exist (i.e. documents have been
/// upserted before); a missing table is a hard failure and is never created
/// as a side effect.
pub struct LanceLoadExistingNode {
    descriptor: NodeDescriptor,
}

impl LanceLoadExistingNode {
    /// Build the node with its static descriptor.
    #[must_use]
    pub fn new() -> Self {
        let descriptor = output_sockets(
            NodeDescriptor::new("lanceExistingIndex", "LanceDB Load Existing Index")
                .with_version(1)
                .with_node_type(NODE_TYPE)
                .with_icon("lance.svg")
                .with_category("Vector Stores")
                .with_description(
                    "Load existing index from LanceDB (i.e: Document has been upserted)",
                )
                .with_input(embeddings_param())
                .with_input(uri_path_param())
                .with_input(table_name_param())
                .with_input(top_k_param()),
        );
        Self { descriptor }
    }
}

impl Default for LanceLoadExistingNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStoreNode for LanceLoadExistingNode {
    fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, inputs: &RuntimeInputs) -> Result<NodeOutput> {
        let embeddings = inputs.embeddings("embeddings")?;
        let uri_path = inputs.text("uriPath")?;
        let table_name = inputs.text("tableName")?;
        let k = inputs.top_k();

        let conn = connection::connect(uri_path).await?;
        let table = connection::open_existing(&conn, table_name).await?;
        let store: Arc<dyn VectorStore> = Arc::new(LanceDbVectorStore::new(table, embeddings));

        Ok(NodeOutput::select(store, inputs.output(), k))
    }
}

/// Upsert documents into a LanceDB table.
///
/// The write path: embeds every supplied document and persists it. The
/// table is created on first use, deriving its schema from the embedded
/// documents; subsequent upserts accumulate rows (there is no
/// de-duplication key in this flow).
pub struct LanceUpsertNode {
    descriptor: NodeDescriptor,
}

impl LanceUpsertNode {
    /// Build the node with its static descriptor.
    #[must_use]
    pub fn new() -> Self {
        let descriptor = output_sockets(
            NodeDescriptor::new("lanceUpsert", "LanceDB Upsert Document")
                .with_version(1)
                .with_node_type(NODE_TYPE)
                .with_icon("lance.svg")
                .with_category("Vector Stores")
                .with_description("Upsert documents to LanceDB")
                .with_input(ParameterSpec::new(
                    "document",
                    "Document",
                    ParameterKind::DocumentList,
                ))
                .with_input(embeddings_param())
                .with_input(uri_path_param())
                .with_input(table_name_param())
                .with_input(top_k_param()),
        );
        Self { descriptor }
    }
}

impl Default for LanceUpsertNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStoreNode for LanceUpsertNode {
    fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, inputs: &RuntimeInputs) -> Result<NodeOutput> {
        let documents = inputs.documents("document")?;
        let embeddings = inputs.embeddings("embeddings")?;
        let uri_path = inputs.text("uriPath")?;
        let table_name = inputs.text("tableName")?;
        let k = inputs.top_k();

        debug!(documents = documents.len(), table = table_name, "upserting");

        let conn = connection::connect(uri_path).await?;
        let store =
            LanceDbVectorStore::from_documents(&conn, table_name, &documents, embeddings).await?;
        let store: Arc<dyn VectorStore> = Arc::new(store);

        Ok(NodeOutput::select(store, inputs.output(), k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowmesh::core::error::Error;

    #[test]
    fn load_existing_descriptor_shape() {
        let node = LanceLoadExistingNode::new();
        let descriptor = node.descriptor();

        assert_eq!(descriptor.name, "lanceExistingIndex");
        assert_eq!(descriptor.version, 1);
        assert_eq!(descriptor.category, "Vector Stores");
        assert_eq!(descriptor.node_type, "LanceDB");

        let names: Vec<&str> = descriptor.inputs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["embeddings", "uriPath", "tableName", "topK"]);

        let top_k = descriptor.input("topK").unwrap();
        assert!(top_k.optional);
        assert_eq!(top_k.kind, ParameterKind::Number);
    }

    #[test]
    fn upsert_descriptor_declares_document_list() {
        let node = LanceUpsertNode::new();
        let descriptor = node.descriptor();

        assert_eq!(descriptor.name, "lanceUpsert");
        let document = descriptor.input("document").unwrap();
        assert_eq!(document.kind, ParameterKind::DocumentList);
        assert!(!document.optional);
    }

    #[test]
    fn output_sockets_enumerate_capabilities() {
        let node = LanceLoadExistingNode::new();
        let descriptor = node.descriptor();

        let retriever = descriptor.output("retriever").unwrap();
        assert!(retriever
            .capabilities
            .iter()
            .any(|c| c == "BaseRetriever"));

        let vector_store = descriptor.output("vectorStore").unwrap();
        assert!(vector_store.capabilities.iter().any(|c| c == "VectorStore"));
        assert!(vector_store
            .capabilities
            .iter()
            .any(|c| c == "BaseRetriever"));
    }

    #[tokio::test]
    async fn execute_requires_declared_parameters() {
        let node = LanceLoadExistingNode::new();
        let result = node.execute(&RuntimeInputs::new()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn descriptors_serialize_for_the_host() {
        let node = LanceUpsertNode::new();
        let json = serde_json::to_value(node.descriptor()).unwrap();
        assert_eq!(json["name"], "lanceUpsert");
        assert_eq!(json["inputs"][0]["name"], "document");
        assert_eq!(json["outputs"][1]["name"], "vectorStore");
    }
}
