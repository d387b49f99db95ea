//! # LanceDB Vector Store for Flowmesh
//!
//! This crate provides the `LanceDB` integration for Flowmesh: a
//! [`VectorStore`](flowmesh::core::vector_stores::VectorStore)
//! implementation over a `LanceDB` table, plus the two workflow nodes the
//! host platform registers - [`LanceLoadExistingNode`] (read path) and
//! [`LanceUpsertNode`] (write path).
//!
//! ## Features
//!
//! - Embedded database: tables live at a filesystem path, no server needed
//! - Support for local storage and cloud URIs (S3, GCS) via the driver
//! - Explicit connection handles - no process-wide driver state
//!
//! ## Example
//!
//! **Note**: the example uses mock embeddings for demonstration. In a
//! workflow the host wires a real provider node into the `embeddings`
//! input.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use flowmesh::core::documents::Document;
//! use flowmesh::core::embeddings::MockEmbeddings;
//! use flowmesh::core::retrievers::Retriever;
//! use flowmesh::node::{RuntimeInputs, VectorStoreNode, OUTPUT_RETRIEVER};
//! use flowmesh_lancedb::LanceUpsertNode;
//!
//! # async fn example() -> flowmesh::core::Result<()> {
//! let node = LanceUpsertNode::new();
//!
//! let inputs = RuntimeInputs::new()
//!     .with_documents("document", vec![Document::new("Hello world")])
//!     .with_embeddings("embeddings", Arc::new(MockEmbeddings::new(384)))
//!     .with_text("uriPath", "data/lancedb")
//!     .with_text("tableName", "documents")
//!     .with_text("topK", "2")
//!     .with_output(OUTPUT_RETRIEVER);
//!
//! let output = node.execute(&inputs).await?;
//! let retriever = output.as_retriever().unwrap();
//! let results = retriever.get_relevant_documents("greeting").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`VectorStore`](flowmesh::core::vector_stores::VectorStore) - the trait
//!   [`LanceDbVectorStore`] implements
//! - [`VectorStoreNode`](flowmesh::node::VectorStoreNode) - the node
//!   contract both nodes implement
//! - [LanceDB Documentation](https://lancedb.github.io/lancedb/) - official
//!   LanceDB docs

pub mod connection;
mod lancedb_store;
mod nodes;
mod schema;

pub use lancedb_store::LanceDbVectorStore;
pub use nodes::{LanceLoadExistingNode, LanceUpsertNode};
