//! # Flowmesh
//!
//! Core contracts for vector store nodes in a visual workflow platform.
//!
//! A workflow host renders nodes from their static descriptors, resolves
//! their wired inputs at run time, and invokes each node once per workflow
//! run. This crate defines the shared vocabulary those nodes are built
//! from:
//!
//! - [`core::documents`] - the [`Document`](core::documents::Document) unit
//!   of content
//! - [`core::embeddings`] - the text-to-vector capability
//! - [`core::vector_stores`] - persistent similarity-search stores
//! - [`core::retrievers`] - bound query views over stores
//! - [`node`] - the node contract: descriptors, runtime inputs, output
//!   selection
//!
//! Concrete database integrations live in sibling crates (e.g.
//! `flowmesh-lancedb`) and implement [`node::VectorStoreNode`] plus
//! [`core::vector_stores::VectorStore`].
//!
//! # Example
//!
//! Exercising the node contract with the in-memory reference store:
//!
//! ```
//! use std::sync::Arc;
//! use flowmesh::core::embeddings::MockEmbeddings;
//! use flowmesh::core::retrievers::Retriever;
//! use flowmesh::core::vector_stores::{InMemoryVectorStore, VectorStore};
//! use flowmesh::node::{NodeOutput, OUTPUT_RETRIEVER};
//!
//! # async fn example() -> flowmesh::core::Result<()> {
//! let store: Arc<dyn VectorStore> =
//!     Arc::new(InMemoryVectorStore::new(Arc::new(MockEmbeddings::new(8))));
//! store
//!     .add_texts(&["hello".to_string(), "world".to_string()], None, None)
//!     .await?;
//!
//! let output = NodeOutput::select(store, Some(OUTPUT_RETRIEVER), 1);
//! let docs = output
//!     .as_retriever()
//!     .unwrap()
//!     .get_relevant_documents("hello")
//!     .await?;
//! assert_eq!(docs.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod node;

pub use crate::core::error::{Error, Result};
pub use crate::core::{documents::Document, embeddings::Embeddings};
pub use crate::node::{NodeDescriptor, NodeOutput, RuntimeInputs, VectorStoreNode};
