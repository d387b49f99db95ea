//! The vector store node contract.
//!
//! Every vector store integration exposes the same uniform surface to the
//! workflow host: a static [`NodeDescriptor`] consumed by the graph editor,
//! and an asynchronous [`VectorStoreNode::execute`] entry point invoked once
//! per workflow run with resolved [`RuntimeInputs`]. An execution is a linear
//! sequence - connect, resolve the collection, wrap it in a store, select
//! the output - with no internal parallelism, retry, or caching.
//!
//! # Output selection
//!
//! A node has two output sockets. `retriever` yields a [`Retriever`] bound
//! to a fixed result count; `vectorStore` (and any absent or unrecognized
//! selection) yields the raw store, annotated with the requested count for
//! downstream consumers that read it directly. Selection is total: it never
//! fails.

pub mod descriptor;
pub mod inputs;

pub use descriptor::{NodeDescriptor, OutputSpec, ParameterKind, ParameterSpec};
pub use inputs::{RuntimeInputs, RuntimeValue, TOP_K_PARAM};

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::retrievers::{Retriever, VectorStoreRetriever};
use crate::core::vector_stores::VectorStore;

/// Output socket name yielding a bound retriever.
pub const OUTPUT_RETRIEVER: &str = "retriever";

/// Output socket name yielding the raw vector store.
pub const OUTPUT_VECTOR_STORE: &str = "vectorStore";

/// A resolved store annotated with the requested result count.
///
/// Downstream nodes that consume the raw store still need to know the
/// configured top-K; carrying it in a typed wrapper avoids smuggling it
/// through fields the store type never declared.
#[derive(Clone)]
pub struct AnnotatedStore {
    /// The shared store handle
    pub store: Arc<dyn VectorStore>,
    /// Requested result count for consumers that query the store directly
    pub k: usize,
}

/// What a vector store node execution hands back to the host.
///
/// Exactly one variant per execution, chosen by the requested output socket.
#[derive(Clone)]
pub enum NodeOutput {
    /// A retriever bound to a fixed result count
    Retriever(Arc<dyn Retriever>),
    /// The raw store, annotated with the requested result count
    Store(AnnotatedStore),
}

impl NodeOutput {
    /// Select the output for `output_kind` over a resolved store.
    ///
    /// Total over its input domain: `"retriever"` binds a
    /// [`VectorStoreRetriever`] to `k`; `"vectorStore"`, any other value,
    /// and `None` all return the annotated raw store.
    #[must_use]
    pub fn select(store: Arc<dyn VectorStore>, output_kind: Option<&str>, k: usize) -> Self {
        match output_kind {
            Some(OUTPUT_RETRIEVER) => {
                NodeOutput::Retriever(Arc::new(VectorStoreRetriever::new(store, k)))
            }
            _ => NodeOutput::Store(AnnotatedStore { store, k }),
        }
    }

    /// The retriever, when this execution produced one.
    #[must_use]
    pub fn as_retriever(&self) -> Option<&Arc<dyn Retriever>> {
        match self {
            NodeOutput::Retriever(r) => Some(r),
            NodeOutput::Store(_) => None,
        }
    }

    /// The annotated store, when this execution produced one.
    #[must_use]
    pub fn as_store(&self) -> Option<&AnnotatedStore> {
        match self {
            NodeOutput::Store(s) => Some(s),
            NodeOutput::Retriever(_) => None,
        }
    }
}

/// A plugin node that resolves a vector store and exposes it to a workflow.
///
/// Implementations connect to their database, open or create the backing
/// collection, wrap it in a [`VectorStore`], and select the requested
/// output. All state lives for one execution; handles are not pooled or
/// reused across runs.
#[async_trait]
pub trait VectorStoreNode: Send + Sync {
    /// Static metadata consumed by the host before any execution.
    fn descriptor(&self) -> &NodeDescriptor;

    /// Run the node once with resolved inputs.
    ///
    /// # Errors
    ///
    /// Every failure (connection, missing collection, schema inference,
    /// query) is surfaced to the host as-is; there is no local recovery.
    async fn execute(&self, inputs: &RuntimeInputs) -> Result<NodeOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embeddings::MockEmbeddings;
    use crate::core::retrievers::DEFAULT_TOP_K;
    use crate::core::vector_stores::InMemoryVectorStore;

    fn empty_store() -> Arc<dyn VectorStore> {
        Arc::new(InMemoryVectorStore::new(Arc::new(MockEmbeddings::new(4))))
    }

    #[test]
    fn select_retriever_binds_k() {
        let output = NodeOutput::select(empty_store(), Some(OUTPUT_RETRIEVER), 7);
        let retriever = output.as_retriever().unwrap();
        assert_eq!(retriever.name(), "VectorStoreRetriever");
        assert!(output.as_store().is_none());
    }

    #[test]
    fn select_vector_store_annotates_k() {
        let output = NodeOutput::select(empty_store(), Some(OUTPUT_VECTOR_STORE), 9);
        let annotated = output.as_store().unwrap();
        assert_eq!(annotated.k, 9);
    }

    #[test]
    fn select_defaults_to_store() {
        for kind in [None, Some("somethingElse")] {
            let output = NodeOutput::select(empty_store(), kind, DEFAULT_TOP_K);
            assert!(output.as_store().is_some(), "kind {kind:?}");
        }
    }

    #[tokio::test]
    async fn selected_retriever_respects_k() {
        let store = empty_store();
        let texts: Vec<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();
        store.add_texts(&texts, None, None).await.unwrap();

        let output = NodeOutput::select(store, Some(OUTPUT_RETRIEVER), 2);
        let docs = output
            .as_retriever()
            .unwrap()
            .get_relevant_documents("a")
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
    }
}
