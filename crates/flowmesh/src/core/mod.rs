//! Core abstractions for Flowmesh
//!
//! This module provides the fundamental types and traits shared by every
//! vector store integration: documents, embeddings, vector stores, and
//! retrievers. The node-facing contract (descriptors, runtime inputs,
//! output selection) lives in [`crate::node`].
//!
//! # Module Overview
//!
//! - [`documents`] - the `Document` type exchanged between nodes
//! - [`embeddings`] - text embedding interfaces
//! - [`vector_stores`] - vector storage and similarity search
//! - [`retrievers`] - bound query interfaces over vector stores
//! - [`error`] - error types and handling

pub mod documents;
pub mod embeddings;
pub mod error;
pub mod retrievers;
pub mod vector_stores;

pub use error::{Error, Result};
