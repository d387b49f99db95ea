//! Document types for Flowmesh
//!
//! This module provides the [`Document`] type, the unit of content that flows
//! between workflow nodes. Upstream loader/splitter nodes produce documents;
//! vector store nodes embed and persist them; retrievers hand them back to
//! downstream consumers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document with text content and metadata.
///
/// Each document contains:
/// - `page_content`: the text content (this is what gets embedded)
/// - `metadata`: optional metadata as key-value pairs, persisted alongside
///   the vector and returned with search results
/// - `id`: optional unique identifier
///
/// # Example
///
/// ```
/// use flowmesh::core::documents::Document;
///
/// let doc = Document::new("Hello, world!")
///     .with_metadata("source", "example.txt".to_string())
///     .with_metadata("page", 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The text content of the document
    pub page_content: String,

    /// Metadata associated with the document
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Optional unique identifier for the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Document {
    /// Create a new document with the given text content.
    ///
    /// # Example
    ///
    /// ```
    /// use flowmesh::core::documents::Document;
    ///
    /// let doc = Document::new("Hello, world!");
    /// assert_eq!(doc.page_content, "Hello, world!");
    /// ```
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
            id: None,
        }
    }

    /// Add metadata to the document (builder pattern).
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the document ID (builder pattern).
    ///
    /// # Example
    ///
    /// ```
    /// use flowmesh::core::documents::Document;
    ///
    /// let doc = Document::new("Hello").with_id("doc-123");
    /// assert_eq!(doc.id, Some("doc-123".to_string()));
    /// ```
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<&str> for Document {
    fn from(content: &str) -> Self {
        Document::new(content)
    }
}

impl From<String> for Document {
    fn from(content: String) -> Self {
        Document::new(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builders() {
        let doc = Document::new("content")
            .with_metadata("source", "test.md".to_string())
            .with_metadata("chunk", 3)
            .with_id("d-1");

        assert_eq!(doc.page_content, "content");
        assert_eq!(
            doc.metadata.get("source"),
            Some(&serde_json::json!("test.md"))
        );
        assert_eq!(doc.metadata.get("chunk"), Some(&serde_json::json!(3)));
        assert_eq!(doc.id.as_deref(), Some("d-1"));
    }

    #[test]
    fn document_serde_roundtrip() {
        let doc = Document::new("text").with_metadata("k", "v".to_string());
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn document_without_id_skips_field() {
        let doc = Document::new("text");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("\"id\""));
    }
}
