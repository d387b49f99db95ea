//! Error types for Flowmesh operations
//!
//! Every failure inside a node execution surfaces to the host as one of the
//! variants below - there is no local recovery, no silent fallback store, and
//! no retry. Use [`Error::category()`] to classify a failure when deciding
//! whether to halt or branch a workflow:
//!
//! - [`ErrorCategory::Connection`] - the database location could not be
//!   reached or opened. Environmental; check the connection URI.
//! - [`ErrorCategory::NotFound`] - a read-path node referenced a table that
//!   does not exist. Upsert first, or fix the table name.
//! - [`ErrorCategory::Validation`] - bad runtime inputs (missing parameter,
//!   wrong kind, length mismatch, nothing to infer a schema from).
//! - [`ErrorCategory::Query`] - the similarity search itself failed, e.g. a
//!   dimensionality mismatch rejected by the database.
//!
//! The single deliberate exception to fail-fast is top-K parsing, which
//! falls back to its default instead of failing the node (see
//! [`crate::node::RuntimeInputs::top_k`]).

use thiserror::Error;

/// Result type alias for Flowmesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error category for systematic error handling and reporting
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Database location unreachable or unopenable
    Connection,

    /// A referenced table/collection does not exist
    NotFound,

    /// Invalid input or configuration (expected errors from bad user input)
    Validation,

    /// Similarity search / driver-level query failures
    Query,

    /// Other/unknown errors
    Unknown,
}

impl ErrorCategory {
    /// Get human-readable description of error category
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Connection => "Connection Issue",
            ErrorCategory::NotFound => "Missing Collection",
            ErrorCategory::Validation => "Validation Error",
            ErrorCategory::Query => "Query Failure",
            ErrorCategory::Unknown => "Unknown Error",
        }
    }

    /// Check if this is an environmental issue (not a bug in the workflow)
    #[must_use]
    pub fn is_environmental(&self) -> bool {
        matches!(self, ErrorCategory::Connection | ErrorCategory::Query)
    }
}

/// Errors surfaced by vector store nodes and the stores they wrap.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// Cannot reach or open the database location.
    ///
    /// Not retried by this crate; surface to the host. The connection URI
    /// may be empty, malformed, or point at an unwritable location.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Read path referenced a table that is absent from the database.
    ///
    /// Loading an existing index never creates the table as a side effect.
    #[error("Collection '{name}' not found")]
    CollectionNotFound {
        /// The table/collection name that was requested.
        name: String,
    },

    /// Write path must create a table but has no documents to derive the
    /// schema (embedding dimensionality, metadata shape) from.
    #[error("Schema inference error: {0}")]
    SchemaInference(String),

    /// Similarity search failed downstream (driver-level rejection, e.g.
    /// query vector dimensionality mismatch).
    #[error("Query error: {0}")]
    Query(String),

    /// Input validation error (missing runtime parameter, wrong value kind,
    /// metadata/id length mismatch).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation not supported by this store.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Error::Connection(msg.into())
    }

    /// Create a query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        Error::Query(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Classify this error for reporting and host-side branching.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Connection(_) => ErrorCategory::Connection,
            Error::CollectionNotFound { .. } => ErrorCategory::NotFound,
            Error::SchemaInference(_) | Error::InvalidInput(_) | Error::Configuration(_) => {
                ErrorCategory::Validation
            }
            Error::Query(_) => ErrorCategory::Query,
            Error::Serialization(_) | Error::Io(_) | Error::NotImplemented(_) => {
                ErrorCategory::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_classification() {
        assert_eq!(
            Error::connection("refused").category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            Error::CollectionNotFound {
                name: "docs".into()
            }
            .category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            Error::SchemaInference("no documents".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(Error::query("dim mismatch").category(), ErrorCategory::Query);
    }

    #[test]
    fn collection_not_found_names_the_table() {
        let err = Error::CollectionNotFound {
            name: "sightings".into(),
        };
        assert_eq!(err.to_string(), "Collection 'sightings' not found");
    }

    #[test]
    fn environmental_categories() {
        assert!(ErrorCategory::Connection.is_environmental());
        assert!(ErrorCategory::Query.is_environmental());
        assert!(!ErrorCategory::Validation.is_environmental());
    }
}
