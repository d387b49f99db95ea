//! Runtime values supplied by the host at node execution time.
//!
//! The host resolves every wired parameter before invoking a node: embedding
//! providers become live instances, upstream document outputs become batches,
//! editor fields become strings. [`RuntimeInputs`] is that resolved bundle.
//! This component does not own the values; it only reads them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::documents::Document;
use crate::core::embeddings::Embeddings;
use crate::core::error::{Error, Result};
use crate::core::retrievers::DEFAULT_TOP_K;

/// Conventional name of the top-K parameter.
pub const TOP_K_PARAM: &str = "topK";

/// A resolved runtime value for one declared parameter.
#[derive(Clone)]
pub enum RuntimeValue {
    /// A live embedding provider
    Embeddings(Arc<dyn Embeddings>),
    /// Document batches, one per upstream connection wired into a list input
    Documents(Vec<Vec<Document>>),
    /// A plain string (also used for string-encoded numbers)
    Text(String),
    /// A number resolved by the host
    Number(f64),
}

impl fmt::Debug for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Embeddings(_) => f.write_str("Embeddings(..)"),
            RuntimeValue::Documents(batches) => {
                write!(f, "Documents({} batches)", batches.len())
            }
            RuntimeValue::Text(s) => write!(f, "Text({s:?})"),
            RuntimeValue::Number(n) => write!(f, "Number({n})"),
        }
    }
}

impl RuntimeValue {
    fn kind_name(&self) -> &'static str {
        match self {
            RuntimeValue::Embeddings(_) => "embeddings",
            RuntimeValue::Documents(_) => "document list",
            RuntimeValue::Text(_) => "string",
            RuntimeValue::Number(_) => "number",
        }
    }
}

/// The resolved parameter values for one node execution.
///
/// Produced by the host, consumed once, then discarded along with the
/// execution. `output` names the output socket the workflow wired up; when
/// unset the node returns its default (the raw store).
#[derive(Debug, Clone, Default)]
pub struct RuntimeInputs {
    values: HashMap<String, RuntimeValue>,
    output: Option<String>,
}

impl RuntimeInputs {
    /// Create an empty input bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a resolved value (builder pattern, host-side).
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: RuntimeValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Attach a plain string value.
    #[must_use]
    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_value(name, RuntimeValue::Text(value.into()))
    }

    /// Attach an embedding provider.
    #[must_use]
    pub fn with_embeddings(
        self,
        name: impl Into<String>,
        embeddings: Arc<dyn Embeddings>,
    ) -> Self {
        self.with_value(name, RuntimeValue::Embeddings(embeddings))
    }

    /// Attach one batch of documents to a list input.
    ///
    /// Repeated calls model multiple upstream connections; the batches are
    /// flattened by [`RuntimeInputs::documents`].
    #[must_use]
    pub fn with_documents(mut self, name: impl Into<String>, batch: Vec<Document>) -> Self {
        let name = name.into();
        match self.values.get_mut(&name) {
            Some(RuntimeValue::Documents(batches)) => batches.push(batch),
            _ => {
                self.values
                    .insert(name, RuntimeValue::Documents(vec![batch]));
            }
        }
        self
    }

    /// Set the requested output socket name.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Raw access to a resolved value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuntimeValue> {
        self.values.get(name)
    }

    /// The requested output socket, if any.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// A required string parameter.
    ///
    /// # Errors
    ///
    /// Fails when the parameter is absent or resolved to a different kind.
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            Some(RuntimeValue::Text(s)) => Ok(s),
            Some(other) => Err(Error::invalid_input(format!(
                "parameter '{name}' expected a string, got {}",
                other.kind_name()
            ))),
            None => Err(Error::invalid_input(format!(
                "missing required parameter '{name}'"
            ))),
        }
    }

    /// An optional string parameter.
    #[must_use]
    pub fn optional_text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(RuntimeValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// A required embedding provider.
    ///
    /// # Errors
    ///
    /// Fails when the parameter is absent or resolved to a different kind.
    pub fn embeddings(&self, name: &str) -> Result<Arc<dyn Embeddings>> {
        match self.values.get(name) {
            Some(RuntimeValue::Embeddings(e)) => Ok(Arc::clone(e)),
            Some(other) => Err(Error::invalid_input(format!(
                "parameter '{name}' expected embeddings, got {}",
                other.kind_name()
            ))),
            None => Err(Error::invalid_input(format!(
                "missing required parameter '{name}'"
            ))),
        }
    }

    /// All documents wired into a list input, flattened across batches.
    ///
    /// An absent parameter yields an empty list; upstream nodes are allowed
    /// to contribute nothing.
    ///
    /// # Errors
    ///
    /// Fails when the parameter resolved to a non-document kind.
    pub fn documents(&self, name: &str) -> Result<Vec<Document>> {
        match self.values.get(name) {
            Some(RuntimeValue::Documents(batches)) => {
                let docs: Vec<Document> = batches.iter().flatten().cloned().collect();
                debug!(
                    parameter = name,
                    batches = batches.len(),
                    documents = docs.len(),
                    "flattened document input"
                );
                Ok(docs)
            }
            Some(other) => Err(Error::invalid_input(format!(
                "parameter '{name}' expected a document list, got {}",
                other.kind_name()
            ))),
            None => Ok(Vec::new()),
        }
    }

    /// The requested result count, parsed forgivingly.
    ///
    /// The editor encodes numbers as strings; unparsable, non-finite, or
    /// non-positive values fall back to [`DEFAULT_TOP_K`] instead of failing
    /// the node. This is the one place a bad value is tolerated.
    #[must_use]
    pub fn top_k(&self) -> usize {
        let raw = match self.values.get(TOP_K_PARAM) {
            Some(RuntimeValue::Text(s)) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
            Some(RuntimeValue::Number(n)) => Some(*n),
            Some(RuntimeValue::Text(_)) | None => return DEFAULT_TOP_K,
            Some(_) => None,
        };

        match raw {
            Some(n) if n.is_finite() && n >= 1.0 => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let k = n.floor() as usize;
                k
            }
            _ => {
                warn!(
                    parameter = TOP_K_PARAM,
                    default = DEFAULT_TOP_K,
                    "unparsable top-K value, falling back to default"
                );
                DEFAULT_TOP_K
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embeddings::MockEmbeddings;

    #[test]
    fn top_k_parses_numeric_strings() {
        let inputs = RuntimeInputs::new().with_text(TOP_K_PARAM, "7");
        assert_eq!(inputs.top_k(), 7);

        let inputs = RuntimeInputs::new().with_text(TOP_K_PARAM, "2.9");
        assert_eq!(inputs.top_k(), 2);
    }

    #[test]
    fn top_k_falls_back_on_garbage() {
        let inputs = RuntimeInputs::new().with_text(TOP_K_PARAM, "not-a-number");
        assert_eq!(inputs.top_k(), DEFAULT_TOP_K);

        let inputs = RuntimeInputs::new().with_text(TOP_K_PARAM, "-3");
        assert_eq!(inputs.top_k(), DEFAULT_TOP_K);

        let inputs = RuntimeInputs::new().with_text(TOP_K_PARAM, "NaN");
        assert_eq!(inputs.top_k(), DEFAULT_TOP_K);
    }

    #[test]
    fn top_k_defaults_when_absent_or_blank() {
        assert_eq!(RuntimeInputs::new().top_k(), DEFAULT_TOP_K);

        let inputs = RuntimeInputs::new().with_text(TOP_K_PARAM, "  ");
        assert_eq!(inputs.top_k(), DEFAULT_TOP_K);
    }

    #[test]
    fn top_k_accepts_host_numbers() {
        let inputs =
            RuntimeInputs::new().with_value(TOP_K_PARAM, RuntimeValue::Number(5.0));
        assert_eq!(inputs.top_k(), 5);
    }

    #[test]
    fn text_accessor_distinguishes_missing_and_wrong_kind() {
        let inputs = RuntimeInputs::new().with_value("n", RuntimeValue::Number(1.0));

        let missing = inputs.text("absent").unwrap_err();
        assert!(missing.to_string().contains("missing required parameter"));

        let wrong = inputs.text("n").unwrap_err();
        assert!(wrong.to_string().contains("expected a string"));
    }

    #[test]
    fn documents_flatten_across_batches() {
        let inputs = RuntimeInputs::new()
            .with_documents("document", vec![Document::new("a"), Document::new("b")])
            .with_documents("document", vec![Document::new("c")]);

        let docs = inputs.documents("document").unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2].page_content, "c");
    }

    #[test]
    fn documents_default_to_empty() {
        let docs = RuntimeInputs::new().documents("document").unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn embeddings_accessor_returns_shared_instance() {
        let provider = Arc::new(MockEmbeddings::new(4));
        let inputs = RuntimeInputs::new().with_embeddings("embeddings", provider);

        assert!(inputs.embeddings("embeddings").is_ok());
        assert!(inputs.embeddings("other").is_err());
    }

    #[test]
    fn output_socket_roundtrip() {
        let inputs = RuntimeInputs::new().with_output("retriever");
        assert_eq!(inputs.output(), Some("retriever"));
        assert_eq!(RuntimeInputs::new().output(), None);
    }
}
