//! Static node metadata consumed by the host's graph editor.
//!
//! A [`NodeDescriptor`] is pure data: constructed once per node type at
//! registration, never mutated during execution, and serialized to the host
//! so it can render and validate the node before any workflow runs. Every
//! parameter an execution reads must be declared here with the correct
//! semantic kind.

use serde::{Deserialize, Serialize};

/// Semantic kind of a declared node parameter.
///
/// The host uses this to validate wiring (an `Embeddings` socket only
/// accepts embedding providers) and to render the right editor widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// An embedding provider instance
    Embeddings,
    /// A list of documents (accepts multiple upstream connections)
    DocumentList,
    /// A plain string
    Text,
    /// A number, string-encoded by the editor
    Number,
}

/// A declared input parameter of a node.
///
/// Invariant: `name` is unique within a descriptor (checked by
/// [`NodeDescriptor::with_input`] in debug builds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Parameter name, the key under which the runtime value arrives
    pub name: String,
    /// Human-readable label shown in the editor
    pub label: String,
    /// Semantic kind for wiring validation
    pub kind: ParameterKind,
    /// Longer description shown as editor help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Placeholder / default value hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Whether the parameter may be omitted at execution time
    #[serde(default)]
    pub optional: bool,
    /// Whether the editor tucks this under "additional parameters"
    #[serde(default)]
    pub additional_params: bool,
}

impl ParameterSpec {
    /// Create a required parameter of the given kind.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            description: None,
            placeholder: None,
            optional: false,
            additional_params: false,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the placeholder value.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Mark the parameter optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Tuck the parameter under the editor's "additional parameters".
    #[must_use]
    pub fn additional(mut self) -> Self {
        self.additional_params = true;
        self
    }
}

/// A declared output socket of a node.
///
/// The capability set is enumerated statically at descriptor construction;
/// downstream sockets connect when they require a capability this output
/// provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Output socket name, matched against the execution's requested output
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Capability names this output satisfies
    pub capabilities: Vec<String>,
}

impl OutputSpec {
    /// Create an output socket with its capability set.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        capabilities: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            capabilities: capabilities.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Static metadata describing a node type.
///
/// Construction cannot fail; builders only accumulate data. The descriptor
/// is owned by the host registry once handed over and must not change
/// afterwards.
///
/// # Example
///
/// ```
/// use flowmesh::node::descriptor::{NodeDescriptor, ParameterKind, ParameterSpec};
///
/// let descriptor = NodeDescriptor::new("myIndex", "My Index")
///     .with_version(1)
///     .with_category("Vector Stores")
///     .with_input(ParameterSpec::new("tableName", "Table Name", ParameterKind::Text));
///
/// assert_eq!(descriptor.name, "myIndex");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    /// Unique identifier for this node type
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Node type version
    pub version: u32,
    /// Base type name shared by this node's outputs (e.g. `"LanceDB"`)
    pub node_type: String,
    /// Icon asset name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Category for grouping in the editor palette
    pub category: String,
    /// Human-readable description of what this node does
    pub description: String,
    /// Declared input parameters, in editor display order
    pub inputs: Vec<ParameterSpec>,
    /// Declared output sockets, in editor display order
    pub outputs: Vec<OutputSpec>,
}

impl NodeDescriptor {
    /// Create a descriptor with the given identity and label.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            version: 1,
            node_type: String::new(),
            icon: None,
            category: "general".to_string(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the base type name.
    #[must_use]
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Set the icon asset name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declare an input parameter.
    ///
    /// # Panics
    ///
    /// Debug builds panic when a parameter name is declared twice; the host
    /// keys runtime values by name, so duplicates would shadow each other.
    #[must_use]
    pub fn with_input(mut self, input: ParameterSpec) -> Self {
        debug_assert!(
            !self.inputs.iter().any(|p| p.name == input.name),
            "duplicate parameter name '{}' in descriptor '{}'",
            input.name,
            self.name
        );
        self.inputs.push(input);
        self
    }

    /// Declare an output socket.
    #[must_use]
    pub fn with_output(mut self, output: OutputSpec) -> Self {
        self.outputs.push(output);
        self
    }

    /// Look up a declared input by name.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&ParameterSpec> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Look up a declared output by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_descriptor() -> NodeDescriptor {
        NodeDescriptor::new("sampleIndex", "Sample Index")
            .with_version(2)
            .with_node_type("Sample")
            .with_category("Vector Stores")
            .with_description("Sample store node")
            .with_input(ParameterSpec::new(
                "embeddings",
                "Embeddings",
                ParameterKind::Embeddings,
            ))
            .with_input(
                ParameterSpec::new("topK", "Top K", ParameterKind::Number)
                    .optional()
                    .additional()
                    .with_placeholder("4"),
            )
            .with_output(OutputSpec::new(
                "retriever",
                "Sample Retriever",
                &["Sample", "BaseRetriever"],
            ))
    }

    #[test]
    fn builder_accumulates_fields() {
        let descriptor = sample_descriptor();

        assert_eq!(descriptor.version, 2);
        assert_eq!(descriptor.category, "Vector Stores");
        assert_eq!(descriptor.inputs.len(), 2);
        assert_eq!(descriptor.outputs.len(), 1);

        let top_k = descriptor.input("topK").unwrap();
        assert!(top_k.optional);
        assert!(top_k.additional_params);
        assert_eq!(top_k.placeholder.as_deref(), Some("4"));
        assert_eq!(top_k.kind, ParameterKind::Number);
    }

    #[test]
    fn parameter_names_are_unique() {
        let descriptor = sample_descriptor();
        let mut names: Vec<&str> = descriptor.inputs.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), descriptor.inputs.len());
    }

    #[test]
    #[should_panic(expected = "duplicate parameter name")]
    #[cfg(debug_assertions)]
    fn duplicate_parameter_panics_in_debug() {
        let _ = NodeDescriptor::new("dup", "Dup")
            .with_input(ParameterSpec::new("a", "A", ParameterKind::Text))
            .with_input(ParameterSpec::new("a", "A again", ParameterKind::Text));
    }

    #[test]
    fn serializes_camel_case_for_the_host() {
        let descriptor = sample_descriptor();
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["nodeType"], "Sample");
        assert_eq!(json["inputs"][1]["additionalParams"], true);
        assert_eq!(json["outputs"][0]["capabilities"][1], "BaseRetriever");
        // Unset icon is omitted entirely.
        assert!(json.get("icon").is_none());
    }

    #[test]
    fn output_lookup() {
        let descriptor = sample_descriptor();
        assert!(descriptor.output("retriever").is_some());
        assert!(descriptor.output("vectorStore").is_none());
    }
}
