use snafu::Snafu;

#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Error deserializing configuration: {}", source))]
    ConfigDeserialization { source: serde_json::Error },

    #[snafu(display("Error serializing configuration: {}", source))]
    ConfigSerialization { source: serde_json::Error },

    #[snafu(display(
        "Error serializing configuration: expected Value::Object type but got something else."
    ))]
    ConfigWrongValueType {},

    #[snafu(display(
        "A dependency cycle was found involving these nodes: {}",
        nodes.join(", ")
    ))]
    DependencyCycle { nodes: Vec<String> },

    #[snafu(display("The node name '{}' was declared more than once in this run", name))]
    DuplicateNode { name: String },

    #[snafu(display("Handle '{}' of node '{}' has not been produced", handle, node))]
    HandleMissing { node: String, handle: String },

    #[snafu(display("Handle '{}' of node '{}' is not available yet", handle, node))]
    HandlePending { node: String, handle: String },

    #[snafu(display("Invalid node name '{}': {}", name, reason))]
    InvalidNodeName { name: String, reason: String },

    #[snafu(display("Parse error: {}", source))]
    SerdePlain { source: serde_plain::Error },

    #[snafu(display("Node '{}' depends on undeclared node '{}'", name, dependency))]
    UnknownDependency { name: String, dependency: String },
}

impl Error {
    /// Whether the caller may retry the operation that produced this error after waiting for the
    /// external engine to report more progress. Only a pending handle is retryable; everything
    /// else in this taxonomy is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self.0, OpaqueError::HandlePending { .. })
    }
}
