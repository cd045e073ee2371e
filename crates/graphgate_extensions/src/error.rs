//! Error types for extension resolution and invocation.

use thiserror::Error;

/// Errors returned by an extension method itself.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The request body or target was unsuitable for the method.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// The method failed while running.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The method failed in the storage engine.
    #[error("Graph error: {0}")]
    Graph(#[from] graphgate_graph::GraphError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ExtensionError {
    /// Creates a [`ParameterError`](Self::ParameterError).
    pub fn parameter_error(msg: impl Into<String>) -> Self {
        Self::ParameterError(msg.into())
    }

    /// Creates an [`ExecutionError`](Self::ExecutionError).
    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError(msg.into())
    }
}

/// Errors raised while parsing an extension path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No `/` separates a namespace from a method.
    #[error("extension path '{0}' must have the form namespace/method")]
    MissingSeparator(String),

    /// The namespace or the method segment is empty.
    #[error("extension path '{0}' has an empty namespace or method")]
    EmptySegment(String),

    /// A dotted part of the namespace is empty, as in `a..b`.
    #[error("extension namespace '{0}' contains an empty part")]
    EmptyNamespacePart(String),

    /// The namespace itself contains a `/`.
    #[error("extension namespace '{0}' must not contain '/'")]
    NestedNamespace(String),

    /// The namespace and the method are the same token.
    #[error("extension path '{0}' names the same token as namespace and method")]
    SameSegment(String),
}

/// Errors raised by [`invoke`](crate::invoke).
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The method returned an error.
    #[error("extension method failed: {0}")]
    Failed(#[source] ExtensionError),

    /// The method panicked.
    #[error("extension method panicked: {0}")]
    Panicked(String),

    /// The method returned something other than an extension response.
    #[error("extension method broke its response contract: {0}")]
    ContractViolation(String),
}
