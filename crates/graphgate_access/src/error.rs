//! Access-layer error kinds and their external mapping.

use graphgate_extensions::{ExtensionResponse, InvocationError, PathError};
use graphgate_graph::{ElementId, ElementKind, GraphError};
use thiserror::Error;

use crate::request::{EntityKind, Operation};

/// Everything a request can fail with.
///
/// Each kind maps to an HTTP-equivalent [`status`](Self::status) and a log
/// severity (see [`report`](Self::report)).
#[derive(Debug, Error)]
pub enum AccessError {
    /// No graph is configured under the requested name.
    #[error("graph [{0}] could not be found")]
    GraphNotFound(String),

    /// The addressed vertex or edge does not exist.
    #[error("{kind} with id [{id}] cannot be found")]
    NotFound {
        /// Kind of the missing element.
        kind: ElementKind,
        /// Requested id.
        id: ElementId,
    },

    /// A create targeted an existing id with a non-empty payload.
    #[error("{kind} with id [{id}] already exists")]
    Conflict {
        /// Kind of the existing element.
        kind: ElementKind,
        /// Conflicting id.
        id: ElementId,
    },

    /// The extension path could not be parsed.
    #[error(transparent)]
    MalformedPath(#[from] PathError),

    /// The graph's allow-list rejects the namespace.
    ///
    /// Renders exactly like [`ExtensionNotFound`](Self::ExtensionNotFound).
    #[error("extension [{0}] cannot be found")]
    NamespaceDenied(String),

    /// No extension or method is bound for the path and access point.
    #[error("extension [{0}] cannot be found")]
    ExtensionNotFound(String),

    /// The extension returned something other than an extension response.
    #[error("extension returned an invalid response: {0}")]
    ExtensionContractViolation(String),

    /// The extension raised an error or panicked.
    #[error("extension failed: {0}")]
    ExtensionFailure(String),

    /// The extension returned an error status; forwarded verbatim.
    #[error("extension responded with status {}", .0.status)]
    ExtensionErrorResponse(ExtensionResponse),

    /// The response could not be assembled.
    #[error("response could not be serialized: {0}")]
    SerializationFailure(#[from] serde_json::Error),

    /// The storage engine failed unexpectedly.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// The request could not be decoded.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The window end lies before its start.
    #[error("window end {end} is smaller than start {start}")]
    InvalidWindow {
        /// Requested start offset.
        start: u64,
        /// Requested end offset.
        end: u64,
    },

    /// A property value is not a JSON scalar.
    #[error("property [{key}] is invalid: {reason}")]
    InvalidProperty {
        /// Offending key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A required request field is absent or empty.
    #[error("required field [{0}] is missing")]
    MissingField(&'static str),

    /// The operation is not defined for the entity kind.
    #[error("operation {operation} is not supported on {kind}")]
    UnsupportedOperation {
        /// Requested entity kind.
        kind: EntityKind,
        /// Requested operation.
        operation: Operation,
    },
}

impl AccessError {
    /// Creates a [`NotFound`](Self::NotFound) error.
    pub fn not_found(kind: ElementKind, id: &ElementId) -> Self {
        Self::NotFound {
            kind,
            id: id.clone(),
        }
    }

    /// Creates an [`InvalidProperty`](Self::InvalidProperty) error.
    pub fn invalid_property(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP-equivalent status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::GraphNotFound(_)
            | Self::NotFound { .. }
            | Self::NamespaceDenied(_)
            | Self::ExtensionNotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::MalformedPath(_)
            | Self::MalformedRequest(_)
            | Self::InvalidWindow { .. }
            | Self::InvalidProperty { .. }
            | Self::MissingField(_)
            | Self::UnsupportedOperation { .. } => 400,
            Self::ExtensionErrorResponse(response) => response.status,
            Self::ExtensionContractViolation(_)
            | Self::ExtensionFailure(_)
            | Self::SerializationFailure(_)
            | Self::StorageFailure(_) => 500,
        }
    }

    /// Returns the message shown to the caller.
    ///
    /// Server-side failures get a generic message; their detail goes to
    /// [`detail`](Self::detail).
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::ExtensionContractViolation(_) | Self::ExtensionFailure(_) => {
                "An error occurred within the extension".to_owned()
            }
            Self::SerializationFailure(_) => "An error occurred while generating the response object".to_owned(),
            Self::StorageFailure(_) => "An error occurred in the graph storage".to_owned(),
            other => other.to_string(),
        }
    }

    /// Returns the originating failure's detail, when there is one.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::ExtensionContractViolation(detail)
            | Self::ExtensionFailure(detail)
            | Self::StorageFailure(detail) => Some(detail.clone()),
            Self::SerializationFailure(error) => Some(error.to_string()),
            _ => None,
        }
    }

    /// Logs the error at the severity its kind calls for.
    pub fn report(&self) {
        let status = self.status();
        match self {
            Self::StorageFailure(_)
            | Self::SerializationFailure(_)
            | Self::ExtensionFailure(_)
            | Self::ExtensionContractViolation(_) => {
                tracing::error!(status, error = %self, "request failed");
            }
            Self::NotFound { .. } | Self::GraphNotFound(_) | Self::ExtensionNotFound(_) => {
                tracing::info!(status, error = %self, "requested resource not found");
            }
            Self::NamespaceDenied(path) => {
                tracing::warn!(status, %path, "extension namespace denied by allow-list");
            }
            Self::ExtensionErrorResponse(_) => {
                tracing::warn!(status, "extension returned an error response");
            }
            _ => tracing::warn!(status, error = %self, "rejected request"),
        }
    }
}

impl From<GraphError> for AccessError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::ElementNotFound { kind, id } => Self::NotFound { kind, id },
            GraphError::DuplicateId { kind, id } => Self::Conflict { kind, id },
            GraphError::Storage(message) => Self::StorageFailure(message),
        }
    }
}

impl From<InvocationError> for AccessError {
    fn from(error: InvocationError) -> Self {
        match error {
            InvocationError::Failed(_) | InvocationError::Panicked(_) => Self::ExtensionFailure(error.to_string()),
            InvocationError::ContractViolation(detail) => Self::ExtensionContractViolation(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AccessError::GraphNotFound("g".into()).status(), 404);
        assert_eq!(AccessError::not_found(ElementKind::Vertex, &"1".into()).status(), 404);
        assert_eq!(AccessError::NamespaceDenied("a/b".into()).status(), 404);
        assert_eq!(AccessError::ExtensionNotFound("a/b".into()).status(), 404);
        assert_eq!(
            AccessError::Conflict {
                kind: ElementKind::Edge,
                id: "e".into()
            }
            .status(),
            409
        );
        assert_eq!(AccessError::MissingField("id").status(), 400);
        assert_eq!(AccessError::InvalidWindow { start: 3, end: 1 }.status(), 400);
        assert_eq!(AccessError::StorageFailure("disk".into()).status(), 500);
        assert_eq!(AccessError::ExtensionFailure("boom".into()).status(), 500);
        assert_eq!(
            AccessError::ExtensionErrorResponse(ExtensionResponse::error(418, "teapot")).status(),
            418
        );
    }

    #[test]
    fn denied_and_unregistered_render_identically() {
        let denied = AccessError::NamespaceDenied("acme/run".into());
        let missing = AccessError::ExtensionNotFound("acme/run".into());
        assert_eq!(denied.status(), missing.status());
        assert_eq!(denied.message(), missing.message());
        assert_eq!(denied.detail(), missing.detail());
    }

    #[test]
    fn server_failures_hide_detail_in_message() {
        let error = AccessError::StorageFailure("page checksum mismatch".into());
        assert!(!error.message().contains("checksum"));
        assert_eq!(error.detail().as_deref(), Some("page checksum mismatch"));
    }

    #[test]
    fn graph_errors_convert() {
        let id = ElementId::from("7");
        assert!(matches!(
            AccessError::from(GraphError::not_found(ElementKind::Edge, &id)),
            AccessError::NotFound { kind: ElementKind::Edge, .. }
        ));
        assert!(matches!(
            AccessError::from(GraphError::duplicate(ElementKind::Vertex, &id)),
            AccessError::Conflict { .. }
        ));
        assert!(matches!(
            AccessError::from(GraphError::storage("io")),
            AccessError::StorageFailure(_)
        ));
    }

    #[test]
    fn invocation_errors_convert() {
        assert!(matches!(
            AccessError::from(InvocationError::Panicked("boom".into())),
            AccessError::ExtensionFailure(_)
        ));
        assert!(matches!(
            AccessError::from(InvocationError::ContractViolation("not an object".into())),
            AccessError::ExtensionContractViolation(_)
        ));
    }
}
