//! Storage error types.

use thiserror::Error;

use crate::element::{ElementId, ElementKind};

/// Errors raised by a [`Graph`](crate::Graph) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The referenced element does not exist.
    #[error("{kind} with id [{id}] cannot be found")]
    ElementNotFound {
        /// Kind of the missing element.
        kind: ElementKind,
        /// Id that was looked up.
        id: ElementId,
    },

    /// An element with the requested id already exists.
    #[error("{kind} with id [{id}] already exists")]
    DuplicateId {
        /// Kind of the conflicting element.
        kind: ElementKind,
        /// Id that is already taken.
        id: ElementId,
    },

    /// The storage engine failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl GraphError {
    /// Creates an [`ElementNotFound`](Self::ElementNotFound) error.
    pub fn not_found(kind: ElementKind, id: &ElementId) -> Self {
        Self::ElementNotFound {
            kind,
            id: id.clone(),
        }
    }

    /// Creates a [`DuplicateId`](Self::DuplicateId) error.
    pub fn duplicate(kind: ElementKind, id: &ElementId) -> Self {
        Self::DuplicateId {
            kind,
            id: id.clone(),
        }
    }

    /// Creates a [`Storage`](Self::Storage) error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
