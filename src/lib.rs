//! Access layer for a property-graph server.
//!
//! Vertices and edges of named graphs are exposed through one
//! request/response contract, and behavior at the vertex, edge and graph
//! access points can be extended by plugins registered at startup.

pub use graphgate_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use graphgate_internal::prelude::*;
}
