//! # graphgate Internal Library
//!
//! Re-exports the core graphgate crates for convenience.

/// Layer 1: plugin lifecycle and resources.
pub use graphgate_system;

/// Layer 1: time and logging plugins.
pub use graphgate_core_plugins;

/// Layer 2: graph capability and in-memory storage.
pub use graphgate_graph;

/// Layer 2: extension registry and invocation.
pub use graphgate_extensions;

/// Layer 3: request-facing access layer.
pub use graphgate_access;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use graphgate_access::{
        AccessConfig, AccessError, AccessLayer, AccessPlugin, AccessPlugins, EntityKind, GraphsPlugin, Operation,
        Request, Response,
    };
    pub use graphgate_core_plugins::{Clock, DefaultPlugins, TimePlugin, TracingPlugin};
    pub use graphgate_extensions::{
        AllowList, Extension, ExtensionCall, ExtensionError, ExtensionMethod, ExtensionPoint, ExtensionRegistry,
        ExtensionResponse, ExtensionTarget, ExtensionsPlugin, FnMethod,
    };
    pub use graphgate_graph::{Direction, Edge, Element, ElementId, ElementKind, Graph, MemoryGraph, PropertyValue, Vertex};
    pub use graphgate_system::prelude::*;
}
