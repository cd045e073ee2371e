//! Property-graph storage capability for graphgate.
//!
//! The access layer never talks to a storage engine directly. It consumes the
//! [`Graph`] trait, which exposes exactly the primitives the layer needs:
//! lookups, enumeration, element creation, property mutation and removal.
//!
//! - [`Graph`] - the storage capability
//! - [`Vertex`] / [`Edge`] / [`AnyElement`] - owned element snapshots
//! - [`PropertyValue`] - typed scalar property values
//! - [`MemoryGraph`] - an in-memory implementation
//!
//! # Example
//!
//! ```
//! use graphgate_graph::{Graph, MemoryGraph, PropertyValue, ElementKind};
//!
//! let graph = MemoryGraph::new();
//! let marko = graph.add_vertex(Some("1".into())).unwrap();
//! graph
//!     .set_property(ElementKind::Vertex, marko.id(), "age", PropertyValue::coerce("29"))
//!     .unwrap();
//!
//! let stored = graph.vertex(&"1".into()).unwrap().unwrap();
//! assert_eq!(stored.properties()["age"], PropertyValue::Integer(29));
//! ```

pub mod element;
pub mod error;
pub mod graph;
pub mod memory;
pub mod value;

pub use element::{AnyElement, Direction, Edge, Element, ElementId, ElementKind, Properties, Vertex};
pub use error::GraphError;
pub use graph::{Elements, Graph};
pub use memory::MemoryGraph;
pub use value::PropertyValue;
