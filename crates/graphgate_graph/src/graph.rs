//! The storage capability trait.

use crate::element::{AnyElement, Edge, ElementId, ElementKind, Vertex};
use crate::error::GraphError;
use crate::value::PropertyValue;

/// Boxed element iterator returned by enumeration methods.
///
/// Iterators are lazily consumed by the access layer's windowing, so an
/// engine may stream elements rather than materialize them.
pub type Elements<'a, T> = Box<dyn Iterator<Item = T> + Send + 'a>;

/// A property graph the access layer can serve.
///
/// Implementations must be safe to share between request tasks. Lookups of
/// absent elements return `Ok(None)`; `Err` is reserved for storage failures
/// and for mutations that reference missing elements.
pub trait Graph: Send + Sync + 'static {
    /// Looks up a vertex.
    fn vertex(&self, id: &ElementId) -> Result<Option<Vertex>, GraphError>;

    /// Looks up an edge.
    fn edge(&self, id: &ElementId) -> Result<Option<Edge>, GraphError>;

    /// Enumerates every vertex in storage order.
    fn vertices(&self) -> Result<Elements<'_, Vertex>, GraphError>;

    /// Enumerates every edge in storage order.
    fn edges(&self) -> Result<Elements<'_, Edge>, GraphError>;

    /// Enumerates the edges leaving a vertex.
    fn out_edges(&self, vertex: &ElementId) -> Result<Elements<'_, Edge>, GraphError>;

    /// Enumerates the edges arriving at a vertex.
    fn in_edges(&self, vertex: &ElementId) -> Result<Elements<'_, Edge>, GraphError>;

    /// Creates a vertex. A `None` id lets the engine assign one.
    fn add_vertex(&self, id: Option<ElementId>) -> Result<Vertex, GraphError>;

    /// Creates an edge between two existing vertices.
    fn add_edge(
        &self,
        id: Option<ElementId>,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
    ) -> Result<Edge, GraphError>;

    /// Sets one property, replacing any previous value.
    fn set_property(
        &self,
        kind: ElementKind,
        id: &ElementId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), GraphError>;

    /// Removes one property and returns its previous value.
    fn remove_property(
        &self,
        kind: ElementKind,
        id: &ElementId,
        key: &str,
    ) -> Result<Option<PropertyValue>, GraphError>;

    /// Removes a vertex together with every incident edge.
    fn remove_vertex(&self, id: &ElementId) -> Result<(), GraphError>;

    /// Removes an edge.
    fn remove_edge(&self, id: &ElementId) -> Result<(), GraphError>;

    /// Looks up an element of either kind.
    fn element(&self, kind: ElementKind, id: &ElementId) -> Result<Option<AnyElement>, GraphError> {
        Ok(match kind {
            ElementKind::Vertex => self.vertex(id)?.map(AnyElement::Vertex),
            ElementKind::Edge => self.edge(id)?.map(AnyElement::Edge),
        })
    }

    /// Removes an element of either kind.
    fn remove_element(&self, kind: ElementKind, id: &ElementId) -> Result<(), GraphError> {
        match kind {
            ElementKind::Vertex => self.remove_vertex(id),
            ElementKind::Edge => self.remove_edge(id),
        }
    }
}
