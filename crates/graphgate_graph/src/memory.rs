//! In-memory graph storage.

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::element::{Edge, ElementId, ElementKind, Properties, Vertex};
use crate::error::GraphError;
use crate::graph::{Elements, Graph};
use crate::value::PropertyValue;

#[derive(Debug, Default)]
struct VertexRecord {
    properties: Properties,
    out_edges: IndexSet<ElementId>,
    in_edges: IndexSet<ElementId>,
}

#[derive(Debug)]
struct EdgeRecord {
    out_vertex: ElementId,
    in_vertex: ElementId,
    label: String,
    properties: Properties,
}

#[derive(Debug, Default)]
struct State {
    vertices: IndexMap<ElementId, VertexRecord>,
    edges: IndexMap<ElementId, EdgeRecord>,
}

impl State {
    fn vertex_snapshot(&self, id: &ElementId) -> Option<Vertex> {
        self.vertices
            .get(id)
            .map(|record| Vertex::new(id.clone(), record.properties.clone()))
    }

    fn edge_snapshot(&self, id: &ElementId) -> Option<Edge> {
        self.edges.get(id).map(|record| {
            Edge::new(
                id.clone(),
                record.out_vertex.clone(),
                record.in_vertex.clone(),
                record.label.clone(),
                record.properties.clone(),
            )
        })
    }

    fn properties_mut(&mut self, kind: ElementKind, id: &ElementId) -> Result<&mut Properties, GraphError> {
        let properties = match kind {
            ElementKind::Vertex => self.vertices.get_mut(id).map(|record| &mut record.properties),
            ElementKind::Edge => self.edges.get_mut(id).map(|record| &mut record.properties),
        };
        properties.ok_or_else(|| GraphError::not_found(kind, id))
    }

    fn detach_edge(&mut self, id: &ElementId) -> Option<EdgeRecord> {
        let record = self.edges.shift_remove(id)?;
        if let Some(tail) = self.vertices.get_mut(&record.out_vertex) {
            tail.out_edges.shift_remove(id);
        }
        if let Some(head) = self.vertices.get_mut(&record.in_vertex) {
            head.in_edges.shift_remove(id);
        }
        Some(record)
    }
}

/// A graph held entirely in process memory.
///
/// Elements enumerate in insertion order. Enumeration takes a snapshot under
/// a read lock, so a listing never observes a concurrent mutation halfway.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<State>,
}

impl MemoryGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.state.read().vertices.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }

    fn incident(&self, vertex: &ElementId, outgoing: bool) -> Result<Elements<'_, Edge>, GraphError> {
        let state = self.state.read();
        let record = state
            .vertices
            .get(vertex)
            .ok_or_else(|| GraphError::not_found(ElementKind::Vertex, vertex))?;
        let ids = if outgoing { &record.out_edges } else { &record.in_edges };
        let edges: Vec<Edge> = ids.iter().filter_map(|id| state.edge_snapshot(id)).collect();
        Ok(Box::new(edges.into_iter()))
    }
}

impl Graph for MemoryGraph {
    fn vertex(&self, id: &ElementId) -> Result<Option<Vertex>, GraphError> {
        Ok(self.state.read().vertex_snapshot(id))
    }

    fn edge(&self, id: &ElementId) -> Result<Option<Edge>, GraphError> {
        Ok(self.state.read().edge_snapshot(id))
    }

    fn vertices(&self) -> Result<Elements<'_, Vertex>, GraphError> {
        let state = self.state.read();
        let vertices: Vec<Vertex> = state
            .vertices
            .iter()
            .map(|(id, record)| Vertex::new(id.clone(), record.properties.clone()))
            .collect();
        Ok(Box::new(vertices.into_iter()))
    }

    fn edges(&self) -> Result<Elements<'_, Edge>, GraphError> {
        let state = self.state.read();
        let edges: Vec<Edge> = state.edges.keys().filter_map(|id| state.edge_snapshot(id)).collect();
        Ok(Box::new(edges.into_iter()))
    }

    fn out_edges(&self, vertex: &ElementId) -> Result<Elements<'_, Edge>, GraphError> {
        self.incident(vertex, true)
    }

    fn in_edges(&self, vertex: &ElementId) -> Result<Elements<'_, Edge>, GraphError> {
        self.incident(vertex, false)
    }

    fn add_vertex(&self, id: Option<ElementId>) -> Result<Vertex, GraphError> {
        let id = id.unwrap_or_else(ElementId::generate);
        let mut state = self.state.write();
        if state.vertices.contains_key(&id) {
            return Err(GraphError::duplicate(ElementKind::Vertex, &id));
        }
        state.vertices.insert(id.clone(), VertexRecord::default());
        Ok(Vertex::new(id, Properties::new()))
    }

    fn add_edge(
        &self,
        id: Option<ElementId>,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
    ) -> Result<Edge, GraphError> {
        let id = id.unwrap_or_else(ElementId::generate);
        let mut state = self.state.write();
        if state.edges.contains_key(&id) {
            return Err(GraphError::duplicate(ElementKind::Edge, &id));
        }
        for endpoint in [out_vertex, in_vertex] {
            if !state.vertices.contains_key(endpoint) {
                return Err(GraphError::not_found(ElementKind::Vertex, endpoint));
            }
        }

        if let Some(tail) = state.vertices.get_mut(out_vertex) {
            tail.out_edges.insert(id.clone());
        }
        if let Some(head) = state.vertices.get_mut(in_vertex) {
            head.in_edges.insert(id.clone());
        }
        state.edges.insert(
            id.clone(),
            EdgeRecord {
                out_vertex: out_vertex.clone(),
                in_vertex: in_vertex.clone(),
                label: label.to_owned(),
                properties: Properties::new(),
            },
        );
        Ok(Edge::new(id, out_vertex.clone(), in_vertex.clone(), label, Properties::new()))
    }

    fn set_property(
        &self,
        kind: ElementKind,
        id: &ElementId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), GraphError> {
        let mut state = self.state.write();
        state.properties_mut(kind, id)?.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove_property(
        &self,
        kind: ElementKind,
        id: &ElementId,
        key: &str,
    ) -> Result<Option<PropertyValue>, GraphError> {
        let mut state = self.state.write();
        Ok(state.properties_mut(kind, id)?.shift_remove(key))
    }

    fn remove_vertex(&self, id: &ElementId) -> Result<(), GraphError> {
        let mut state = self.state.write();
        let record = state
            .vertices
            .get(id)
            .ok_or_else(|| GraphError::not_found(ElementKind::Vertex, id))?;

        // A self-loop sits in both sets; detach_edge tolerates the second hit.
        let incident: Vec<ElementId> = record
            .out_edges
            .iter()
            .chain(record.in_edges.iter())
            .cloned()
            .collect();
        for edge in &incident {
            state.detach_edge(edge);
        }
        state.vertices.shift_remove(id);
        Ok(())
    }

    fn remove_edge(&self, id: &ElementId) -> Result<(), GraphError> {
        let mut state = self.state.write();
        state
            .detach_edge(id)
            .map(|_| ())
            .ok_or_else(|| GraphError::not_found(ElementKind::Edge, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MemoryGraph {
        let graph = MemoryGraph::new();
        for id in ["1", "2", "3"] {
            graph.add_vertex(Some(id.into())).unwrap();
        }
        graph.add_edge(Some("7".into()), &"1".into(), &"2".into(), "knows").unwrap();
        graph.add_edge(Some("8".into()), &"1".into(), &"3".into(), "knows").unwrap();
        graph.add_edge(Some("9".into()), &"3".into(), &"1".into(), "created").unwrap();
        graph
    }

    fn ids<T: crate::Element>(items: impl Iterator<Item = T>) -> Vec<String> {
        items.map(|item| item.id().to_string()).collect()
    }

    #[test]
    fn enumerates_in_insertion_order() {
        let graph = triangle();
        assert_eq!(ids(graph.vertices().unwrap()), ["1", "2", "3"]);
        assert_eq!(ids(graph.edges().unwrap()), ["7", "8", "9"]);
        assert_eq!(ids(graph.out_edges(&"1".into()).unwrap()), ["7", "8"]);
        assert_eq!(ids(graph.in_edges(&"1".into()).unwrap()), ["9"]);
    }

    #[test]
    fn generated_ids_are_assigned() {
        let graph = MemoryGraph::new();
        let vertex = graph.add_vertex(None).unwrap();
        assert!(!vertex.id().as_str().is_empty());
        assert!(graph.vertex(vertex.id()).unwrap().is_some());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let graph = triangle();
        assert_eq!(
            graph.add_vertex(Some("1".into())),
            Err(GraphError::duplicate(ElementKind::Vertex, &"1".into()))
        );
        assert!(matches!(
            graph.add_edge(Some("7".into()), &"2".into(), &"3".into(), "x"),
            Err(GraphError::DuplicateId { .. })
        ));
    }

    #[test]
    fn edge_requires_existing_endpoints() {
        let graph = triangle();
        let error = graph
            .add_edge(None, &"1".into(), &"404".into(), "knows")
            .unwrap_err();
        assert_eq!(error, GraphError::not_found(ElementKind::Vertex, &"404".into()));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn incident_edges_of_missing_vertex() {
        let graph = triangle();
        assert!(matches!(
            graph.out_edges(&"404".into()),
            Err(GraphError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn properties_set_replace_and_remove() {
        let graph = triangle();
        let id = ElementId::from("1");
        graph.set_property(ElementKind::Vertex, &id, "name", "marko".into()).unwrap();
        graph.set_property(ElementKind::Vertex, &id, "age", PropertyValue::Integer(29)).unwrap();
        graph.set_property(ElementKind::Vertex, &id, "name", "okram".into()).unwrap();

        let vertex = graph.vertex(&id).unwrap().unwrap();
        let keys: Vec<&str> = vertex.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "age"]);
        assert_eq!(vertex.properties()["name"], PropertyValue::from("okram"));

        let removed = graph.remove_property(ElementKind::Vertex, &id, "name").unwrap();
        assert_eq!(removed, Some(PropertyValue::from("okram")));
        assert_eq!(graph.remove_property(ElementKind::Vertex, &id, "name").unwrap(), None);
    }

    #[test]
    fn property_on_missing_element() {
        let graph = triangle();
        assert!(
            graph
                .set_property(ElementKind::Edge, &"404".into(), "weight", PropertyValue::Float(1.0))
                .is_err()
        );
    }

    #[test]
    fn removing_vertex_cascades_to_edges() {
        let graph = triangle();
        graph.remove_vertex(&"1".into()).unwrap();

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(ids(graph.in_edges(&"3".into()).unwrap()), Vec::<String>::new());
        assert_eq!(ids(graph.out_edges(&"3".into()).unwrap()), Vec::<String>::new());
    }

    #[test]
    fn removing_vertex_with_self_loop() {
        let graph = MemoryGraph::new();
        graph.add_vertex(Some("a".into())).unwrap();
        graph.add_edge(Some("loop".into()), &"a".into(), &"a".into(), "self").unwrap();
        assert_eq!(ids(graph.out_edges(&"a".into()).unwrap()), ["loop"]);
        assert_eq!(ids(graph.in_edges(&"a".into()).unwrap()), ["loop"]);

        graph.remove_vertex(&"a".into()).unwrap();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn removing_edge_detaches_it() {
        let graph = triangle();
        graph.remove_edge(&"7".into()).unwrap();
        assert_eq!(ids(graph.out_edges(&"1".into()).unwrap()), ["8"]);
        assert_eq!(ids(graph.in_edges(&"2".into()).unwrap()), Vec::<String>::new());
        assert!(matches!(
            graph.remove_edge(&"7".into()),
            Err(GraphError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn element_and_remove_element_dispatch_on_kind() {
        let graph = triangle();
        let edge = graph.element(ElementKind::Edge, &"9".into()).unwrap().unwrap();
        assert_eq!(crate::Element::kind(&edge), ElementKind::Edge);
        assert!(graph.element(ElementKind::Vertex, &"9".into()).unwrap().is_none());

        graph.remove_element(ElementKind::Vertex, &"2".into()).unwrap();
        assert!(graph.vertex(&"2".into()).unwrap().is_none());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn snapshot_is_stable_during_mutation() {
        let graph = triangle();
        let listing = graph.vertices().unwrap();
        graph.add_vertex(Some("4".into())).unwrap();
        assert_eq!(ids(listing), ["1", "2", "3"]);
    }
}
