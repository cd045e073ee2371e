//! Element identities and owned element snapshots.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::PropertyValue;

/// Ordered property map of an element.
pub type Properties = IndexMap<String, PropertyValue>;

/// Identifier of a vertex or an edge.
///
/// Ids are opaque strings. Generated ids use nanoid, so they need no
/// coordination with the storage engine. Internally an `Arc<str>`, so
/// cloning only bumps a reference count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Arc<str>);

impl ElementId {
    /// Generates a fresh unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// The two kinds of graph element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A vertex.
    Vertex,
    /// An edge.
    Edge,
}

impl ElementKind {
    /// Returns the lowercase name used in representations and messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which incident edges of a vertex to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Edges leaving the vertex.
    Out,
    /// Edges arriving at the vertex.
    In,
    /// Outgoing edges followed by incoming edges.
    Both,
}

impl FromStr for Direction {
    type Err = String;

    /// Accepts `out`/`in`/`both` and the `outE`/`inE`/`bothE` path tokens.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "out" | "outE" => Ok(Self::Out),
            "in" | "inE" => Ok(Self::In),
            "both" | "bothE" => Ok(Self::Both),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Common read access to vertices and edges.
pub trait Element {
    /// Returns the element id.
    fn id(&self) -> &ElementId;

    /// Returns the element kind.
    fn kind(&self) -> ElementKind;

    /// Returns all properties in insertion order.
    fn properties(&self) -> &Properties;

    /// Returns a single property.
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties().get(key)
    }
}

/// Snapshot of a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) id: ElementId,
    pub(crate) properties: Properties,
}

impl Vertex {
    /// Creates a vertex snapshot.
    #[must_use]
    pub fn new(id: ElementId, properties: Properties) -> Self {
        Self { id, properties }
    }

    /// Returns the vertex id.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Returns the vertex properties.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Element for Vertex {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Vertex
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Snapshot of a directed, labelled edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) id: ElementId,
    pub(crate) out_vertex: ElementId,
    pub(crate) in_vertex: ElementId,
    pub(crate) label: String,
    pub(crate) properties: Properties,
}

impl Edge {
    /// Creates an edge snapshot.
    #[must_use]
    pub fn new(
        id: ElementId,
        out_vertex: ElementId,
        in_vertex: ElementId,
        label: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            out_vertex,
            in_vertex,
            label: label.into(),
            properties,
        }
    }

    /// Returns the edge id.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Returns the vertex the edge leaves.
    #[must_use]
    pub fn out_vertex(&self) -> &ElementId {
        &self.out_vertex
    }

    /// Returns the vertex the edge arrives at.
    #[must_use]
    pub fn in_vertex(&self) -> &ElementId {
        &self.in_vertex
    }

    /// Returns the edge label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the edge properties.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Element for Edge {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Edge
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Either kind of element.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyElement {
    /// A vertex snapshot.
    Vertex(Vertex),
    /// An edge snapshot.
    Edge(Edge),
}

impl Element for AnyElement {
    fn id(&self) -> &ElementId {
        match self {
            Self::Vertex(vertex) => &vertex.id,
            Self::Edge(edge) => &edge.id,
        }
    }

    fn kind(&self) -> ElementKind {
        match self {
            Self::Vertex(_) => ElementKind::Vertex,
            Self::Edge(_) => ElementKind::Edge,
        }
    }

    fn properties(&self) -> &Properties {
        match self {
            Self::Vertex(vertex) => &vertex.properties,
            Self::Edge(edge) => &edge.properties,
        }
    }
}

impl From<Vertex> for AnyElement {
    fn from(vertex: Vertex) -> Self {
        Self::Vertex(vertex)
    }
}

impl From<Edge> for AnyElement {
    fn from(edge: Edge) -> Self {
        Self::Edge(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(ElementId::generate(), ElementId::generate());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = ElementId::from("v1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"v1\"");
        let back: ElementId = serde_json::from_str("\"v1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn direction_accepts_path_tokens() {
        assert_eq!("outE".parse::<Direction>(), Ok(Direction::Out));
        assert_eq!("in".parse::<Direction>(), Ok(Direction::In));
        assert_eq!("bothE".parse::<Direction>(), Ok(Direction::Both));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn any_element_delegates() {
        let mut properties = Properties::new();
        properties.insert("weight".into(), PropertyValue::Float(0.4));
        let edge = Edge::new("e1".into(), "v1".into(), "v2".into(), "knows", properties);
        let any = AnyElement::from(edge);

        assert_eq!(any.kind(), ElementKind::Edge);
        assert_eq!(any.id().as_str(), "e1");
        assert_eq!(any.property("weight"), Some(&PropertyValue::Float(0.4)));
        assert_eq!(any.property("missing"), None);
    }
}
