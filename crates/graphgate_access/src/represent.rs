//! Canonical JSON representation of vertices and edges.

use graphgate_graph::{AnyElement, Edge, Element, PropertyValue, Vertex};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::error::AccessError;
use crate::request::is_reserved;

/// Structural key holding the element id.
pub const KEY_ID: &str = "_id";
/// Structural key holding the element kind.
pub const KEY_TYPE: &str = "_type";
/// Structural key holding an edge's out-vertex id.
pub const KEY_OUT_V: &str = "_outV";
/// Structural key holding an edge's in-vertex id.
pub const KEY_IN_V: &str = "_inV";
/// Structural key holding an edge's label.
pub const KEY_LABEL: &str = "_label";

const WILDCARD: &str = "*";

/// How properties are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    return_keys: Option<Vec<String>>,
    show_types: bool,
}

impl RenderOptions {
    /// Creates options; an empty `return_keys` list or one containing `*`
    /// renders every key.
    #[must_use]
    pub fn new(return_keys: Option<Vec<String>>, show_types: bool) -> Self {
        let return_keys =
            return_keys.filter(|keys| !keys.is_empty() && !keys.iter().any(|key| key == WILDCARD));
        Self {
            return_keys,
            show_types,
        }
    }

    /// Returns true if the property `key` should be rendered.
    #[must_use]
    pub fn includes(&self, key: &str) -> bool {
        self.return_keys
            .as_ref()
            .is_none_or(|keys| keys.iter().any(|candidate| candidate == key))
    }

    /// Returns true if properties render with their type.
    #[must_use]
    pub fn show_types(&self) -> bool {
        self.show_types
    }

    /// Renders `element` as a JSON object.
    pub fn render<E: Represent>(&self, element: &E) -> Result<Value, AccessError> {
        Ok(serde_json::to_value(Rendered {
            element,
            options: self,
        })?)
    }

    /// Renders every element of `elements`.
    pub fn render_all<E: Represent>(&self, elements: &[E]) -> Result<Vec<Value>, AccessError> {
        elements.iter().map(|element| self.render(element)).collect()
    }
}

/// Elements with a canonical representation.
pub trait Represent: Element {
    /// Writes the structural fields that precede the properties.
    fn structure<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error>;
}

impl Represent for Vertex {
    fn structure<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry(KEY_ID, self.id())?;
        map.serialize_entry(KEY_TYPE, &self.kind())
    }
}

impl Represent for Edge {
    fn structure<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry(KEY_ID, self.id())?;
        map.serialize_entry(KEY_TYPE, &self.kind())?;
        map.serialize_entry(KEY_OUT_V, self.out_vertex())?;
        map.serialize_entry(KEY_IN_V, self.in_vertex())?;
        map.serialize_entry(KEY_LABEL, self.label())
    }
}

impl Represent for AnyElement {
    fn structure<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            Self::Vertex(vertex) => vertex.structure(map),
            Self::Edge(edge) => edge.structure(map),
        }
    }
}

struct Rendered<'a, E> {
    element: &'a E,
    options: &'a RenderOptions,
}

impl<E: Represent> Serialize for Rendered<'_, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.element.structure(&mut map)?;
        // Stored `_` keys would shadow the structural fields.
        for (key, value) in self.element.properties() {
            if is_reserved(key) || !self.options.includes(key) {
                continue;
            }
            if self.options.show_types {
                map.serialize_entry(key, &Typed(value))?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

struct Typed<'a>(&'a PropertyValue);

impl Serialize for Typed<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.0.type_name())?;
        map.serialize_entry("value", self.0)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_graph::Properties;
    use serde_json::json;

    fn marko() -> Vertex {
        let mut properties = Properties::new();
        properties.insert("name".into(), "marko".into());
        properties.insert("age".into(), PropertyValue::Integer(29));
        Vertex::new("1".into(), properties)
    }

    #[test]
    fn renders_vertex() {
        let rendered = RenderOptions::default().render(&marko()).unwrap();
        assert_eq!(
            rendered,
            json!({ "_id": "1", "_type": "vertex", "name": "marko", "age": 29 })
        );
    }

    #[test]
    fn renders_edge_structure() {
        let mut properties = Properties::new();
        properties.insert("weight".into(), PropertyValue::Float(0.5));
        let edge = Edge::new("7".into(), "1".into(), "2".into(), "knows", properties);

        let rendered = RenderOptions::default().render(&edge).unwrap();
        assert_eq!(
            rendered,
            json!({
                "_id": "7",
                "_type": "edge",
                "_outV": "1",
                "_inV": "2",
                "_label": "knows",
                "weight": 0.5
            })
        );
    }

    #[test]
    fn return_keys_project_properties_only() {
        let options = RenderOptions::new(Some(vec!["age".into()]), false);
        let rendered = options.render(&marko()).unwrap();
        assert_eq!(rendered, json!({ "_id": "1", "_type": "vertex", "age": 29 }));
    }

    #[test]
    fn wildcard_renders_everything() {
        let options = RenderOptions::new(Some(vec!["name".into(), "*".into()]), false);
        assert!(options.includes("age"));
        assert!(options.includes("name"));
    }

    #[test]
    fn empty_return_keys_render_everything() {
        let options = RenderOptions::new(Some(Vec::new()), false);
        assert_eq!(options, RenderOptions::default());
        let rendered = options.render(&marko()).unwrap();
        assert_eq!(rendered["name"], "marko");
    }

    #[test]
    fn stored_reserved_keys_do_not_shadow_structure() {
        let mut vertex = marko();
        let mut properties = vertex.properties().clone();
        properties.insert("_id".into(), "spoofed".into());
        properties.insert("_type".into(), "edge".into());
        vertex = Vertex::new(vertex.id().clone(), properties);

        let rendered = RenderOptions::default().render(&vertex).unwrap();
        assert_eq!(
            rendered,
            json!({ "_id": "1", "_type": "vertex", "name": "marko", "age": 29 })
        );
    }

    #[test]
    fn typed_rendering() {
        let options = RenderOptions::new(None, true);
        let rendered = options.render(&AnyElement::from(marko())).unwrap();
        assert_eq!(
            rendered,
            json!({
                "_id": "1",
                "_type": "vertex",
                "name": { "type": "string", "value": "marko" },
                "age": { "type": "integer", "value": 29 }
            })
        );
    }
}
