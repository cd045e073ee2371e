//! Single-entity operations against a graph.
//!
//! The gateway works on owned snapshots: every operation returns the entity
//! as it was after the write, re-read from storage.

use graphgate_graph::{AnyElement, Element, ElementId, ElementKind, Graph, Properties, PropertyValue};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::AccessError;
use crate::request::is_reserved;

/// Metadata key naming a new edge's out-vertex.
pub const META_OUT_V: &str = "_outV";
/// Metadata key naming a new edge's in-vertex.
pub const META_IN_V: &str = "_inV";
/// Metadata key naming a new edge's label.
pub const META_LABEL: &str = "_label";

const BODY_KEY: &str = "_body";

// ─────────────────────────────────────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────────────────────────────────────

/// A request body split into typed properties and `_`-prefixed metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    properties: Properties,
    metadata: IndexMap<String, Value>,
}

impl Payload {
    /// Splits `body`, validating every property value.
    ///
    /// A missing or `null` body is empty. Anything other than a JSON object
    /// fails, as do property values that are not JSON scalars.
    pub fn parse(body: Option<&Value>) -> Result<Self, AccessError> {
        match body {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(map)) => Self::from_map(map),
            Some(other) => Err(AccessError::invalid_property(
                BODY_KEY,
                format!("expected a JSON object, found {}", json_type(other)),
            )),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, AccessError> {
        let mut payload = Self::default();
        for (key, value) in map {
            if is_reserved(key) {
                payload.metadata.insert(key.clone(), value.clone());
                continue;
            }
            let typed = PropertyValue::from_json(value).ok_or_else(|| {
                AccessError::invalid_property(key.as_str(), format!("{} is not a scalar", json_type(value)))
            })?;
            payload.properties.insert(key.clone(), typed);
        }
        Ok(payload)
    }

    /// Returns the typed properties.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Returns the metadata under `key` as non-empty text.
    ///
    /// Numbers are accepted and rendered as text, since ids may be numeric.
    pub fn required(&self, key: &'static str) -> Result<String, AccessError> {
        let text = match self.metadata.get(key) {
            Some(Value::String(text)) => text.trim().to_owned(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        };
        if text.is_empty() {
            return Err(AccessError::MissingField(key));
        }
        Ok(text)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EntityGateway
// ─────────────────────────────────────────────────────────────────────────────

/// Fetch, create, update and delete of one vertex or edge.
pub struct EntityGateway<'g> {
    graph: &'g dyn Graph,
}

impl<'g> EntityGateway<'g> {
    /// Creates a gateway over `graph`.
    pub fn new(graph: &'g dyn Graph) -> Self {
        Self { graph }
    }

    /// Returns the entity, or [`AccessError::NotFound`].
    pub fn fetch(&self, kind: ElementKind, id: &ElementId) -> Result<AnyElement, AccessError> {
        self.graph
            .element(kind, id)?
            .ok_or_else(|| AccessError::not_found(kind, id))
    }

    /// Creates an entity and sets its properties.
    ///
    /// An existing `id` with a non-empty property payload is a
    /// [`AccessError::Conflict`]; with an empty payload the existing entity is
    /// returned untouched. An empty `id` counts as absent, so the engine
    /// assigns one. Every property is validated before anything is
    /// written.
    pub fn create(
        &self,
        kind: ElementKind,
        id: Option<ElementId>,
        payload: &Payload,
    ) -> Result<AnyElement, AccessError> {
        let id = id.filter(|id| !id.as_str().is_empty());
        if let Some(id) = &id
            && let Some(existing) = self.graph.element(kind, id)?
        {
            if !payload.properties.is_empty() {
                return Err(AccessError::Conflict { kind, id: id.clone() });
            }
            tracing::debug!(%kind, %id, "create of existing entity without properties; nothing to do");
            return Ok(existing);
        }

        let created = match kind {
            ElementKind::Vertex => self.graph.add_vertex(id)?.id().clone(),
            ElementKind::Edge => {
                let out_vertex = ElementId::from(payload.required(META_OUT_V)?);
                let in_vertex = ElementId::from(payload.required(META_IN_V)?);
                let label = payload.required(META_LABEL)?;
                self.graph
                    .add_edge(id, &out_vertex, &in_vertex, &label)?
                    .id()
                    .clone()
            }
        };
        self.write_properties(kind, &created, &payload.properties)?;

        tracing::debug!(%kind, id = %created, properties = payload.properties.len(), "entity created");
        self.fetch(kind, &created)
    }

    /// Replaces every property of an existing entity with `payload`'s.
    pub fn update(&self, kind: ElementKind, id: &ElementId, payload: &Payload) -> Result<AnyElement, AccessError> {
        let existing = self.fetch(kind, id)?;
        for key in existing.properties().keys() {
            self.graph.remove_property(kind, id, key)?;
        }
        self.write_properties(kind, id, &payload.properties)?;

        tracing::debug!(%kind, %id, properties = payload.properties.len(), "entity updated");
        self.fetch(kind, id)
    }

    /// Removes the listed property `keys`, or the whole entity when `keys` is
    /// empty.
    ///
    /// Removing a vertex removes its incident edges too.
    pub fn delete(&self, kind: ElementKind, id: &ElementId, keys: &[String]) -> Result<(), AccessError> {
        self.fetch(kind, id)?;
        if keys.is_empty() {
            self.graph.remove_element(kind, id)?;
            tracing::debug!(%kind, %id, "entity removed");
        } else {
            for key in keys {
                self.graph.remove_property(kind, id, key)?;
            }
            tracing::debug!(%kind, %id, keys = keys.len(), "properties removed");
        }
        Ok(())
    }

    fn write_properties(&self, kind: ElementKind, id: &ElementId, properties: &Properties) -> Result<(), AccessError> {
        for (key, value) in properties {
            self.graph.set_property(kind, id, key, value.clone())?;
        }
        Ok(())
    }
}
