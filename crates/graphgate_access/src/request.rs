//! Request model and the immutable per-request context.

use core::fmt;
use std::time::Instant;

use graphgate_graph::{Direction, ElementId, ElementKind, PropertyValue};
use graphgate_extensions::ExtensionPoint;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enumerate::{PropertyFilter, Window};
use crate::error::AccessError;
use crate::represent::RenderOptions;

/// Prefix marking request metadata rather than graph data.
pub const RESERVED_PREFIX: char = '_';

/// Reserved parameter holding the window start.
pub const PARAM_START: &str = "_start";
/// Reserved parameter holding the window end.
pub const PARAM_END: &str = "_end";
/// Reserved parameter holding comma-separated return keys.
pub const PARAM_RETURN_KEYS: &str = "_return_keys";
/// Reserved parameter enabling typed rendering.
pub const PARAM_SHOW_TYPES: &str = "_show_types";

/// Returns true if `key` names request metadata.
#[must_use]
pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// What a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A vertex, or the vertex collection.
    Vertex,
    /// An edge, or the edge collection.
    Edge,
    /// The graph itself.
    Graph,
}

impl EntityKind {
    /// Returns the element kind, if this addresses an element.
    #[must_use]
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            Self::Vertex => Some(ElementKind::Vertex),
            Self::Edge => Some(ElementKind::Edge),
            Self::Graph => None,
        }
    }

    /// Returns the extension access point for this kind.
    #[must_use]
    pub fn extension_point(self) -> ExtensionPoint {
        match self {
            Self::Vertex => ExtensionPoint::Vertex,
            Self::Edge => ExtensionPoint::Edge,
            Self::Graph => ExtensionPoint::Graph,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension_point().as_str())
    }
}

/// What to do with the addressed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Enumerate a collection.
    List,
    /// Fetch a single entity.
    Get,
    /// Create an entity.
    Create,
    /// Replace an entity's properties.
    Update,
    /// Delete an entity or some of its properties.
    Delete,
    /// Invoke an extension method.
    Extension,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Extension => "extension",
        })
    }
}

/// A decoded access request.
///
/// Transports decode into this shape; [`Request::from_params`] covers the
/// flat query-parameter style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Name of the addressed graph.
    pub graph_name: String,
    /// What the request addresses.
    pub entity_kind: EntityKind,
    /// What to do.
    pub operation: Operation,
    /// Entity id, when one entity is addressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,
    /// Which incident edges to list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Collection window.
    #[serde(default)]
    pub window: Window,
    /// Property equality filters, AND-combined.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<PropertyFilter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Raw `namespace/method` path for extension calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_path: Option<String>,
    /// Property keys to render; `*` renders all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_keys: Option<Vec<String>>,
    /// Render properties with their type.
    #[serde(default)]
    pub show_types: bool,
    /// Property keys to delete instead of the whole entity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

impl Request {
    /// Creates a request with every optional part empty.
    pub fn new(graph_name: impl Into<String>, entity_kind: EntityKind, operation: Operation) -> Self {
        Self {
            graph_name: graph_name.into(),
            entity_kind,
            operation,
            id: None,
            direction: None,
            window: Window::default(),
            filters: Vec::new(),
            body: None,
            extension_path: None,
            return_keys: None,
            show_types: false,
            keys: Vec::new(),
        }
    }

    /// Sets the entity id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the edge direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Sets the window.
    #[must_use]
    pub fn with_window(mut self, start: u64, end: Option<u64>) -> Self {
        self.window = Window { start, end };
        self
    }

    /// Adds a filter.
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.filters.push(PropertyFilter::new(key, value));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the extension path.
    #[must_use]
    pub fn with_extension_path(mut self, path: impl Into<String>) -> Self {
        self.extension_path = Some(path.into());
        self
    }

    /// Restricts rendering to `keys`.
    #[must_use]
    pub fn with_return_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Enables typed rendering.
    #[must_use]
    pub fn with_show_types(mut self, show_types: bool) -> Self {
        self.show_types = show_types;
        self
    }

    /// Limits a delete to these property keys.
    #[must_use]
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a request from flat string parameters.
    ///
    /// `_start`, `_end`, `_return_keys` and `_show_types` configure the
    /// request. The remaining parameters become filters for `list`, property
    /// keys for `delete`, and a JSON object body for everything else. Other
    /// `_`-prefixed parameters only ever reach the body, as metadata.
    ///
    /// ```
    /// use graphgate_access::{EntityKind, Operation, Request};
    ///
    /// let params = [("_start", "10"), ("_end", "20"), ("name", "marko")];
    /// let request = Request::from_params("tinker", EntityKind::Vertex, Operation::List, params).unwrap();
    /// assert_eq!(request.window.start, 10);
    /// assert_eq!(request.filters.len(), 1);
    /// ```
    pub fn from_params<I, K, V>(
        graph_name: impl Into<String>,
        entity_kind: EntityKind,
        operation: Operation,
        params: I,
    ) -> Result<Self, AccessError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new(graph_name, entity_kind, operation);
        let mut rest: IndexMap<String, String> = IndexMap::new();
        let mut end = None;

        for (key, value) in params {
            let (key, value) = (key.into(), value.into());
            match key.as_str() {
                PARAM_START => request.window.start = parse_offset(PARAM_START, &value)?,
                PARAM_END => end = Some(parse_offset(PARAM_END, &value)?),
                PARAM_RETURN_KEYS => {
                    let keys: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|key| !key.is_empty())
                        .map(str::to_owned)
                        .collect();
                    request.return_keys = (!keys.is_empty()).then_some(keys);
                }
                PARAM_SHOW_TYPES => request.show_types = value.eq_ignore_ascii_case("true"),
                _ => {
                    rest.insert(key, value);
                }
            }
        }
        request.window.end = end;

        match operation {
            Operation::List => {
                request.filters = rest
                    .iter()
                    .filter(|(key, _)| !is_reserved(key))
                    .map(|(key, value)| PropertyFilter::parse(key.clone(), value))
                    .collect();
            }
            Operation::Delete => {
                request.keys = rest.into_keys().filter(|key| !is_reserved(key)).collect();
            }
            Operation::Get | Operation::Create | Operation::Update | Operation::Extension => {
                if !rest.is_empty() {
                    let body = rest
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect();
                    request.body = Some(Value::Object(body));
                }
            }
        }

        Ok(request)
    }
}

fn parse_offset(param: &'static str, raw: &str) -> Result<u64, AccessError> {
    raw.trim()
        .parse()
        .map_err(|_| AccessError::invalid_property(param, format!("'{raw}' is not a non-negative integer")))
}

/// Immutable view of a request shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct RequestContext {
    graph_name: String,
    window: Window,
    filters: Vec<PropertyFilter>,
    render: RenderOptions,
    started: Instant,
}

impl RequestContext {
    /// Validates the request's window and captures the rendering options.
    pub fn new(request: &Request, started: Instant) -> Result<Self, AccessError> {
        request.window.validate()?;
        Ok(Self {
            graph_name: request.graph_name.clone(),
            window: request.window,
            filters: request.filters.clone(),
            render: RenderOptions::new(request.return_keys.clone(), request.show_types),
            started,
        })
    }

    /// Returns the addressed graph's name.
    #[must_use]
    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    /// Returns the validated window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the filters.
    #[must_use]
    pub fn filters(&self) -> &[PropertyFilter] {
        &self.filters
    }

    /// Returns the rendering options.
    #[must_use]
    pub fn render(&self) -> &RenderOptions {
        &self.render
    }

    /// Returns when the request started, on the server clock.
    #[must_use]
    pub fn started(&self) -> Instant {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_params_list_builds_window_and_filters() {
        let params = [("_start", "1"), ("_end", "3"), ("age", "29"), ("_ignored", "x")];
        let request = Request::from_params("tinker", EntityKind::Vertex, Operation::List, params).unwrap();

        assert_eq!(request.window, Window { start: 1, end: Some(3) });
        assert_eq!(request.filters, vec![PropertyFilter::new("age", PropertyValue::Integer(29))]);
        assert!(request.body.is_none());
    }

    #[test]
    fn from_params_create_builds_body_with_metadata() {
        let params = [("_outV", "1"), ("_label", "knows"), ("weight", "0.5")];
        let request = Request::from_params("tinker", EntityKind::Edge, Operation::Create, params).unwrap();
        assert_eq!(
            request.body,
            Some(json!({ "_outV": "1", "_label": "knows", "weight": "0.5" }))
        );
        assert!(request.filters.is_empty());
    }

    #[test]
    fn from_params_delete_collects_keys() {
        let params = [("name", ""), ("age", ""), ("_start", "0")];
        let request = Request::from_params("tinker", EntityKind::Vertex, Operation::Delete, params).unwrap();
        assert_eq!(request.keys, ["name", "age"]);
    }

    #[test]
    fn from_params_rendering_options() {
        let params = [("_return_keys", "name, age,"), ("_show_types", "TRUE")];
        let request = Request::from_params("tinker", EntityKind::Vertex, Operation::Get, params).unwrap();
        assert_eq!(request.return_keys, Some(vec!["name".to_owned(), "age".to_owned()]));
        assert!(request.show_types);
        assert!(request.body.is_none());
    }

    #[test]
    fn from_params_empty_return_keys_are_absent() {
        for raw in ["", ",", " , "] {
            let request =
                Request::from_params("tinker", EntityKind::Vertex, Operation::Get, [("_return_keys", raw)]).unwrap();
            assert_eq!(request.return_keys, None);
        }
    }

    #[test]
    fn from_params_rejects_bad_offsets() {
        let result = Request::from_params("g", EntityKind::Vertex, Operation::List, [("_start", "-1")]);
        assert!(matches!(result, Err(AccessError::InvalidProperty { .. })));
    }

    #[test]
    fn request_decodes_from_camel_case_json() {
        let request: Request = serde_json::from_value(json!({
            "graphName": "tinker",
            "entityKind": "vertex",
            "operation": "list",
            "id": "1",
            "direction": "both",
            "window": { "start": 0, "end": 2 },
            "filters": [["name", "marko"], ["age", 29]],
            "showTypes": true
        }))
        .unwrap();

        assert_eq!(request.id, Some(ElementId::from("1")));
        assert_eq!(request.direction, Some(Direction::Both));
        assert_eq!(request.window, Window { start: 0, end: Some(2) });
        assert_eq!(request.filters[1], PropertyFilter::new("age", PropertyValue::Integer(29)));
        assert!(request.show_types);
    }

    #[test]
    fn context_rejects_inverted_window() {
        let request = Request::new("g", EntityKind::Vertex, Operation::List).with_window(5, Some(2));
        assert!(matches!(
            RequestContext::new(&request, Instant::now()),
            Err(AccessError::InvalidWindow { start: 5, end: 2 })
        ));
    }

    #[test]
    fn entity_kind_mappings() {
        assert_eq!(EntityKind::Vertex.element_kind(), Some(ElementKind::Vertex));
        assert_eq!(EntityKind::Graph.element_kind(), None);
        assert_eq!(EntityKind::Edge.extension_point(), ExtensionPoint::Edge);
        assert_eq!(Operation::Extension.to_string(), "extension");
    }
}
