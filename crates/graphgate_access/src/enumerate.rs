//! Windowed, filterable enumeration of element collections.
//!
//! The enumerator walks its source exactly once. Only elements passing
//! every filter are counted; an element is emitted when its position among
//! the passing elements falls inside the window. The reported total counts
//! every passing element, including those outside the window.

use graphgate_graph::{Direction, Edge, Element, ElementId, ElementKind, Graph, PropertyValue, Vertex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AccessError;

// ─────────────────────────────────────────────────────────────────────────────
// Window
// ─────────────────────────────────────────────────────────────────────────────

/// Half-open `[start, end)` range over filter-passing positions.
///
/// The default window starts at 0 and is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    /// First position to emit.
    pub start: u64,
    /// First position not to emit; `None` is unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

impl Window {
    /// Creates a validated window.
    pub fn new(start: u64, end: Option<u64>) -> Result<Self, AccessError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Fails with [`AccessError::InvalidWindow`] if `end < start`.
    pub fn validate(&self) -> Result<(), AccessError> {
        match self.end {
            Some(end) if end < self.start => Err(AccessError::InvalidWindow {
                start: self.start,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// Returns true if `position` is inside the window.
    #[must_use]
    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && self.end.is_none_or(|end| position < end)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PropertyFilter
// ─────────────────────────────────────────────────────────────────────────────

/// Equality constraint on one property.
///
/// Equality is typed: the integer 30 matches neither the float 30.0 nor the
/// string "30". Filter values given as text are coerced the same way written
/// values are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(String, Value)", into = "(String, Value)")]
pub struct PropertyFilter {
    key: String,
    value: PropertyValue,
}

impl PropertyFilter {
    /// Creates a filter on an already-typed value.
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a filter from request text, coercing the value.
    pub fn parse(key: impl Into<String>, raw: &str) -> Self {
        Self::new(key, PropertyValue::coerce(raw))
    }

    /// Returns the filtered key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the required value.
    #[must_use]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Returns true if `element` carries the key with an equal value.
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        element.property(&self.key) == Some(&self.value)
    }
}

impl TryFrom<(String, Value)> for PropertyFilter {
    type Error = String;

    fn try_from((key, value): (String, Value)) -> Result<Self, Self::Error> {
        PropertyValue::from_json(&value)
            .map(|value| Self { key: key.clone(), value })
            .ok_or_else(|| format!("filter on [{key}] needs a scalar value"))
    }
}

impl From<PropertyFilter> for (String, Value) {
    fn from(filter: PropertyFilter) -> Self {
        let value = filter.value.to_json();
        (filter.key, value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Enumeration
// ─────────────────────────────────────────────────────────────────────────────

/// One window of a collection plus the size of the whole filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Elements inside the window, in source order.
    pub items: Vec<T>,
    /// Number of elements that passed the filters.
    pub total: u64,
}

/// Applies `filters` and `window` to `source` in a single pass.
///
/// ```
/// use graphgate_access::{Window, enumerate};
/// use graphgate_graph::{Properties, Vertex};
///
/// let vertices = (0..5).map(|n| Vertex::new(n.to_string().into(), Properties::new()));
/// let page = enumerate(vertices, &Window { start: 0, end: Some(2) }, &[]);
/// assert_eq!(page.items.len(), 2);
/// assert_eq!(page.total, 5);
/// ```
pub fn enumerate<T, I>(source: I, window: &Window, filters: &[PropertyFilter]) -> Page<T>
where
    T: Element,
    I: IntoIterator<Item = T>,
{
    let mut items = Vec::new();
    let mut counter = 0_u64;
    for element in source {
        if !filters.iter().all(|filter| filter.matches(&element)) {
            continue;
        }
        if window.contains(counter) {
            items.push(element);
        }
        counter += 1;
    }
    Page { items, total: counter }
}

/// Lists every vertex of `graph`.
pub fn list_vertices(
    graph: &dyn Graph,
    window: &Window,
    filters: &[PropertyFilter],
) -> Result<Page<Vertex>, AccessError> {
    Ok(enumerate(graph.vertices()?, window, filters))
}

/// Lists every edge of `graph`.
pub fn list_edges(graph: &dyn Graph, window: &Window, filters: &[PropertyFilter]) -> Result<Page<Edge>, AccessError> {
    Ok(enumerate(graph.edges()?, window, filters))
}

/// Lists the edges of `vertex` in `direction`.
///
/// `Both` yields every out-edge before the first in-edge, with one counter
/// shared across the two runs.
pub fn list_incident(
    graph: &dyn Graph,
    vertex: &ElementId,
    direction: Direction,
    window: &Window,
    filters: &[PropertyFilter],
) -> Result<Page<Edge>, AccessError> {
    if graph.vertex(vertex)?.is_none() {
        return Err(AccessError::not_found(ElementKind::Vertex, vertex));
    }
    let page = match direction {
        Direction::Out => enumerate(graph.out_edges(vertex)?, window, filters),
        Direction::In => enumerate(graph.in_edges(vertex)?, window, filters),
        Direction::Both => enumerate(graph.out_edges(vertex)?.chain(graph.in_edges(vertex)?), window, filters),
    };
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_graph::{MemoryGraph, Properties};

    fn vertex(id: &str, pairs: &[(&str, PropertyValue)]) -> Vertex {
        let properties: Properties = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect();
        Vertex::new(id.into(), properties)
    }

    fn ids<T: Element>(page: &Page<T>) -> Vec<&str> {
        page.items.iter().map(|item| item.id().as_str()).collect()
    }

    #[test]
    fn window_contains() {
        let window = Window { start: 2, end: Some(4) };
        assert!(!window.contains(1));
        assert!(window.contains(2));
        assert!(window.contains(3));
        assert!(!window.contains(4));
        assert!(Window::default().contains(u64::MAX));
    }

    #[test]
    fn window_validation() {
        assert!(Window::new(3, Some(3)).is_ok());
        assert!(Window::new(3, None).is_ok());
        assert!(matches!(
            Window::new(3, Some(2)),
            Err(AccessError::InvalidWindow { start: 3, end: 2 })
        ));
    }

    #[test]
    fn filters_only_count_passing_elements() {
        let source = vec![
            vertex("a", &[("lang", "java".into())]),
            vertex("b", &[("lang", "rust".into())]),
            vertex("c", &[("lang", "java".into())]),
            vertex("d", &[]),
            vertex("e", &[("lang", "java".into())]),
        ];
        let filters = [PropertyFilter::new("lang", "java")];
        let page = enumerate(source, &Window { start: 1, end: Some(2) }, &filters);

        assert_eq!(ids(&page), ["c"]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn filters_are_and_combined() {
        let source = vec![
            vertex("a", &[("lang", "java".into()), ("age", PropertyValue::Integer(1))]),
            vertex("b", &[("lang", "java".into()), ("age", PropertyValue::Integer(2))]),
        ];
        let filters = [PropertyFilter::new("lang", "java"), PropertyFilter::parse("age", "2")];
        let page = enumerate(source, &Window::default(), &filters);
        assert_eq!(ids(&page), ["b"]);
    }

    #[test]
    fn filter_equality_is_typed() {
        let source = vec![
            vertex("int", &[("n", PropertyValue::Integer(30))]),
            vertex("float", &[("n", PropertyValue::Float(30.0))]),
            vertex("text", &[("n", PropertyValue::String("30".into()))]),
        ];
        let page = enumerate(source.clone(), &Window::default(), &[PropertyFilter::parse("n", "30")]);
        assert_eq!(ids(&page), ["int"]);

        let page = enumerate(source, &Window::default(), &[PropertyFilter::parse("n", "30.0")]);
        assert_eq!(ids(&page), ["float"]);
    }

    #[test]
    fn start_beyond_matches_keeps_total() {
        let source: Vec<_> = (0..3).map(|n| vertex(&n.to_string(), &[])).collect();
        let page = enumerate(source, &Window { start: 10, end: None }, &[]);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn empty_source() {
        let page = enumerate(Vec::<Vertex>::new(), &Window::default(), &[]);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn both_direction_lists_out_then_in_with_shared_counter() {
        let graph = MemoryGraph::new();
        for id in ["v1", "a", "b", "c"] {
            graph.add_vertex(Some(id.into())).unwrap();
        }
        let v1 = ElementId::from("v1");
        graph.add_edge(Some("in1".into()), &"a".into(), &v1, "x").unwrap();
        graph.add_edge(Some("out1".into()), &v1, &"b".into(), "x").unwrap();
        graph.add_edge(Some("in2".into()), &"c".into(), &v1, "x").unwrap();
        graph.add_edge(Some("out2".into()), &v1, &"c".into(), "x").unwrap();

        let all = list_incident(&graph, &v1, Direction::Both, &Window::default(), &[]).unwrap();
        assert_eq!(ids(&all), ["out1", "out2", "in1", "in2"]);

        let window = Window { start: 1, end: Some(3) };
        let middle = list_incident(&graph, &v1, Direction::Both, &window, &[]).unwrap();
        assert_eq!(ids(&middle), ["out2", "in1"]);
        assert_eq!(middle.total, 4);
    }

    #[test]
    fn incident_of_missing_vertex_is_not_found() {
        let graph = MemoryGraph::new();
        let result = list_incident(&graph, &"nope".into(), Direction::Out, &Window::default(), &[]);
        assert!(matches!(result, Err(AccessError::NotFound { .. })));
    }

    #[test]
    fn filter_round_trips_as_pair() {
        let filter = PropertyFilter::parse("age", "29");
        let encoded = serde_json::to_value(&filter).unwrap();
        assert_eq!(encoded, serde_json::json!(["age", 29]));
        assert!(serde_json::from_value::<PropertyFilter>(serde_json::json!(["tags", [1]])).is_err());
    }
}
