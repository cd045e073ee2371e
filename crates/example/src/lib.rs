//! Example graphgate server.
//!
//! Registers a small `demo` extension and seeds an in-memory graph so the
//! access layer can be driven from the command line.
//!
//! # Extension Methods
//!
//! | Path | Point | Description |
//! |------|-------|-------------|
//! | `demo/degree` | vertex | Counts incident edges, optionally by direction |
//! | `demo/ends` | edge | Returns the endpoints and label of an edge |
//! | `demo/stats` | graph | Counts vertices and edges |

use graphgate_extensions::{
    Extension, ExtensionCall, ExtensionError, ExtensionMethod, ExtensionPoint, ExtensionRegistry,
    ExtensionResponse, ExtensionTarget, ExtensionsPlugin, FnMethod,
};
use graphgate_graph::{Direction, ElementKind, Graph, GraphError, PropertyValue};
use graphgate_system::plugin::{Plugin, PluginId};
use graphgate_system::server::Server;
use serde::Deserialize;
use serde_json::{Value, json};

/// Namespace of the demo extension.
pub const NAMESPACE: &str = "demo";

#[derive(Debug, Default, Deserialize)]
struct DegreeParams {
    #[serde(default)]
    direction: Option<Direction>,
}

/// Graph statistics and incident-edge counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Demo;

impl Extension for Demo {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn methods(self) -> Vec<Box<dyn ExtensionMethod>> {
        vec![
            Box::new(
                FnMethod::new(ExtensionPoint::Vertex, "degree", degree)
                    .with_description("Counts the edges incident to a vertex."),
            ),
            Box::new(
                FnMethod::new(ExtensionPoint::Edge, "ends", |call: ExtensionCall| async move {
                    let ExtensionTarget::Edge(edge) = call.target else {
                        return Err(ExtensionError::parameter_error("edge expected"));
                    };
                    Ok(ExtensionResponse::ok(json!({
                        "outV": edge.out_vertex(),
                        "inV": edge.in_vertex(),
                        "label": edge.label(),
                    }))
                    .into())
                })
                .with_description("Returns the endpoints of an edge."),
            ),
            Box::new(
                FnMethod::new(ExtensionPoint::Graph, "stats", |call: ExtensionCall| async move {
                    let vertices = call.graph.vertices()?.count();
                    let edges = call.graph.edges()?.count();
                    Ok(ExtensionResponse::ok(json!({
                        "graph": call.graph_name,
                        "vertices": vertices,
                        "edges": edges,
                    }))
                    .into())
                })
                .with_description("Counts vertices and edges."),
            ),
        ]
    }
}

async fn degree(call: ExtensionCall) -> Result<Value, ExtensionError> {
    let params = match call.body.clone() {
        Some(body) => serde_json::from_value::<DegreeParams>(body)
            .map_err(|err| ExtensionError::parameter_error(err.to_string()))?,
        None => DegreeParams::default(),
    };
    let ExtensionTarget::Vertex(vertex) = call.target else {
        return Err(ExtensionError::parameter_error("vertex expected"));
    };

    let direction = params.direction.unwrap_or(Direction::Both);
    let degree = match direction {
        Direction::Out => call.graph.out_edges(vertex.id())?.count(),
        Direction::In => call.graph.in_edges(vertex.id())?.count(),
        Direction::Both => call.graph.out_edges(vertex.id())?.count() + call.graph.in_edges(vertex.id())?.count(),
    };

    Ok(ExtensionResponse::ok(json!({
        "id": vertex.id(),
        "direction": direction,
        "degree": degree,
    }))
    .into())
}

/// Registers [`Demo`] with the [`ExtensionRegistry`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, server: &mut Server) {
        let mut registry = server
            .get_resource_mut::<ExtensionRegistry>()
            .expect("ExtensionsPlugin must be added before DemoPlugin");
        registry.register(Demo);
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<ExtensionsPlugin>()]
    }
}

/// Fills `graph` with a few people and what they created.
///
/// # Errors
///
/// Returns the first storage error.
pub fn seed(graph: &dyn Graph) -> Result<(), GraphError> {
    let people: [(&str, &str, i64); 3] = [("1", "marko", 29), ("2", "vadas", 27), ("4", "josh", 32)];
    for (id, name, age) in people {
        let vertex = graph.add_vertex(Some(id.into()))?;
        graph.set_property(ElementKind::Vertex, vertex.id(), "name", PropertyValue::from(name))?;
        graph.set_property(ElementKind::Vertex, vertex.id(), "age", PropertyValue::from(age))?;
    }

    let software = graph.add_vertex(Some("3".into()))?;
    graph.set_property(ElementKind::Vertex, software.id(), "name", PropertyValue::from("lop"))?;
    graph.set_property(ElementKind::Vertex, software.id(), "lang", PropertyValue::from("java"))?;

    let edges = [
        ("7", "1", "2", "knows", 0.5),
        ("8", "1", "4", "knows", 1.0),
        ("9", "1", "3", "created", 0.4),
        ("11", "4", "3", "created", 0.4),
    ];
    for (id, out_vertex, in_vertex, label, weight) in edges {
        let edge = graph.add_edge(Some(id.into()), &out_vertex.into(), &in_vertex.into(), label)?;
        graph.set_property(ElementKind::Edge, edge.id(), "weight", PropertyValue::from(weight))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_graph::MemoryGraph;
    use std::sync::Arc;

    fn seeded() -> Arc<MemoryGraph> {
        let graph = Arc::new(MemoryGraph::new());
        seed(graph.as_ref()).unwrap();
        graph
    }

    fn call(graph: Arc<MemoryGraph>, target: ExtensionTarget, body: Option<Value>) -> ExtensionCall {
        ExtensionCall {
            graph_name: "tinker".to_owned(),
            graph,
            target,
            body,
        }
    }

    #[test]
    fn seed_builds_the_sample_graph() {
        let graph = seeded();
        assert_eq!(graph.vertices().unwrap().count(), 4);
        assert_eq!(graph.edges().unwrap().count(), 4);
        assert_eq!(graph.out_edges(&"1".into()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn degree_counts_by_direction() {
        let graph = seeded();
        let marko = graph.vertex(&"1".into()).unwrap().unwrap();
        let lop = graph.vertex(&"3".into()).unwrap().unwrap();

        let both = degree(call(graph.clone(), ExtensionTarget::Vertex(marko.clone()), None))
            .await
            .unwrap();
        assert_eq!(both["entity"]["degree"], 3);
        assert_eq!(both["entity"]["direction"], "both");

        let incoming = degree(call(
            graph.clone(),
            ExtensionTarget::Vertex(lop),
            Some(json!({ "direction": "in" })),
        ))
        .await
        .unwrap();
        assert_eq!(incoming["entity"]["degree"], 2);

        let outgoing = degree(call(graph, ExtensionTarget::Vertex(marko), Some(json!({ "direction": "out" }))))
            .await
            .unwrap();
        assert_eq!(outgoing["entity"]["degree"], 3);
    }

    #[tokio::test]
    async fn degree_rejects_unknown_direction() {
        let graph = seeded();
        let marko = graph.vertex(&"1".into()).unwrap().unwrap();
        let err = degree(call(graph, ExtensionTarget::Vertex(marko), Some(json!({ "direction": "up" }))))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtensionError::ParameterError(_)));
    }

    #[test]
    fn plugin_registers_every_point() {
        let mut server = Server::new();
        server.add_plugins(ExtensionsPlugin).add_plugins(DemoPlugin);
        server.finish();

        let registry = server.get_global::<ExtensionRegistry>().unwrap();
        let demo = registry.find_extension(NAMESPACE).unwrap();
        assert!(demo.find_method(ExtensionPoint::Vertex, "degree").is_some());
        assert!(demo.find_method(ExtensionPoint::Edge, "ends").is_some());
        assert!(demo.find_method(ExtensionPoint::Graph, "stats").is_some());
        assert!(demo.find_method(ExtensionPoint::Graph, "degree").is_none());
    }
}
