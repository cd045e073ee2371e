//! Named graphs served by the access layer.
//!
//! [`GraphsPlugin`] owns the [`GraphRegistry`] lifecycle: graphs from the
//! configuration and from [`GraphsPlugin::with_graph`] are inserted during
//! `build()`, other plugins may add theirs, and the registry becomes a
//! read-only global in `ready()`.

use std::sync::Arc;

use graphgate_extensions::AllowList;
use graphgate_graph::Graph;
use graphgate_system::plugin::Plugin;
use graphgate_system::resource::GlobalResource;
use graphgate_system::server::Server;
use indexmap::IndexMap;

use crate::config::AccessConfig;

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationGraph
// ─────────────────────────────────────────────────────────────────────────────

/// A graph together with its name and extension allow-list.
#[derive(Clone)]
pub struct ApplicationGraph {
    name: String,
    graph: Arc<dyn Graph>,
    allow_list: AllowList,
}

impl core::fmt::Debug for ApplicationGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApplicationGraph")
            .field("name", &self.name)
            .field("allow_list", &self.allow_list)
            .finish_non_exhaustive()
    }
}

impl ApplicationGraph {
    /// Binds `graph` under `name`.
    pub fn new(name: impl Into<String>, graph: Arc<dyn Graph>, allow_list: AllowList) -> Self {
        Self {
            name: name.into(),
            graph,
            allow_list,
        }
    }

    /// Returns the graph's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the storage handle.
    #[must_use]
    pub fn graph(&self) -> &Arc<dyn Graph> {
        &self.graph
    }

    /// Returns the namespaces callable on this graph.
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Graphs by name.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: IndexMap<String, ApplicationGraph>,
}

impl GlobalResource for GraphRegistry {}

impl GraphRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a graph.
    ///
    /// # Panics
    ///
    /// Panics if a graph with the same name is already registered.
    pub fn insert(&mut self, graph: ApplicationGraph) {
        let name = graph.name.clone();
        if self.graphs.insert(name.clone(), graph).is_some() {
            panic!("graph [{name}] is already registered");
        }
        tracing::debug!(graph = %name, "graph registered");
    }

    /// Returns the graph named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ApplicationGraph> {
        self.graphs.get(name)
    }

    /// Returns every graph name in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// Returns every graph in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ApplicationGraph> {
        self.graphs.values()
    }

    /// Returns the number of graphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns true if no graph is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphsPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Provides the [`GraphRegistry`].
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`GraphRegistry`] | Global | Graphs by name (read-only after startup) |
///
/// ```
/// use std::sync::Arc;
/// use graphgate_access::{GraphRegistry, GraphsPlugin};
/// use graphgate_extensions::AllowList;
/// use graphgate_graph::MemoryGraph;
/// use graphgate_system::server::Server;
///
/// let mut server = Server::new();
/// server.add_plugins(GraphsPlugin::new().with_graph("tinker", Arc::new(MemoryGraph::new()), AllowList::allow_all()));
/// server.finish();
///
/// let registry = server.get_global::<GraphRegistry>().unwrap();
/// assert!(registry.get("tinker").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphsPlugin {
    graphs: Vec<ApplicationGraph>,
}

impl GraphsPlugin {
    /// Creates a plugin with no graphs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens every graph in `config`.
    #[must_use]
    pub fn from_config(config: &AccessConfig) -> Self {
        let graphs = config
            .graphs
            .iter()
            .map(|entry| ApplicationGraph::new(entry.name.clone(), entry.open(), entry.allow.clone()))
            .collect();
        Self { graphs }
    }

    /// Adds a pre-built graph.
    #[must_use]
    pub fn with_graph(mut self, name: impl Into<String>, graph: Arc<dyn Graph>, allow_list: AllowList) -> Self {
        self.graphs.push(ApplicationGraph::new(name, graph, allow_list));
        self
    }
}

impl Plugin for GraphsPlugin {
    fn build(&self, server: &mut Server) {
        let mut registry = GraphRegistry::new();
        for graph in &self.graphs {
            registry.insert(graph.clone());
        }
        server.insert_resource(registry);
    }

    fn ready(&self, server: &mut Server) {
        let registry = server
            .remove_resource::<GraphRegistry>()
            .expect("GraphRegistry should exist from build phase");
        tracing::info!(graphs = ?registry.names().collect::<Vec<_>>(), "graphs loaded");
        server.insert_global(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use graphgate_graph::MemoryGraph;

    #[test]
    fn plugin_loads_config_and_extra_graphs() {
        let config = AccessConfig::default()
            .with_graph(GraphConfig::new("tinker").with_allow(AllowList::new(["tp.*"])))
            .with_graph(GraphConfig::new("empty"));

        let mut server = Server::new();
        server.add_plugins(GraphsPlugin::from_config(&config).with_graph(
            "extra",
            Arc::new(MemoryGraph::new()),
            AllowList::default(),
        ));
        server.finish();

        let registry = server.get_global::<GraphRegistry>().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["tinker", "empty", "extra"]);
        assert!(registry.get("tinker").unwrap().allow_list().allows("tp.degree"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn other_plugins_can_register_during_build() {
        struct Extra;
        impl Plugin for Extra {
            fn build(&self, server: &mut Server) {
                let mut registry = server
                    .get_resource_mut::<GraphRegistry>()
                    .expect("GraphsPlugin must be added first");
                registry.insert(ApplicationGraph::new(
                    "late",
                    Arc::new(MemoryGraph::new()),
                    AllowList::default(),
                ));
            }

            fn dependencies(&self) -> Vec<graphgate_system::plugin::PluginId> {
                vec![graphgate_system::plugin::PluginId::of::<GraphsPlugin>()]
            }
        }

        let mut server = Server::new();
        server.add_plugins(GraphsPlugin::new()).add_plugins(Extra);
        server.finish();
        assert_eq!(server.get_global::<GraphRegistry>().unwrap().len(), 1);
    }

    #[test]
    #[should_panic(expected = "graph [g] is already registered")]
    fn duplicate_graph_panics() {
        let mut registry = GraphRegistry::new();
        registry.insert(ApplicationGraph::new("g", Arc::new(MemoryGraph::new()), AllowList::default()));
        registry.insert(ApplicationGraph::new("g", Arc::new(MemoryGraph::new()), AllowList::default()));
    }
}
