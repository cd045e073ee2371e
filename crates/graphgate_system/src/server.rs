//! Server runtime for plugin orchestration.
//!
//! The [`Server`] owns every plugin and every resource. It does nothing by
//! itself; graph bindings, the extension registry and the access layer are
//! all contributed by plugins.
//!
//! # Lifecycle
//!
//! 1. **Dependency resolution** - validate and topologically order plugins
//! 2. **Build** - `plugin.build()` in dependency order
//! 3. **Ready** - `plugin.ready()` in dependency order
//! 4. **Serve** - request handlers read global resources concurrently
//! 5. **Cleanup** - `plugin.cleanup()` in reverse order
//!
//! # Resource Scoping
//!
//! Build-time resources ([`insert_resource()`](Server::insert_resource)) are
//! mutable and meant for registries that other plugins fill during startup.
//! Global resources ([`insert_global()`](Server::insert_global)) are
//! read-only and shared by all requests.

use std::collections::VecDeque;

use crate::plugin::{Plugin, PluginId, Plugins};
use crate::resource::{GlobalResource, Resource, ResourceRef, ResourceRefMut, Resources};
use hashbrown::{HashMap, HashSet};

/// Progress of [`Server::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BuildState {
    #[default]
    NotStarted,
    Building,
    Built,
}

/// Internal entry for a registered plugin.
struct PluginEntry {
    id: PluginId,
    plugin: Box<dyn Plugin>,
    name: String,
}

/// The runtime that orders plugins and stores resources.
///
/// `Server` is `Sync`; once [`finish()`](Self::finish) has returned it can be
/// shared by reference between request workers.
///
/// # Example
///
/// ```
/// use graphgate_system::server::Server;
/// use graphgate_system::plugin::Plugin;
///
/// struct Noop;
/// impl Plugin for Noop {
///     fn build(&self, _server: &mut Server) {}
/// }
///
/// let mut server = Server::new();
/// server.add_plugins(Noop);
/// server.finish();
/// assert!(server.is_built());
/// ```
pub struct Server {
    /// Read-only, server-lifetime resources shared by every request.
    global: Resources,

    /// Mutable resources used while plugins are being built.
    resources: Resources,

    /// Plugins added but not built yet.
    pending_plugins: Vec<PluginEntry>,

    /// Plugins that have been built, in build order.
    built_plugins: Vec<PluginEntry>,

    /// Ids of every plugin added so far (duplicate detection).
    plugin_ids: HashSet<PluginId>,

    build_state: BuildState,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Creates an empty server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Resources::new(),
            resources: Resources::new(),
            pending_plugins: Vec::new(),
            built_plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            build_state: BuildState::NotStarted,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a plugin or a plugin group.
    ///
    /// Plugins added while the server is building (from inside another
    /// plugin's `build()`) are built immediately.
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin is added twice.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_server(self);
        self
    }

    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();

        assert!(
            !(plugin.is_unique() && self.plugin_ids.contains(&id)),
            "Plugin '{name}' is unique and was already added"
        );
        self.plugin_ids.insert(id);

        let entry = PluginEntry { id, plugin, name };
        if self.build_state == BuildState::Building {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        } else {
            self.pending_plugins.push(entry);
        }
    }

    /// Returns true if a plugin of type `P` has been added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Build-time Resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts a mutable build-time resource, returning any previous value.
    pub fn insert_resource<R: Resource>(&mut self, resource: R) -> Option<R> {
        self.resources.insert(resource)
    }

    /// Returns true if a build-time resource of type `R` exists.
    #[must_use]
    pub fn contains_resource<R: Resource>(&self) -> bool {
        self.resources.contains::<R>()
    }

    /// Borrows a build-time resource.
    #[must_use]
    pub fn get_resource<R: Resource>(&self) -> Option<ResourceRef<'_, R>> {
        self.resources.get::<R>().ok()
    }

    /// Mutably borrows a build-time resource.
    #[must_use]
    pub fn get_resource_mut<R: Resource>(&self) -> Option<ResourceRefMut<'_, R>> {
        self.resources.get_mut::<R>().ok()
    }

    /// Removes a build-time resource and returns it.
    pub fn remove_resource<R: Resource>(&mut self) -> Option<R> {
        self.resources.remove::<R>()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Global Resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts a global, read-only resource, returning any previous value.
    pub fn insert_global<R: GlobalResource>(&mut self, resource: R) -> Option<R> {
        self.global.insert(resource)
    }

    /// Returns true if a global resource of type `R` exists.
    #[must_use]
    pub fn contains_global<R: GlobalResource>(&self) -> bool {
        self.global.contains::<R>()
    }

    /// Borrows a global resource.
    ///
    /// Globals are never borrowed mutably, so this only returns `None` when
    /// the resource was never inserted.
    #[must_use]
    pub fn get_global<R: GlobalResource>(&self) -> Option<ResourceRef<'_, R>> {
        self.global.get::<R>().ok()
    }

    /// Returns the global resources container.
    #[must_use]
    pub fn global_resources(&self) -> &Resources {
        &self.global
    }

    /// Returns whether [`finish()`](Self::finish) has completed.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.build_state == BuildState::Built
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Builds and readies every plugin.
    ///
    /// # Panics
    ///
    /// - If a plugin's dependency was never added
    /// - If plugin dependencies form a cycle
    /// - If called more than once
    pub fn finish(&mut self) {
        assert!(
            self.build_state == BuildState::NotStarted,
            "Server::finish() was already called. Cannot build twice."
        );

        let ordered = self.order_pending_plugins();

        self.build_state = BuildState::Building;
        for entry in ordered {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        }

        // `ready()` needs `&mut self`, so the list is detached while it runs.
        // Plugins added from inside `ready()` are built immediately and land
        // in the fresh list; they are readied afterwards.
        let mut readied = core::mem::take(&mut self.built_plugins);
        for entry in &readied {
            entry.plugin.ready(self);
        }
        loop {
            let late = core::mem::take(&mut self.built_plugins);
            if late.is_empty() {
                break;
            }
            for entry in &late {
                entry.plugin.ready(self);
            }
            readied.extend(late);
        }
        self.built_plugins = readied;

        self.build_state = BuildState::Built;
    }

    /// Runs the cleanup hook of every built plugin, dependents first.
    pub fn cleanup(&mut self) {
        let built = core::mem::take(&mut self.built_plugins);
        for entry in built.iter().rev() {
            entry.plugin.cleanup(self);
        }
        self.built_plugins = built;
    }

    /// Orders pending plugins so that every plugin follows its dependencies.
    ///
    /// Ties keep insertion order.
    fn order_pending_plugins(&mut self) -> Vec<PluginEntry> {
        let pending = core::mem::take(&mut self.pending_plugins);
        let index_of: HashMap<PluginId, usize> = pending
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id, index))
            .collect();

        let mut in_degree = vec![0usize; pending.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); pending.len()];

        for (index, entry) in pending.iter().enumerate() {
            for dependency in entry.plugin.dependencies() {
                match index_of.get(&dependency) {
                    Some(&dep_index) => {
                        dependents[dep_index].push(index);
                        in_degree[index] += 1;
                    }
                    None if self.built_plugins.iter().any(|p| p.id == dependency) => {}
                    None => panic!(
                        "Plugin '{}' requires '{}' which was not added",
                        entry.name,
                        dependency.type_name()
                    ),
                }
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| index)
            .collect();
        let mut order = Vec::with_capacity(pending.len());

        while let Some(index) = queue.pop_front() {
            order.push(index);
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() != pending.len() {
            let cycle: Vec<&str> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, degree)| **degree > 0)
                .map(|(index, _)| pending[index].name.as_str())
                .collect();
            panic!("Circular dependency detected among plugins: {cycle:?}");
        }

        let mut slots: Vec<Option<PluginEntry>> = pending.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }
}
