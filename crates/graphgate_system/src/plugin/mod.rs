//! Plugin system for extensible server functionality.
//!
//! Every capability of a graphgate server (storage bindings, the extension
//! registry, logging, the access layer itself) is delivered by a plugin. The
//! [`Server`] only orders plugins and runs their lifecycle hooks.
//!
//! # Example
//!
//! ```
//! use graphgate_system::plugin::{Plugin, PluginId};
//! use graphgate_system::server::Server;
//!
//! struct StoragePlugin;
//! impl Plugin for StoragePlugin {
//!     fn build(&self, _server: &mut Server) {}
//! }
//!
//! struct ReportingPlugin;
//! impl Plugin for ReportingPlugin {
//!     fn build(&self, _server: &mut Server) {}
//!
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<StoragePlugin>()]
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(ReportingPlugin).add_plugins(StoragePlugin);
//! server.finish();
//! ```

use core::any::TypeId;

use crate::server::Server;

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a plugin type.
///
/// Used for dependency resolution and duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of server functionality.
///
/// The server drives each plugin through a fixed lifecycle:
///
/// 1. **Build** - `build()` in dependency order; register resources and
///    contribute to registries that are still mutable.
/// 2. **Ready** - `ready()` in dependency order; freeze registries into
///    global resources and validate cross-plugin wiring.
/// 3. **Cleanup** - `cleanup()` in reverse dependency order.
///
/// Requests are only served after the ready phase, so anything a plugin
/// publishes as a global resource is immutable while requests run.
///
/// # Example
///
/// ```ignore
/// impl Plugin for GremlinExtensionPlugin {
///     fn build(&self, server: &mut Server) {
///         let mut registry = server
///             .get_resource_mut::<ExtensionRegistry>()
///             .expect("ExtensionsPlugin must be added first");
///         registry.register(GremlinExtension::default());
///     }
///
///     fn dependencies(&self) -> Vec<PluginId> {
///         vec![PluginId::of::<ExtensionsPlugin>()]
///     }
/// }
/// ```
pub trait Plugin: Send + Sync + 'static {
    /// Configures the server. Called once, in dependency order.
    fn build(&self, server: &mut Server);

    /// Called after every plugin has been built.
    fn ready(&self, _server: &mut Server) {}

    /// Called when the server shuts down, in reverse dependency order.
    fn cleanup(&self, _server: &mut Server) {}

    /// Returns the plugin's name for diagnostics.
    ///
    /// Defaults to the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Declares plugins that must be added before this one is built.
    ///
    /// [`Server::finish`] panics if a dependency is missing.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Returns true if this plugin can only be added once.
    fn is_unique(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins Trait (for add_plugins polymorphism)
// ─────────────────────────────────────────────────────────────────────────────

/// Types that can be handed to [`Server::add_plugins`].
///
/// Implemented for every [`Plugin`] and for [`PluginGroupBuilder`].
pub trait Plugins {
    /// Adds these plugins to the server.
    fn add_to_server(self, server: &mut Server);
}

impl<P: Plugin> Plugins for P {
    fn add_to_server(self, server: &mut Server) {
        server.add_plugin_boxed(PluginId::of::<P>(), Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_server(self, server: &mut Server) {
        for boxed in self.plugins {
            server.add_plugin_boxed(boxed.id, boxed.plugin);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroup
// ─────────────────────────────────────────────────────────────────────────────

/// A bundle of plugins that are usually added together.
///
/// ```ignore
/// Server::new()
///     .add_plugins(DefaultPlugins.build().disable::<TracingPlugin>());
/// ```
pub trait PluginGroup {
    /// Returns the plugins in this group.
    fn build(self) -> PluginGroupBuilder;
}

/// A boxed plugin with its identity captured before type erasure.
pub(crate) struct BoxedPlugin {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn Plugin>,
}

/// Builder for customizing plugin groups.
#[derive(Default)]
pub struct PluginGroupBuilder {
    pub(crate) plugins: Vec<BoxedPlugin>,
}

impl PluginGroupBuilder {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Appends a plugin to the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(BoxedPlugin {
            id: PluginId::of::<P>(),
            plugin: Box::new(plugin),
        });
        self
    }

    /// Replaces the plugin of type `P` in place, or appends it if absent.
    #[must_use]
    pub fn set<P: Plugin>(mut self, plugin: P) -> Self {
        let id = PluginId::of::<P>();
        let boxed = BoxedPlugin {
            id,
            plugin: Box::new(plugin),
        };
        match self.plugins.iter().position(|p| p.id == id) {
            Some(index) => self.plugins[index] = boxed,
            None => self.plugins.push(boxed),
        }
        self
    }

    /// Removes the plugin of type `P`. No-op if it is not in the group.
    #[must_use]
    pub fn disable<P: Plugin>(mut self) -> Self {
        let id = PluginId::of::<P>();
        self.plugins.retain(|p| p.id != id);
        self
    }

    /// Returns true if the group contains a plugin of type `P`.
    #[must_use]
    pub fn contains<P: Plugin>(&self) -> bool {
        let id = PluginId::of::<P>();
        self.plugins.iter().any(|p| p.id == id)
    }

    /// Returns the number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the group contains no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Storage;
    impl Plugin for Storage {
        fn build(&self, _server: &mut Server) {}
    }

    struct Registry;
    impl Plugin for Registry {
        fn build(&self, _server: &mut Server) {}
        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<Storage>()]
        }
    }

    struct Limits(usize);
    impl Plugin for Limits {
        fn build(&self, _server: &mut Server) {}
    }

    #[test]
    fn plugin_id_identity() {
        assert_eq!(PluginId::of::<Storage>(), PluginId::of::<Storage>());
        assert_ne!(PluginId::of::<Storage>(), PluginId::of::<Registry>());
        assert_eq!(PluginId::of::<Storage>().type_id(), TypeId::of::<Storage>());
        assert!(PluginId::of::<Storage>().type_name().ends_with("Storage"));
    }

    #[test]
    fn plugin_defaults() {
        assert!(Storage.is_unique());
        assert!(Storage.dependencies().is_empty());
        assert!(Storage.name().contains("Storage"));
        assert_eq!(Registry.dependencies(), vec![PluginId::of::<Storage>()]);
    }

    #[test]
    fn group_add_disable_contains() {
        let group = PluginGroupBuilder::new().add(Storage).add(Registry);
        assert_eq!(group.len(), 2);
        assert!(group.contains::<Registry>());

        let group = group.disable::<Registry>().disable::<Limits>();
        assert_eq!(group.len(), 1);
        assert!(!group.contains::<Registry>());
    }

    #[test]
    fn group_set_replaces_in_place() {
        let group = PluginGroupBuilder::new()
            .add(Limits(1))
            .add(Storage)
            .set(Limits(2));
        assert_eq!(group.len(), 2);
        assert_eq!(group.plugins[0].id, PluginId::of::<Limits>());

        let group = PluginGroupBuilder::new().set(Storage);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn empty_group() {
        let group = PluginGroupBuilder::new();
        assert!(group.is_empty());
        assert_eq!(group.len(), 0);
    }
}
