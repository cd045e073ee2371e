//! Extension registry and plugin.
//!
//! The [`ExtensionRegistry`] stores one [`ExtensionDescriptor`] per namespace
//! and resolves `(namespace, access point, method)` bindings. The
//! [`ExtensionsPlugin`] manages the registry lifecycle using the two-phase
//! initialization pattern (mutable during `build()`, frozen to a
//! `GlobalResource` in `ready()`).
//!
//! # Usage
//!
//! ```ignore
//! use graphgate_extensions::{ExtensionRegistry, ExtensionsPlugin};
//!
//! // 1. Add ExtensionsPlugin to the server
//! server.add_plugins(ExtensionsPlugin);
//!
//! // 2. Register extensions in your plugin's build()
//! impl Plugin for GremlinPlugin {
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<ExtensionsPlugin>()]
//!     }
//!
//!     fn build(&self, server: &mut Server) {
//!         let mut registry = server.get_resource_mut::<ExtensionRegistry>()
//!             .expect("ExtensionsPlugin must be added first");
//!         registry.register(GremlinExtension::default());
//!     }
//! }
//! ```

use std::sync::Arc;

use graphgate_system::plugin::Plugin;
use graphgate_system::resource::GlobalResource;
use graphgate_system::server::Server;
use indexmap::IndexMap;

use crate::allow::AllowList;
use crate::extension::Extension;
use crate::method::{ExtensionMethod, MethodDefinition};
use crate::point::ExtensionPoint;

// ─────────────────────────────────────────────────────────────────────────────
// ExtensionDescriptor
// ─────────────────────────────────────────────────────────────────────────────

/// All methods registered under one namespace.
pub struct ExtensionDescriptor {
    namespace: String,
    methods: IndexMap<ExtensionPoint, IndexMap<String, Arc<dyn ExtensionMethod>>>,
}

impl core::fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("namespace", &self.namespace)
            .field("methods", &self.definitions().collect::<Vec<_>>())
            .finish()
    }
}

impl ExtensionDescriptor {
    fn new(namespace: String) -> Self {
        Self {
            namespace,
            methods: IndexMap::new(),
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Finds the method bound to `name` at `point`.
    #[must_use]
    pub fn find_method(&self, point: ExtensionPoint, name: &str) -> Option<&dyn ExtensionMethod> {
        self.methods
            .get(&point)
            .and_then(|bound| bound.get(name))
            .map(AsRef::as_ref)
    }

    /// Returns the names of the methods bound at `point`.
    pub fn method_names(&self, point: ExtensionPoint) -> impl Iterator<Item = &str> {
        self.methods
            .get(&point)
            .into_iter()
            .flat_map(|bound| bound.keys().map(String::as_str))
    }

    /// Returns the definitions of every method in the namespace.
    pub fn definitions(&self) -> impl Iterator<Item = MethodDefinition> + '_ {
        self.methods
            .values()
            .flat_map(|bound| bound.values().map(|method| method.definition()))
    }

    fn bind(&mut self, method: Arc<dyn ExtensionMethod>) {
        let MethodDefinition { point, name, .. } = method.definition();
        let bound = self.methods.entry(point).or_default();
        assert!(
            !bound.contains_key(&name),
            "Extension method '{}/{name}' is already registered for {point}",
            self.namespace
        );
        bound.insert(name, method);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ExtensionRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of available extensions.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: IndexMap<String, ExtensionDescriptor>,
}

impl core::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

impl GlobalResource for ExtensionRegistry {}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extensions: IndexMap::new(),
        }
    }

    /// Registers all methods of an extension.
    ///
    /// # Panics
    ///
    /// Panics if any method is already bound at the same point in the same
    /// namespace.
    pub fn register(&mut self, extension: impl Extension) {
        let namespace = extension.namespace().to_owned();
        for method in extension.methods() {
            self.bind(&namespace, Arc::from(method));
        }
    }

    /// Registers a single method under `namespace`.
    ///
    /// # Panics
    ///
    /// Panics if the method is already bound at the same point in the same
    /// namespace.
    pub fn register_method(&mut self, namespace: impl Into<String>, method: impl ExtensionMethod) {
        self.bind(&namespace.into(), Arc::new(method));
    }

    fn bind(&mut self, namespace: &str, method: Arc<dyn ExtensionMethod>) {
        self.extensions
            .entry(namespace.to_owned())
            .or_insert_with(|| ExtensionDescriptor::new(namespace.to_owned()))
            .bind(method);
    }

    /// Finds the descriptor of a namespace. Matching is exact.
    #[must_use]
    pub fn find_extension(&self, namespace: &str) -> Option<&ExtensionDescriptor> {
        self.extensions.get(namespace)
    }

    /// Returns whether any method is registered under `namespace`.
    #[must_use]
    pub fn has(&self, namespace: &str) -> bool {
        self.extensions.contains_key(namespace)
    }

    /// Returns the registered namespaces in registration order.
    #[must_use]
    pub fn namespaces(&self) -> Vec<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    /// Returns the `namespace/method` links a graph may follow at `point`.
    #[must_use]
    pub fn links(&self, allow_list: &AllowList, point: ExtensionPoint) -> Vec<String> {
        self.extensions
            .values()
            .filter(|descriptor| allow_list.allows(descriptor.namespace()))
            .flat_map(|descriptor| {
                descriptor
                    .method_names(point)
                    .map(move |method| format!("{}/{method}", descriptor.namespace()))
            })
            .collect()
    }

    /// Returns the number of registered namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ExtensionsPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Plugin that provides the [`ExtensionRegistry`] global resource.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionsPlugin;

impl Plugin for ExtensionsPlugin {
    fn build(&self, server: &mut Server) {
        server.insert_resource(ExtensionRegistry::new());
    }

    fn ready(&self, server: &mut Server) {
        let registry = server
            .remove_resource::<ExtensionRegistry>()
            .expect("ExtensionRegistry should exist from build phase");
        tracing::debug!(namespaces = ?registry.namespaces(), "extension registry frozen");
        server.insert_global(registry);
    }
}
