//! Plugin lifecycle and resource storage for graphgate (Layer 1).
//!
//! `graphgate_system` provides the primitives every other graphgate crate
//! builds on:
//!
//! - [`plugin`] - Plugin trait, plugin identity and plugin groups
//! - [`resource`] - Type-keyed resource storage with read-only globals
//! - [`server`] - Server runtime that orchestrates plugins
//!
//! # Architecture
//!
//! - **Layer 1** (`graphgate_system`, `graphgate_core_plugins`): lifecycle and infrastructure
//! - **Layer 2** (`graphgate_graph`, `graphgate_extensions`): storage capability and extension registry
//! - **Layer 3** (`graphgate_access`): the request-facing access layer
//!
//! # Example
//!
//! ```
//! use graphgate_system::plugin::Plugin;
//! use graphgate_system::resource::GlobalResource;
//! use graphgate_system::server::Server;
//!
//! #[derive(Default)]
//! struct Limits { max_page: usize }
//! impl GlobalResource for Limits {}
//!
//! struct LimitsPlugin;
//!
//! impl Plugin for LimitsPlugin {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(Limits { max_page: 500 });
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(LimitsPlugin);
//! server.finish();
//! assert_eq!(server.get_global::<Limits>().unwrap().max_page, 500);
//! ```

/// Plugin trait for extensible functionality.
pub mod plugin;

/// Resource container management.
pub mod resource;

/// Server runtime for plugin orchestration.
pub mod server;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::plugin::*;
    pub use crate::resource::*;
    pub use crate::server::*;
}
