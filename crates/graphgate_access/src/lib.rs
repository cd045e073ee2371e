//! Request-facing access layer for graphgate.
//!
//! Exposes the vertices and edges of named graphs through one
//! request/response contract and routes extension calls to the methods
//! registered for the addressed access point.
//!
//! # Pipeline
//!
//! 1. A [`Request`] is validated into an immutable [`RequestContext`].
//! 2. The graph is looked up in the [`GraphRegistry`].
//! 3. The request is routed:
//!    - single-entity operations to the [`EntityGateway`]
//!    - listings to the windowed enumerator ([`enumerate()`])
//!    - extension calls through [`resolve`] and [`Resolved::invoke`]
//! 4. The [`EnvelopeBuilder`] renders the outcome as a [`Response`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use graphgate_access::{AccessLayer, AccessPlugins, EntityKind, GraphsPlugin, Operation, Request};
//! use graphgate_core_plugins::TimePlugin;
//! use graphgate_extensions::AllowList;
//! use graphgate_graph::MemoryGraph;
//! use graphgate_system::plugin::PluginGroup;
//! use graphgate_system::server::Server;
//! use serde_json::json;
//!
//! let graphs = GraphsPlugin::new().with_graph("tinker", Arc::new(MemoryGraph::new()), AllowList::default());
//! let mut server = Server::new();
//! server.add_plugins(TimePlugin::default());
//! server.add_plugins(AccessPlugins::new(graphs).build());
//! server.finish();
//!
//! let layer = AccessLayer::new(&server).unwrap();
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let created = runtime.block_on(layer.handle(
//!     Request::new("tinker", EntityKind::Vertex, Operation::Create)
//!         .with_id("1")
//!         .with_body(json!({ "name": "marko", "age": "29" })),
//! ));
//! assert_eq!(created.body["results"]["age"], 29);
//! ```

pub mod config;
pub mod dispatch;
pub mod enumerate;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod graphs;
pub mod layer;
pub mod represent;
pub mod request;

pub use config::{AccessConfig, ConfigError, GraphConfig, StorageKind};
pub use dispatch::{Resolved, resolve};
pub use enumerate::{Page, PropertyFilter, Window, enumerate, list_edges, list_incident, list_vertices};
pub use envelope::{EnvelopeBuilder, Response};
pub use error::AccessError;
pub use gateway::{EntityGateway, Payload};
pub use graphs::{ApplicationGraph, GraphRegistry, GraphsPlugin};
pub use layer::{AccessLayer, AccessPlugin, AccessPlugins};
pub use represent::{RenderOptions, Represent};
pub use request::{EntityKind, Operation, Request, RequestContext};
