//! Extension framework for graphgate.
//!
//! Extensions add behavior at fixed access points (a vertex, an edge or a
//! whole graph) without touching the core dispatch code. They are registered
//! by plugins during the server's build phase and are immutable afterwards.
//!
//! # Quick Start
//!
//! ```
//! use graphgate_extensions::{
//!     ExtensionPoint, ExtensionRegistry, ExtensionResponse, FnMethod,
//! };
//! use serde_json::json;
//!
//! let mut registry = ExtensionRegistry::new();
//! registry.register_method(
//!     "tp.degree",
//!     FnMethod::new(ExtensionPoint::Vertex, "count", |_call| async {
//!         Ok(ExtensionResponse::ok(json!({ "degree": 0 })).into())
//!     }),
//! );
//!
//! let descriptor = registry.find_extension("tp.degree").unwrap();
//! assert!(descriptor.find_method(ExtensionPoint::Vertex, "count").is_some());
//! ```
//!
//! # Architecture
//!
//! - [`ExtensionPath`] - parses `namespace/method` request paths
//! - [`AllowList`] - per-graph default-deny namespace filter
//! - [`ExtensionMethod`] - trait for a single invocable method
//! - [`Extension`] - trait for a namespace bundling several methods
//! - [`ExtensionRegistry`] - stores descriptors and resolves bindings
//! - [`ExtensionsPlugin`] - manages registry lifecycle
//! - [`invoke`] - calls a method and enforces the response contract

pub mod allow;
pub mod error;
pub mod extension;
pub mod invoke;
pub mod method;
pub mod path;
pub mod point;
pub mod registry;
pub mod response;

pub use allow::AllowList;
pub use error::{ExtensionError, InvocationError, PathError};
pub use extension::Extension;
pub use invoke::invoke;
pub use method::{ExtensionCall, ExtensionFuture, ExtensionMethod, ExtensionTarget, FnMethod, MethodDefinition};
pub use path::ExtensionPath;
pub use point::ExtensionPoint;
pub use registry::{ExtensionDescriptor, ExtensionRegistry, ExtensionsPlugin};
pub use response::ExtensionResponse;
