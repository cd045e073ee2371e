//! Resource storage.
//!
//! - [`Resources`] - Type-safe storage keyed by the resource type
//! - [`GlobalResource`] - Marker for read-only, server-lifetime resources
//!
//! # Scopes
//!
//! | Scope | Inserted with | Lifetime | Mutability |
//! |-------|---------------|----------|------------|
//! | Build-time | [`Server::insert_resource()`](crate::server::Server::insert_resource) | Until removed | Mutable during startup |
//! | Global | [`Server::insert_global()`](crate::server::Server::insert_global) | Server | Read-only |
//!
//! Registries follow a two-phase pattern: a plugin inserts a mutable
//! build-time resource in `build()`, other plugins register into it, and the
//! owning plugin moves it to the global scope in `ready()`. From then on
//! request handlers only ever read it.

#[expect(
    clippy::module_inception,
    reason = "resource.rs contains the core Resource trait and Resources container logic"
)]
mod resource;

pub use resource::{
    GlobalResource, Resource, ResourceError, ResourceId, ResourceRef, ResourceRefMut, Resources,
};
