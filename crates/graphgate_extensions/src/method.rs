//! The [`ExtensionMethod`] trait and its call context.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use std::sync::Arc;

use graphgate_graph::{Edge, Graph, Vertex};
use serde_json::Value;

use crate::error::ExtensionError;
use crate::point::ExtensionPoint;

/// Future returned by [`ExtensionMethod::invoke`].
pub type ExtensionFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, ExtensionError>> + Send + 'a>>;

/// Describes where a method binds and what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition {
    /// Access point the method is invoked on.
    pub point: ExtensionPoint,
    /// Method name, the last segment of the extension path.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl MethodDefinition {
    /// Creates a definition with an empty description.
    pub fn new(point: ExtensionPoint, name: impl Into<String>) -> Self {
        Self {
            point,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The resource an extension is invoked on.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionTarget {
    /// A vertex snapshot.
    Vertex(Vertex),
    /// An edge snapshot.
    Edge(Edge),
    /// The graph itself.
    Graph,
}

impl ExtensionTarget {
    /// Returns the access point this target corresponds to.
    #[must_use]
    pub fn point(&self) -> ExtensionPoint {
        match self {
            Self::Vertex(_) => ExtensionPoint::Vertex,
            Self::Edge(_) => ExtensionPoint::Edge,
            Self::Graph => ExtensionPoint::Graph,
        }
    }
}

/// Everything a method receives when it is invoked.
#[derive(Clone)]
pub struct ExtensionCall {
    /// Name of the graph the request addressed.
    pub graph_name: String,
    /// Handle to that graph.
    pub graph: Arc<dyn Graph>,
    /// The resolved target.
    pub target: ExtensionTarget,
    /// Request body, if any.
    pub body: Option<Value>,
}

impl fmt::Debug for ExtensionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionCall")
            .field("graph_name", &self.graph_name)
            .field("target", &self.target)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl ExtensionCall {
    /// Returns a field of the request body.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(key))
    }
}

/// A method that can be invoked through an extension path.
///
/// The returned JSON must decode as an
/// [`ExtensionResponse`](crate::ExtensionResponse); anything else is a
/// contract violation reported by [`invoke`](crate::invoke).
pub trait ExtensionMethod: Send + Sync + 'static {
    /// Returns the binding and description of the method.
    fn definition(&self) -> MethodDefinition;

    /// Runs the method.
    fn invoke(&self, call: ExtensionCall) -> ExtensionFuture<'_>;
}

/// Adapts an async closure into an [`ExtensionMethod`].
pub struct FnMethod<F> {
    definition: MethodDefinition,
    func: F,
}

impl<F, Fut> FnMethod<F>
where
    F: Fn(ExtensionCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ExtensionError>> + Send + 'static,
{
    /// Binds `func` to `name` at `point`.
    pub fn new(point: ExtensionPoint, name: impl Into<String>, func: F) -> Self {
        Self {
            definition: MethodDefinition::new(point, name),
            func,
        }
    }

    /// Sets the method description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = description.into();
        self
    }
}

impl<F> fmt::Debug for FnMethod<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMethod")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> ExtensionMethod for FnMethod<F>
where
    F: Fn(ExtensionCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ExtensionError>> + Send + 'static,
{
    fn definition(&self) -> MethodDefinition {
        self.definition.clone()
    }

    fn invoke(&self, call: ExtensionCall) -> ExtensionFuture<'_> {
        Box::pin((self.func)(call))
    }
}
