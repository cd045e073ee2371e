//! Request routing.
//!
//! [`AccessLayer`] borrows the server's global registries and turns each
//! [`Request`] into a [`Response`]: entity operations go to the
//! [`EntityGateway`], listings to the enumerator, and extension calls through
//! resolution and invocation. Every outcome, failures included, leaves
//! through the [`EnvelopeBuilder`].

use std::sync::Arc;
use std::time::Instant;

use graphgate_core_plugins::{Clock, TimePlugin};
use graphgate_extensions::{
    AllowList, ExtensionCall, ExtensionPoint, ExtensionRegistry, ExtensionTarget, ExtensionsPlugin,
};
use graphgate_graph::{AnyElement, ElementId, ElementKind};
use graphgate_system::plugin::{Plugin, PluginGroup, PluginGroupBuilder, PluginId};
use graphgate_system::resource::{ResourceError, ResourceRef};
use graphgate_system::server::Server;
use serde_json::{Value, json};
use tracing::Instrument;

use crate::dispatch::resolve;
use crate::enumerate::{list_edges, list_incident, list_vertices};
use crate::envelope::{EnvelopeBuilder, Response};
use crate::error::AccessError;
use crate::gateway::{EntityGateway, Payload};
use crate::graphs::{ApplicationGraph, GraphRegistry, GraphsPlugin};
use crate::request::{EntityKind, Operation, Request, RequestContext};

// ─────────────────────────────────────────────────────────────────────────────
// AccessPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Ties the access layer to its collaborators.
///
/// Requires [`TimePlugin`], [`GraphsPlugin`] and [`ExtensionsPlugin`]. Once
/// every registry is frozen it warns about allow-list entries that match no
/// registered extension, since those usually point at a typo.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessPlugin;

impl Plugin for AccessPlugin {
    fn build(&self, _server: &mut Server) {}

    fn ready(&self, server: &mut Server) {
        let graphs = server
            .get_global::<GraphRegistry>()
            .expect("GraphRegistry should be global once GraphsPlugin is ready");
        let extensions = server
            .get_global::<ExtensionRegistry>()
            .expect("ExtensionRegistry should be global once ExtensionsPlugin is ready");

        for graph in graphs.iter() {
            for entry in graph.allow_list().entries() {
                let single = AllowList::new([entry.as_str()]);
                if !extensions.namespaces().into_iter().any(|namespace| single.allows(namespace)) {
                    tracing::warn!(
                        graph = graph.name(),
                        entry = %entry,
                        "allow-list entry matches no registered extension"
                    );
                }
            }
        }

        tracing::info!(
            graphs = graphs.len(),
            extensions = extensions.len(),
            "access layer ready"
        );
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![
            PluginId::of::<TimePlugin>(),
            PluginId::of::<GraphsPlugin>(),
            PluginId::of::<ExtensionsPlugin>(),
        ]
    }
}

/// The access layer with its registries: [`ExtensionsPlugin`], the given
/// [`GraphsPlugin`] and [`AccessPlugin`].
///
/// A [`TimePlugin`] must be added separately, usually through
/// `DefaultPlugins`.
#[derive(Debug, Clone, Default)]
pub struct AccessPlugins {
    graphs: GraphsPlugin,
}

impl AccessPlugins {
    /// Bundles the access layer around `graphs`.
    #[must_use]
    pub fn new(graphs: GraphsPlugin) -> Self {
        Self { graphs }
    }
}

impl PluginGroup for AccessPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(ExtensionsPlugin)
            .add(self.graphs)
            .add(AccessPlugin)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AccessLayer
// ─────────────────────────────────────────────────────────────────────────────

/// Request handler over a finished server.
///
/// ```
/// use graphgate_access::{AccessLayer, AccessPlugin, EntityKind, GraphsPlugin, Operation, Request};
/// use graphgate_core_plugins::TimePlugin;
/// use graphgate_extensions::{AllowList, ExtensionsPlugin};
/// use graphgate_graph::MemoryGraph;
/// use graphgate_system::server::Server;
/// use std::sync::Arc;
///
/// let mut server = Server::new();
/// server
///     .add_plugins(TimePlugin::default())
///     .add_plugins(ExtensionsPlugin)
///     .add_plugins(GraphsPlugin::new().with_graph("tinker", Arc::new(MemoryGraph::new()), AllowList::default()))
///     .add_plugins(AccessPlugin);
/// server.finish();
///
/// let layer = AccessLayer::new(&server).unwrap();
/// let request = Request::new("tinker", EntityKind::Vertex, Operation::List);
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let response = runtime.block_on(layer.handle(request));
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body["totalSize"], 0);
/// ```
pub struct AccessLayer<'s> {
    clock: ResourceRef<'s, Clock>,
    graphs: ResourceRef<'s, GraphRegistry>,
    extensions: ResourceRef<'s, ExtensionRegistry>,
}

impl core::fmt::Debug for AccessLayer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessLayer")
            .field("graphs", &*self.graphs)
            .field("extensions", &*self.extensions)
            .finish_non_exhaustive()
    }
}

impl<'s> AccessLayer<'s> {
    /// Borrows the global registries of `server`.
    ///
    /// Fails if the server was finished without the access plugins.
    pub fn new(server: &'s Server) -> Result<Self, ResourceError> {
        let resources = server.global_resources();
        Ok(Self {
            clock: resources.get::<Clock>()?,
            graphs: resources.get::<GraphRegistry>()?,
            extensions: resources.get::<ExtensionRegistry>()?,
        })
    }

    /// Handles one request.
    pub async fn handle(&self, request: Request) -> Response {
        let span = tracing::info_span!(
            "request",
            graph = %request.graph_name,
            kind = %request.entity_kind,
            operation = %request.operation,
        );

        async move {
            let started = self.clock.now();
            match self.route(request, started).await {
                Ok(response) => {
                    tracing::debug!(status = response.status, "request completed");
                    response
                }
                Err(error) => {
                    error.report();
                    EnvelopeBuilder::error(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Decodes a JSON request document and handles it.
    ///
    /// Undecodable documents fail with [`AccessError::MalformedRequest`].
    pub async fn handle_json(&self, raw: &str) -> Response {
        match serde_json::from_str::<Request>(raw) {
            Ok(request) => self.handle(request).await,
            Err(error) => {
                let error = AccessError::MalformedRequest(error.to_string());
                error.report();
                EnvelopeBuilder::error(error)
            }
        }
    }

    async fn route(&self, request: Request, started: Instant) -> Result<Response, AccessError> {
        let context = RequestContext::new(&request, started)?;
        let graph = self
            .graphs
            .get(context.graph_name())
            .ok_or_else(|| AccessError::GraphNotFound(context.graph_name().to_owned()))?;

        if request.operation == Operation::Extension {
            return self.extension(graph, request).await;
        }

        let envelope = match request.entity_kind.element_kind() {
            Some(kind) => self.element(&context, graph, kind, request)?,
            None => self.graph(&context, graph, request.operation)?,
        };
        envelope.build(&self.clock)
    }

    fn graph(
        &self,
        context: &RequestContext,
        graph: &ApplicationGraph,
        operation: Operation,
    ) -> Result<EnvelopeBuilder, AccessError> {
        if operation != Operation::Get {
            return Err(AccessError::UnsupportedOperation {
                kind: EntityKind::Graph,
                operation,
            });
        }
        Ok(EnvelopeBuilder::new(context.started())
            .with_results(json!({ "name": graph.name() }))
            .with_links(self.extensions.links(graph.allow_list(), ExtensionPoint::Graph)))
    }

    fn element(
        &self,
        context: &RequestContext,
        graph: &ApplicationGraph,
        kind: ElementKind,
        request: Request,
    ) -> Result<EnvelopeBuilder, AccessError> {
        let storage = graph.graph().as_ref();
        let gateway = EntityGateway::new(storage);
        let render = context.render();
        let envelope = EnvelopeBuilder::new(context.started());

        match request.operation {
            Operation::List => {
                let (results, total) = match (kind, request.id, request.direction) {
                    (ElementKind::Vertex, None, _) => {
                        let page = list_vertices(storage, context.window(), context.filters())?;
                        (render.render_all(&page.items)?, page.total)
                    }
                    (ElementKind::Vertex, Some(id), Some(direction)) => {
                        let page = list_incident(storage, &id, direction, context.window(), context.filters())?;
                        (render.render_all(&page.items)?, page.total)
                    }
                    (ElementKind::Vertex, Some(_), None) => return Err(AccessError::MissingField("direction")),
                    (ElementKind::Edge, _, _) => {
                        let page = list_edges(storage, context.window(), context.filters())?;
                        (render.render_all(&page.items)?, page.total)
                    }
                };
                Ok(envelope.with_results(Value::Array(results)).with_total_size(total))
            }
            Operation::Get => {
                let id = required_id(request.id)?;
                let element = gateway.fetch(kind, &id)?;
                Ok(envelope
                    .with_results(render.render(&element)?)
                    .with_links(self.extensions.links(graph.allow_list(), request.entity_kind.extension_point())))
            }
            Operation::Create => {
                let payload = Payload::parse(request.body.as_ref())?;
                let element = gateway.create(kind, request.id, &payload)?;
                Ok(envelope.with_results(render.render(&element)?))
            }
            Operation::Update => {
                let id = required_id(request.id)?;
                let payload = Payload::parse(request.body.as_ref())?;
                let element = gateway.update(kind, &id, &payload)?;
                Ok(envelope.with_results(render.render(&element)?))
            }
            Operation::Delete => {
                let id = required_id(request.id)?;
                gateway.delete(kind, &id, &request.keys)?;
                Ok(envelope)
            }
            Operation::Extension => Err(AccessError::UnsupportedOperation {
                kind: request.entity_kind,
                operation: request.operation,
            }),
        }
    }

    async fn extension(&self, graph: &ApplicationGraph, request: Request) -> Result<Response, AccessError> {
        let raw_path = request
            .extension_path
            .as_deref()
            .ok_or(AccessError::MissingField("extensionPath"))?;
        let resolved = resolve(
            &self.extensions,
            graph.allow_list(),
            request.entity_kind.extension_point(),
            raw_path,
        )?;

        let target = match request.entity_kind.element_kind() {
            None => ExtensionTarget::Graph,
            Some(kind) => {
                let id = required_id(request.id.clone())?;
                match EntityGateway::new(graph.graph().as_ref()).fetch(kind, &id)? {
                    AnyElement::Vertex(vertex) => ExtensionTarget::Vertex(vertex),
                    AnyElement::Edge(edge) => ExtensionTarget::Edge(edge),
                }
            }
        };

        let call = ExtensionCall {
            graph_name: graph.name().to_owned(),
            graph: Arc::clone(graph.graph()),
            target,
            body: request.body,
        };
        let response = resolved.invoke(call).await?;
        tracing::debug!(path = %resolved.path(), status = response.status, "extension responded");
        Ok(EnvelopeBuilder::forward(response))
    }
}

fn required_id(id: Option<ElementId>) -> Result<ElementId, AccessError> {
    id.filter(|id| !id.as_str().is_empty())
        .ok_or(AccessError::MissingField("id"))
}
