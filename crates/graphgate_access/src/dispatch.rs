//! Extension resolution and invocation.
//!
//! Resolution runs in a fixed order: parse the path, check the graph's
//! allow-list, find the extension, find the method bound at the access point.
//! A denied namespace fails exactly like an unregistered one, so callers can
//! not probe which extensions exist.

use graphgate_extensions::{
    AllowList, ExtensionCall, ExtensionMethod, ExtensionPath, ExtensionPoint, ExtensionRegistry, ExtensionResponse,
    invoke,
};

use crate::error::AccessError;

/// A method located for one request.
pub struct Resolved<'r> {
    path: ExtensionPath,
    point: ExtensionPoint,
    method: &'r dyn ExtensionMethod,
}

impl core::fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolved")
            .field("path", &self.path)
            .field("point", &self.point)
            .finish_non_exhaustive()
    }
}

impl Resolved<'_> {
    /// Returns the parsed path.
    #[must_use]
    pub fn path(&self) -> &ExtensionPath {
        &self.path
    }

    /// Returns the access point the method is bound at.
    #[must_use]
    pub fn point(&self) -> ExtensionPoint {
        self.point
    }

    /// Invokes the method.
    ///
    /// Returned errors, panics and contract violations map to their
    /// [`AccessError`] kinds. A response carrying an error status becomes
    /// [`AccessError::ExtensionErrorResponse`] so it is forwarded verbatim.
    pub async fn invoke(&self, call: ExtensionCall) -> Result<ExtensionResponse, AccessError> {
        let response = invoke(self.method, call).await.inspect_err(|error| {
            tracing::debug!(path = %self.path, %error, "extension invocation failed");
        })?;

        if response.is_error() {
            return Err(AccessError::ExtensionErrorResponse(response));
        }
        Ok(response)
    }
}

/// Locates the method addressed by `raw_path` at `point`.
pub fn resolve<'r>(
    registry: &'r ExtensionRegistry,
    allow_list: &AllowList,
    point: ExtensionPoint,
    raw_path: &str,
) -> Result<Resolved<'r>, AccessError> {
    let path = ExtensionPath::parse(raw_path)?;

    if !allow_list.allows(path.namespace()) {
        return Err(AccessError::NamespaceDenied(path.to_string()));
    }

    let method = registry
        .find_extension(path.namespace())
        .and_then(|descriptor| descriptor.find_method(point, path.method()))
        .ok_or_else(|| AccessError::ExtensionNotFound(path.to_string()))?;

    tracing::trace!(%path, %point, "extension resolved");
    Ok(Resolved { path, point, method })
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_extensions::{ExtensionTarget, FnMethod};
    use graphgate_graph::MemoryGraph;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn registry() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register_method(
            "acme.tools",
            FnMethod::new(ExtensionPoint::Vertex, "ping", |_call| async {
                Ok(ExtensionResponse::ok(json!("pong")).into())
            }),
        );
        registry.register_method(
            "acme.tools",
            FnMethod::new(ExtensionPoint::Graph, "teapot", |_call| async {
                Ok(ExtensionResponse::error(418, "short and stout").into())
            }),
        );
        registry.register_method(
            "acme.tools",
            FnMethod::new(ExtensionPoint::Graph, "bare", |_call| async { Ok(json!([1, 2])) }),
        );
        registry
    }

    fn graph_call() -> ExtensionCall {
        ExtensionCall {
            graph_name: "tinker".into(),
            graph: Arc::new(MemoryGraph::new()),
            target: ExtensionTarget::Graph,
            body: None,
        }
    }

    #[test]
    fn resolves_bound_method() {
        let registry = registry();
        let resolved = resolve(&registry, &AllowList::allow_all(), ExtensionPoint::Vertex, "acme.tools/ping").unwrap();
        assert_eq!(resolved.path().namespace(), "acme.tools");
        assert_eq!(resolved.point(), ExtensionPoint::Vertex);
    }

    #[test]
    fn malformed_path_fails_first() {
        let registry = registry();
        let result = resolve(&registry, &AllowList::default(), ExtensionPoint::Vertex, "ping");
        assert!(matches!(result, Err(AccessError::MalformedPath(_))));
    }

    #[test]
    fn denied_before_lookup() {
        let registry = registry();
        let allow = AllowList::new(["other.*"]);
        let result = resolve(&registry, &allow, ExtensionPoint::Vertex, "acme.tools/ping");
        assert!(matches!(result, Err(AccessError::NamespaceDenied(_))));
    }

    #[test]
    fn wrong_point_or_method_is_not_found() {
        let registry = registry();
        let allow = AllowList::allow_all();
        for (point, path) in [
            (ExtensionPoint::Edge, "acme.tools/ping"),
            (ExtensionPoint::Vertex, "acme.tools/pong"),
            (ExtensionPoint::Vertex, "acme/ping"),
        ] {
            let result = resolve(&registry, &allow, point, path);
            assert!(matches!(result, Err(AccessError::ExtensionNotFound(_))), "{path} at {point}");
        }
    }

    #[test]
    fn denied_and_unregistered_look_the_same() {
        let registry = registry();
        let Err(denied) = resolve(&registry, &AllowList::default(), ExtensionPoint::Vertex, "acme.tools/ping") else {
            panic!("expected denial");
        };
        let Err(missing) = resolve(&registry, &AllowList::allow_all(), ExtensionPoint::Edge, "acme.tools/ping") else {
            panic!("expected not found");
        };
        assert_eq!(denied.status(), missing.status());
        assert_eq!(denied.message(), missing.message());
        assert_eq!(denied.detail(), missing.detail());
    }

    #[tokio::test]
    async fn error_status_is_forwarded() {
        let registry = registry();
        let resolved = resolve(&registry, &AllowList::allow_all(), ExtensionPoint::Graph, "acme.tools/teapot").unwrap();
        let Err(AccessError::ExtensionErrorResponse(response)) = resolved.invoke(graph_call()).await else {
            panic!("expected an error response");
        };
        assert_eq!(response.status, 418);
        assert_eq!(response.entity, json!({ "message": "short and stout" }));
    }

    #[tokio::test]
    async fn non_response_is_contract_violation() {
        let registry = registry();
        let resolved = resolve(&registry, &AllowList::allow_all(), ExtensionPoint::Graph, "acme.tools/bare").unwrap();
        let result = resolved.invoke(graph_call()).await;
        assert!(matches!(result, Err(AccessError::ExtensionContractViolation(_))));
    }

    #[tokio::test]
    async fn success_passes_through() {
        let registry = registry();
        let resolved = resolve(&registry, &AllowList::allow_all(), ExtensionPoint::Vertex, "acme.tools/ping").unwrap();
        let response = resolved.invoke(graph_call()).await.unwrap();
        assert_eq!(response.entity, Value::from("pong"));
    }
}
