//! Response envelopes.
//!
//! Successful requests render as `{results, totalSize?, queryTime, links?}`,
//! failures as `{message, error?}`. Extension responses bypass both shapes
//! and are forwarded as the extension built them.

use std::time::Instant;

use graphgate_core_plugins::Clock;
use graphgate_extensions::ExtensionResponse;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AccessError;

/// Status of every successful non-extension response.
pub const STATUS_OK: u16 = 200;

/// A finished response, independent of any transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP-equivalent status code.
    pub status: u16,
    /// Response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Response document.
    pub body: Value,
}

impl Response {
    /// Returns true for status codes of 400 and above.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Returns the error message of a failed response.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

impl From<ExtensionResponse> for Response {
    fn from(response: ExtensionResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.entity,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_size: Option<u64>,
    query_time: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Assembles the success envelope of one request.
///
/// ```
/// use std::time::Instant;
/// use graphgate_access::EnvelopeBuilder;
/// use graphgate_core_plugins::Clock;
/// use serde_json::json;
///
/// let clock = Clock::default();
/// let response = EnvelopeBuilder::new(Instant::now())
///     .with_results(json!([]))
///     .with_total_size(0)
///     .build(&clock)
///     .unwrap();
/// assert_eq!(response.body["totalSize"], 0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    started: Instant,
    results: Option<Value>,
    total_size: Option<u64>,
    links: Vec<String>,
}

impl EnvelopeBuilder {
    /// Starts an envelope for a request that began at `started`.
    #[must_use]
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            results: None,
            total_size: None,
            links: Vec::new(),
        }
    }

    /// Sets the results.
    #[must_use]
    pub fn with_results(mut self, results: Value) -> Self {
        self.results = Some(results);
        self
    }

    /// Sets the size of the whole filtered collection.
    #[must_use]
    pub fn with_total_size(mut self, total_size: u64) -> Self {
        self.total_size = Some(total_size);
        self
    }

    /// Sets the hypermedia links.
    #[must_use]
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    /// Finishes the envelope, stamping the query time from `clock`.
    pub fn build(self, clock: &Clock) -> Result<Response, AccessError> {
        let body = SuccessBody {
            results: self.results,
            total_size: self.total_size,
            query_time: clock.millis_since(self.started),
            links: self.links,
        };
        Ok(Response {
            status: STATUS_OK,
            headers: IndexMap::new(),
            body: serde_json::to_value(body)?,
        })
    }

    /// Forwards an extension's own response unchanged.
    #[must_use]
    pub fn forward(response: ExtensionResponse) -> Response {
        response.into()
    }

    /// Renders `error` as an error response.
    ///
    /// Error responses produced by extensions are forwarded verbatim.
    #[must_use]
    pub fn error(error: AccessError) -> Response {
        if let AccessError::ExtensionErrorResponse(response) = error {
            return response.into();
        }
        let body = ErrorBody {
            message: error.message(),
            error: error.detail(),
        };
        let body = serde_json::to_value(&body).unwrap_or_else(|_| Value::String(error.message()));
        Response {
            status: error.status(),
            headers: IndexMap::new(),
            body,
        }
    }
}
