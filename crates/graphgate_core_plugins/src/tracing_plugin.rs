//! Logging plugin.
//!
//! [`TracingPlugin`] publishes a [`TracingConfig`] during `build()` and
//! installs the `tracing` subscriber in `ready()`, after every other plugin
//! has had a chance to read the configuration. Log lines go to stderr,
//! leaving stdout to the response stream.
//!
//! ```
//! use graphgate_system::server::Server;
//! use graphgate_core_plugins::{TracingFormat, TracingPlugin};
//! use tracing::Level;
//!
//! let mut server = Server::new();
//! server.add_plugins(
//!     TracingPlugin::default()
//!         .with_level(Level::DEBUG)
//!         .with_format(TracingFormat::Compact)
//!         .with_env_filter("graphgate=debug"),
//! );
//! server.finish();
//! ```

use core::str::FromStr;

use graphgate_system::plugin::Plugin;
use graphgate_system::resource::GlobalResource;
use graphgate_system::server::Server;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines for log aggregation.
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig Resource
// ─────────────────────────────────────────────────────────────────────────────

/// The logging configuration in effect, as a global resource.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Maximum log level when no filter is given.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Target-specific filter, e.g. `graphgate=debug`.
    pub env_filter: Option<String>,
}

impl GlobalResource for TracingConfig {}

impl TracingConfig {
    /// Builds the [`EnvFilter`] for this configuration.
    ///
    /// An unparsable filter string falls back to the plain level.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        self.env_filter
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(self.level.as_str()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Installs a `tracing-subscriber` registry.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`TracingConfig`] | Global | Logging configuration (read-only) |
///
/// Installing is best effort: if a global subscriber already exists (as in
/// test binaries that build several servers) the existing one is kept.
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a `TracingPlugin` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a target filter in `target=level,...` form.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
            env_filter: self.env_filter.clone(),
        }
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, server: &mut Server) {
        server.insert_global(self.config());
    }

    fn ready(&self, server: &mut Server) {
        let config = server
            .get_global::<TracingConfig>()
            .map(|config| TracingConfig::clone(&config))
            .unwrap_or_else(|| self.config());

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(config.filter());
        let installed = match config.format {
            TracingFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).pretty().with_span_events(span_events))
                .try_init(),
            TracingFormat::Compact => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).compact().with_span_events(span_events))
                .try_init(),
            TracingFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json().with_span_events(span_events))
                .try_init(),
        };

        tracing::info!(
            level = %config.level,
            format = ?config.format,
            installed = installed.is_ok(),
            "logging initialized"
        );
    }

    fn cleanup(&self, _server: &mut Server) {
        tracing::info!("logging shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let plugin = TracingPlugin::default();
        assert_eq!(plugin.level, Level::INFO);
        assert_eq!(plugin.format, TracingFormat::Pretty);
        assert!(plugin.env_filter.is_none());
        assert!(!plugin.span_events);
    }

    #[test]
    fn builder_methods() {
        let plugin = TracingPlugin::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("graphgate=debug")
            .with_span_events(true);
        assert_eq!(plugin.level, Level::DEBUG);
        assert_eq!(plugin.format, TracingFormat::Json);
        assert_eq!(plugin.env_filter.as_deref(), Some("graphgate=debug"));
        assert!(plugin.span_events);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>(), Ok(TracingFormat::Json));
        assert_eq!("compact".parse::<TracingFormat>(), Ok(TracingFormat::Compact));
        assert!("xml".parse::<TracingFormat>().is_err());
        let format: TracingFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(format, TracingFormat::Pretty);
    }

    #[test]
    fn invalid_filter_falls_back_to_level() {
        let config = TracingConfig {
            level: Level::WARN,
            format: TracingFormat::Compact,
            env_filter: Some("graphgate=notalevel".into()),
        };
        assert_eq!(config.filter().to_string(), "warn");
    }

    #[test]
    fn plugin_registers_config() {
        let mut server = Server::new();
        server.add_plugins(TracingPlugin::default().with_env_filter("graphgate=trace"));
        server.finish();

        let config = server.get_global::<TracingConfig>().unwrap();
        assert_eq!(config.env_filter.as_deref(), Some("graphgate=trace"));
    }
}
