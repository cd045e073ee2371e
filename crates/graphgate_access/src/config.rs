//! Graph configuration.
//!
//! ```json
//! {
//!   "graphs": [
//!     { "name": "tinker", "storage": "memory", "allow": ["tp.*"] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use graphgate_extensions::AllowList;
use graphgate_graph::{Graph, MemoryGraph};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating an [`AccessConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two graphs share a name.
    #[error("graph [{0}] is configured more than once")]
    DuplicateGraph(String),

    /// A graph has an empty name.
    #[error("graph names must not be empty")]
    EmptyGraphName,
}

/// Storage engine backing a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-local [`MemoryGraph`].
    #[default]
    Memory,
}

/// One configured graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Name requests address the graph by.
    pub name: String,
    /// Storage engine.
    #[serde(default)]
    pub storage: StorageKind,
    /// Extension namespaces callable on this graph. Empty denies all.
    #[serde(default)]
    pub allow: AllowList,
}

impl GraphConfig {
    /// Creates an in-memory graph entry that allows no extensions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: StorageKind::Memory,
            allow: AllowList::default(),
        }
    }

    /// Sets the allow-list.
    #[must_use]
    pub fn with_allow(mut self, allow: AllowList) -> Self {
        self.allow = allow;
        self
    }

    /// Opens the configured storage.
    #[must_use]
    pub fn open(&self) -> Arc<dyn Graph> {
        match self.storage {
            StorageKind::Memory => Arc::new(MemoryGraph::new()),
        }
    }
}

/// Access-layer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    /// Configured graphs, in declaration order.
    #[serde(default)]
    pub graphs: Vec<GraphConfig>,
}

impl AccessConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Adds a graph entry.
    #[must_use]
    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graphs.push(graph);
        self
    }

    /// Checks that every graph has a unique, non-empty name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for graph in &self.graphs {
            if graph.name.trim().is_empty() {
                return Err(ConfigError::EmptyGraphName);
            }
            if !seen.insert(graph.name.as_str()) {
                return Err(ConfigError::DuplicateGraph(graph.name.clone()));
            }
        }
        Ok(())
    }
}
