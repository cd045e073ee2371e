//! Access points an extension method can bind to.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind of resource an extension method is invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPoint {
    /// Invoked on a single vertex.
    Vertex,
    /// Invoked on a single edge.
    Edge,
    /// Invoked on the graph as a whole.
    Graph,
}

impl ExtensionPoint {
    /// Returns the lowercase name of the point.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
