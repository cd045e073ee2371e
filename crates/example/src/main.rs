//! Example graphgate server driven over stdin.
//!
//! Reads one JSON request per line and writes one JSON response per line.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! echo '{"graphName":"tinker","entityKind":"vertex","operation":"list"}' | graphgate-demo
//! ```
//!
//! Without `GRAPHGATE_CONFIG` a seeded in-memory graph named `tinker` is
//! served with the `demo` extension enabled. With it, the graphs of the
//! named configuration file are opened instead.

use std::error::Error;
use std::sync::Arc;

use example::{DemoPlugin, seed};
use graphgate_access::{AccessConfig, AccessLayer, AccessPlugins, GraphsPlugin};
use graphgate_core_plugins::DefaultPlugins;
use graphgate_extensions::AllowList;
use graphgate_graph::MemoryGraph;
use graphgate_system::plugin::PluginGroup;
use graphgate_system::server::Server;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const CONFIG_VAR: &str = "GRAPHGATE_CONFIG";

fn graphs() -> Result<GraphsPlugin, Box<dyn Error>> {
    if let Ok(path) = std::env::var(CONFIG_VAR) {
        let config = AccessConfig::from_path(&path)?;
        return Ok(GraphsPlugin::from_config(&config));
    }

    let graph = Arc::new(MemoryGraph::new());
    seed(graph.as_ref())?;
    Ok(GraphsPlugin::new().with_graph("tinker", graph, AllowList::new(["demo.*"])))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();

    let mut server = Server::new();
    server
        .add_plugins(DefaultPlugins.build())
        .add_plugins(AccessPlugins::new(graphs()?).build())
        .add_plugins(DemoPlugin);
    server.finish();

    let layer = AccessLayer::new(&server)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = layer.handle_json(&line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    drop(layer);
    server.cleanup();
    Ok(())
}
