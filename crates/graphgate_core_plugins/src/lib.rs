//! Core infrastructure plugins for graphgate.
//!
//! - [`TimePlugin`] - Global [`Clock`] used to measure query time, mockable for tests
//! - [`TracingPlugin`] - Logging via the `tracing` crate
//! - [`DefaultPlugins`] - Bundle of both
//!
//! # Feature Flags
//!
//! - `test-utils` - Enables [`MockClock`] for deterministic timing in tests
//!
//! # Example
//!
//! ```
//! use graphgate_system::server::Server;
//! use graphgate_system::plugin::PluginGroup;
//! use graphgate_core_plugins::{Clock, DefaultPlugins, TracingPlugin};
//!
//! let mut server = Server::new();
//! server.add_plugins(DefaultPlugins.build().disable::<TracingPlugin>());
//! server.finish();
//! assert!(server.contains_global::<Clock>());
//! ```

mod time;
mod tracing_plugin;

pub use time::{Clock, ClockProvider, TimePlugin};
pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};

#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;

use graphgate_system::plugin::{PluginGroup, PluginGroupBuilder};

/// Default infrastructure plugins.
///
/// Includes [`TimePlugin`] and [`TracingPlugin`]. Swap either for a
/// configured instance with [`PluginGroupBuilder::set`]:
///
/// ```ignore
/// server.add_plugins(
///     DefaultPlugins
///         .build()
///         .set(TracingPlugin::default().with_format(TracingFormat::Json)),
/// );
/// ```
pub struct DefaultPlugins;

impl PluginGroup for DefaultPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(TimePlugin::default())
            .add(TracingPlugin::default())
    }
}
