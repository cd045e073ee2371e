//! Time plugin and the [`Clock`] resource.
//!
//! Query times reported by the access layer are measured with the global
//! [`Clock`], so tests can freeze or advance time through [`MockClock`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use graphgate_system::plugin::Plugin;
use graphgate_system::resource::GlobalResource;
use graphgate_system::server::Server;

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Source of the current instant.
///
/// ```
/// use std::time::Instant;
/// use graphgate_core_plugins::ClockProvider;
///
/// struct FixedClock(Instant);
///
/// impl ClockProvider for FixedClock {
///     fn now(&self) -> Instant {
///         self.0
///     }
/// }
/// ```
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock Resource
// ─────────────────────────────────────────────────────────────────────────────

/// Global time source.
///
/// Backed by the system clock unless [`TimePlugin::with_clock`] installs
/// another provider.
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl GlobalResource for Clock {}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

impl Clock {
    fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a clock backed by `provider`.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the time elapsed since `earlier`.
    ///
    /// Saturates to zero if the provider moved backwards.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }

    /// Returns the time elapsed since `earlier` in fractional milliseconds.
    #[must_use]
    pub fn millis_since(&self, earlier: Instant) -> f64 {
        self.elapsed_since(earlier).as_secs_f64() * 1_000.0
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TimePlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Registers the global [`Clock`].
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`Clock`] | Global | Time source, mockable for testing |
#[derive(Clone, Default)]
pub struct TimePlugin {
    clock: Option<Arc<dyn ClockProvider>>,
}

impl TimePlugin {
    /// Creates a `TimePlugin` using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `TimePlugin` with a custom clock provider.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn ClockProvider>) -> Self {
        Self { clock: Some(clock) }
    }
}

impl Plugin for TimePlugin {
    fn build(&self, server: &mut Server) {
        let clock = match &self.clock {
            Some(provider) => Clock::with_provider(Arc::clone(provider)),
            None => Clock::system(),
        };
        server.insert_global(clock);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock
// ─────────────────────────────────────────────────────────────────────────────

/// Clock whose time only moves when told to.
///
/// ```ignore
/// let mock = Arc::new(MockClock::new(Instant::now()));
/// server.add_plugins(TimePlugin::with_clock(mock.clone()));
///
/// mock.advance(Duration::from_millis(5));
/// ```
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct MockClock {
    current: parking_lot::RwLock<Instant>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to `start`.
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to `instant`.
    pub fn set(&self, instant: Instant) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_tracks_real_time() {
        let clock = Clock::default();
        let before = Instant::now();
        let now = clock.now();
        assert!(now >= before);
        assert!(now <= Instant::now());
    }

    #[test]
    fn millis_since_is_fractional() {
        let mock = Arc::new(MockClock::new(Instant::now()));
        let clock = Clock::with_provider(mock.clone());
        let start = clock.now();

        mock.advance(Duration::from_micros(2_500));
        assert!((clock.millis_since(start) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn elapsed_saturates_when_time_goes_backwards() {
        let origin = Instant::now();
        let mock = Arc::new(MockClock::new(origin + Duration::from_secs(1)));
        let clock = Clock::with_provider(mock.clone());
        let later = clock.now();

        mock.set(origin);
        assert_eq!(clock.elapsed_since(later), Duration::ZERO);
    }

    #[test]
    fn time_plugin_installs_provider() {
        let start = Instant::now();
        let mock = Arc::new(MockClock::new(start));

        let mut server = Server::new();
        server.add_plugins(TimePlugin::with_clock(mock.clone()));
        server.finish();

        mock.advance(Duration::from_secs(60));
        let clock = server.get_global::<Clock>().unwrap();
        assert_eq!(clock.elapsed_since(start), Duration::from_secs(60));
    }
}
