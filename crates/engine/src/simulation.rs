//! Timing and tuning for the simulated operations.
//!
//! Every artificial delay goes through a [`Scheduler`] so tests can step
//! the simulations without waiting on a real clock.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real delays on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test double: returns immediately and remembers every requested delay.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requested: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in call order.
    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn total(&self) -> Duration {
        self.requested().iter().sum()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    async fn sleep(&self, duration: Duration) {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Delays and success rates for the simulated side flows.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub connection_test_delay: Duration,
    pub import_delay: Duration,
    pub export_delay: Duration,
    pub generation_delay: Duration,
    /// Probability a connection test succeeds.
    pub connection_success_rate: f64,
    /// Probability an import succeeds.
    pub import_success_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            connection_test_delay: Duration::from_millis(2000),
            import_delay: Duration::from_millis(3000),
            export_delay: Duration::from_millis(2000),
            generation_delay: Duration::from_millis(2000),
            connection_success_rate: 0.7,
            import_success_rate: 0.8,
        }
    }
}
