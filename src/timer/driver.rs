//! Cancellable one-second tick driver.
//!
//! The driver owns at most one background task that sends a [`Tick`] every
//! period. Each tick carries the generation of the driver run that produced
//! it; cancelling bumps the generation so ticks already queued from an
//! earlier run are recognised as stale and dropped by the receiver.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A tick message produced by a [`TickDriver`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Generation of the run that produced this tick.
    pub generation: u64,
}

/// Repeating tick source with an explicit cancel handle.
pub struct TickDriver {
    tx: mpsc::UnboundedSender<Tick>,
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Creates an idle driver that will send ticks on `tx` once per second.
    pub fn new(tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self::with_period(tx, TICK_PERIOD)
    }

    /// Creates an idle driver with a custom period.
    pub fn with_period(tx: mpsc::UnboundedSender<Tick>, period: Duration) -> Self {
        Self {
            tx,
            period,
            generation: 0,
            handle: None,
        }
    }

    /// Starts a new run. The first tick fires one period from now.
    ///
    /// Returns false (and does nothing) if a run is already active.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let tx = self.tx.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    trace!("Tick receiver closed, stopping driver {}", generation);
                    break;
                }
            }
        }));

        debug!("Tick driver started (generation {})", generation);
        true
    }

    /// Stops the active run, if any. Ticks it already queued become stale.
    ///
    /// Returns true if a run was active.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                self.generation += 1;
                debug!("Tick driver cancelled");
                true
            }
            None => false,
        }
    }

    /// Returns true if a run is active.
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Returns true if `tick` was produced by the active run.
    pub fn is_current(&self, tick: Tick) -> bool {
        self.handle.is_some() && tick.generation == self.generation
    }

    /// Returns the generation of the active (or next) run.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for TickDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickDriver")
            .field("period", &self.period)
            .field("generation", &self.generation)
            .field("active", &self.is_active())
            .finish()
    }
}
