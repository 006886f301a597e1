//! Timer engine for the Pomodoro timer.
//!
//! This module provides the timer state machine:
//! - Mode selection, start, pause and reset
//! - One-second countdown steps
//! - Automatic advance to the next mode when the countdown ends
//! - Long break after every `long_break_interval` focus sessions
//!
//! Every transition that changes the state is reported as a [`TimerEvent`]
//! on the observer channel. Transitions that are no-ops emit nothing.

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::types::{Mode, Settings, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for the display and other observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A mode was selected (explicitly or by auto-advance)
    ModeSelected {
        /// The new mode
        mode: Mode,
        /// Full duration of the new mode
        remaining_seconds: u32,
    },
    /// Countdown started
    Started {
        /// Current mode
        mode: Mode,
    },
    /// Countdown paused
    Paused {
        /// Remaining seconds at the time of pausing
        remaining_seconds: u32,
    },
    /// Countdown reset to the full duration of the current mode
    Reset {
        /// Current mode
        mode: Mode,
    },
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// The countdown reached zero and the timer moved to the next mode
    Completed {
        /// Mode that ended
        finished: Mode,
        /// Mode that follows
        next: Mode,
        /// Total completed focus sessions
        completed_focus_count: u32,
    },
}

/// Outcome of a countdown that reached zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Mode that ended
    pub finished: Mode,
    /// Mode the timer switched to (idle)
    pub next: Mode,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that manages the Pomodoro timer state and events.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new engine, idle in focus mode.
    pub fn new(settings: Settings, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(settings),
            event_tx,
        }
    }

    /// Switches to `mode`, stopping the countdown and resetting the remaining time.
    ///
    /// Always permitted, including while running.
    pub fn select_mode(&mut self, mode: Mode) {
        self.state.select_mode(mode);
        debug!("Mode selected: {}", mode.as_str());
        self.emit(TimerEvent::ModeSelected {
            mode,
            remaining_seconds: self.state.remaining_seconds,
        });
    }

    /// Starts the countdown.
    ///
    /// Returns false (and does nothing) if the timer is already running.
    pub fn start(&mut self) -> bool {
        if !self.state.start() {
            return false;
        }
        debug!("Timer started in {} mode", self.state.mode.as_str());
        self.emit(TimerEvent::Started {
            mode: self.state.mode,
        });
        true
    }

    /// Pauses the countdown.
    ///
    /// Returns false (and does nothing) if the timer is not running.
    pub fn pause(&mut self) -> bool {
        if !self.state.pause() {
            return false;
        }
        debug!("Timer paused at {}s", self.state.remaining_seconds);
        self.emit(TimerEvent::Paused {
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Stops the countdown and restores the full duration of the current mode.
    pub fn reset(&mut self) {
        self.state.reset();
        debug!("Timer reset in {} mode", self.state.mode.as_str());
        self.emit(TimerEvent::Reset {
            mode: self.state.mode,
        });
    }

    /// Advances the countdown by one second.
    ///
    /// When the remaining time goes from 1 to 0 the engine computes the next
    /// mode and switches to it, leaving the timer idle. Does nothing while
    /// the timer is not running.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.state.is_running {
            return None;
        }

        let completed = self.state.tick();
        self.emit(TimerEvent::Tick {
            remaining_seconds: self.state.remaining_seconds,
        });

        if completed {
            Some(self.handle_timer_complete())
        } else {
            None
        }
    }

    /// Handles timer completion (mode transitions).
    fn handle_timer_complete(&mut self) -> Completion {
        let finished = self.state.mode;
        let next = self.state.advance();

        info!(
            "{} finished ({} focus sessions completed), next: {}",
            finished.label(),
            self.state.completed_focus_count,
            next.label()
        );

        self.emit(TimerEvent::Completed {
            finished,
            next,
            completed_focus_count: self.state.completed_focus_count,
        });
        self.select_mode(next);

        Completion { finished, next }
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the settings the engine was created with.
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("No timer event observer");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
