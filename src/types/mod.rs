//! Core data types for the Pomodoro timer.
//!
//! This module defines the data structures used for:
//! - Timer modes and their settings
//! - Timer state and the transitions between modes
//! - To-do items and the views derived from them

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Mode
// ============================================================================

/// One of the three timer phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Work session (a "pomodoro")
    Focus,
    /// Short break between focus sessions
    ShortBreak,
    /// Long break granted every `long_break_interval` focus sessions
    LongBreak,
}

impl Mode {
    /// All modes in selector order.
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    /// Returns the stable identifier of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortBreak => "short_break",
            Mode::LongBreak => "long_break",
        }
    }

    /// Returns the label shown in the mode selector and the terminal title.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Pomodoro",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Returns true for either break mode.
    pub fn is_break(&self) -> bool {
        matches!(self, Mode::ShortBreak | Mode::LongBreak)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Focus
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Maximum focus duration in minutes.
pub const MAX_FOCUS_MINUTES: u32 = 120;

/// Maximum break duration in minutes.
pub const MAX_BREAK_MINUTES: u32 = 60;

/// Maximum number of focus sessions before a long break.
pub const MAX_LONG_BREAK_INTERVAL: u32 = 12;

/// Errors reported by [`Settings::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A mode duration is outside its allowed range.
    #[error("{mode} duration must be between 1 and {max} minutes (got {minutes})")]
    DurationOutOfRange {
        /// Offending mode
        mode: Mode,
        /// Configured value
        minutes: u32,
        /// Upper bound for the mode
        max: u32,
    },

    /// The long-break interval is outside its allowed range.
    #[error("long break interval must be between 1 and {MAX_LONG_BREAK_INTERVAL} (got {0})")]
    IntervalOutOfRange(u32),
}

/// Timer configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Focus duration in minutes (1-120)
    pub focus_minutes: u32,
    /// Short break duration in minutes (1-60)
    pub short_break_minutes: u32,
    /// Long break duration in minutes (1-60)
    pub long_break_minutes: u32,
    /// Focus sessions that precede a long break (1-12)
    pub long_break_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            long_break_interval: 4,
        }
    }
}

impl Settings {
    /// Returns a copy with the specified focus duration.
    pub fn with_focus_minutes(mut self, minutes: u32) -> Self {
        self.focus_minutes = minutes;
        self
    }

    /// Returns a copy with the specified short break duration.
    pub fn with_short_break_minutes(mut self, minutes: u32) -> Self {
        self.short_break_minutes = minutes;
        self
    }

    /// Returns a copy with the specified long break duration.
    pub fn with_long_break_minutes(mut self, minutes: u32) -> Self {
        self.long_break_minutes = minutes;
        self
    }

    /// Returns a copy with the specified long-break interval.
    pub fn with_long_break_interval(mut self, interval: u32) -> Self {
        self.long_break_interval = interval;
        self
    }

    /// Returns the configured duration of `mode` in minutes.
    pub fn minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    /// Returns the full duration of `mode` in seconds.
    pub fn duration_secs(&self, mode: Mode) -> u32 {
        self.minutes(mode) * 60
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for mode in Mode::ALL {
            let max = match mode {
                Mode::Focus => MAX_FOCUS_MINUTES,
                Mode::ShortBreak | Mode::LongBreak => MAX_BREAK_MINUTES,
            };
            let minutes = self.minutes(mode);
            if minutes < 1 || minutes > max {
                return Err(SettingsError::DurationOutOfRange { mode, minutes, max });
            }
        }
        if self.long_break_interval < 1 || self.long_break_interval > MAX_LONG_BREAK_INTERVAL {
            return Err(SettingsError::IntervalOutOfRange(self.long_break_interval));
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Represents the current state of the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Current mode
    pub mode: Mode,
    /// Remaining seconds in the current mode
    pub remaining_seconds: u32,
    /// Whether the countdown is running
    pub is_running: bool,
    /// Number of completed focus sessions
    pub completed_focus_count: u32,
    /// Timer settings
    pub settings: Settings,
}

impl TimerState {
    /// Creates a new state, idle in focus mode with the full duration.
    pub fn new(settings: Settings) -> Self {
        Self {
            mode: Mode::Focus,
            remaining_seconds: settings.duration_secs(Mode::Focus),
            is_running: false,
            completed_focus_count: 0,
            settings,
        }
    }

    /// Switches to `mode`, stopping the countdown and resetting the remaining time.
    pub fn select_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.remaining_seconds = self.settings.duration_secs(mode);
        self.is_running = false;
    }

    /// Starts the countdown.
    ///
    /// Returns false if the timer was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        true
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns false if the timer was not running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        true
    }

    /// Stops the countdown and restores the full duration of the current mode.
    pub fn reset(&mut self) {
        self.select_mode(self.mode);
    }

    /// Decrements the timer by one second.
    ///
    /// Returns true when this tick took the remaining time from 1 to 0.
    /// Does nothing while the timer is not running.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        self.remaining_seconds == 0
    }

    /// Records the end of the current mode and returns the mode that follows it.
    ///
    /// Completing a focus session increments the completed count; every
    /// `long_break_interval`-th focus session is followed by a long break.
    /// An interval of zero is treated as one.
    pub fn advance(&mut self) -> Mode {
        match self.mode {
            Mode::Focus => {
                self.completed_focus_count += 1;
                let interval = self.settings.long_break_interval.max(1);
                if self.completed_focus_count % interval == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        }
    }

    /// Returns the full duration of the current mode in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.settings.duration_secs(self.mode)
    }

    /// Returns the seconds elapsed in the current mode.
    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds().saturating_sub(self.remaining_seconds)
    }

    /// Returns the elapsed fraction of the current mode in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.elapsed_seconds()) / f64::from(total)
    }

    /// Returns true if the countdown was started and then paused part-way.
    pub fn is_paused(&self) -> bool {
        !self.is_running && self.remaining_seconds < self.total_seconds()
    }
}

// ============================================================================
// Task
// ============================================================================

/// Opaque, never reused identifier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the first eight characters, enough to address a task from the CLI.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Display text, never blank
    pub text: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
    /// Estimated time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
}

impl Task {
    /// Creates an active task with a fresh identifier.
    pub fn new(text: impl Into<String>, estimated_time: Option<u32>) -> Self {
        Self {
            id: TaskId::new(),
            text: text.into(),
            completed: false,
            estimated_time,
        }
    }
}

/// Which tasks a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TaskFilter {
    /// Every task
    #[default]
    All,
    /// Tasks not yet completed
    Active,
    /// Completed tasks
    Completed,
}

impl TaskFilter {
    /// Returns true if `task` belongs in this view.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }

    /// Returns the filter that follows this one in the UI.
    pub fn next(&self) -> Self {
        match self {
            TaskFilter::All => TaskFilter::Active,
            TaskFilter::Active => TaskFilter::Completed,
            TaskFilter::Completed => TaskFilter::All,
        }
    }

    /// Returns the label shown in the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
        }
    }
}

/// Ordering of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TaskSort {
    /// Creation order
    #[default]
    Date,
    /// By text
    Alphabetical,
    /// By estimated time, tasks without an estimate last
    Time,
}

impl TaskSort {
    /// Returns the sort that follows this one in the UI.
    pub fn next(&self) -> Self {
        match self {
            TaskSort::Date => TaskSort::Alphabetical,
            TaskSort::Alphabetical => TaskSort::Time,
            TaskSort::Time => TaskSort::Date,
        }
    }

    /// Returns the label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            TaskSort::Date => "Sort by Date",
            TaskSort::Alphabetical => "Sort Alphabetically",
            TaskSort::Time => "Sort by Time",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
