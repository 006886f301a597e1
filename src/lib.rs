//! Pomodoro Timer Library
//!
//! This library provides the core functionality for the pomodoro-tasks CLI.
//! It includes:
//! - Timer engine and cancellable tick driver
//! - Task store with filtered and sorted views
//! - Local key-value storage for tasks and preferences
//! - Alarm sound catalog and playback
//! - Session controller tying the parts together
//! - Terminal UI and CLI command parsing
//! - Type definitions for settings and state

pub mod cli;
pub mod session;
pub mod sound;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod tui;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{Mode, Settings, Task, TaskFilter, TaskId, TaskSort, TimerState};

pub use session::{format_clock, Preferences, Session};

pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};

pub use tasks::{TaskError, TaskStore};

pub use timer::{Tick, TickDriver, TimerEngine, TimerEvent};

// Re-export sound types
pub use sound::{
    default_sound, find_sound, try_create_player, MockSoundPlayer, RodioSoundPlayer, Sound,
    SoundError, SoundPlayer,
};
