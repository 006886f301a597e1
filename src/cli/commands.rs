//! Command definitions for the Pomodoro Timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{
    Settings, SettingsError, TaskFilter, TaskSort, MAX_BREAK_MINUTES, MAX_FOCUS_MINUTES,
    MAX_LONG_BREAK_INTERVAL,
};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro timer with a to-do list, in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-tasks",
    version,
    about = "Pomodoro timer with an attached to-do list",
    long_about = "A terminal Pomodoro timer with focus, short break and long break modes,\n\
                  an attached to-do list with time estimates, and a selectable alarm sound.\n\
                  Run without a command to start the interactive timer.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory for tasks and preferences
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the interactive timer
    Run(RunArgs),

    /// Manage the to-do list
    #[command(subcommand)]
    Task(TaskCommand),

    /// Manage the alarm sound
    #[command(subcommand)]
    Sound(SoundCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task
    Add {
        /// Task text
        text: String,

        /// Estimated minutes
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        estimate: Option<u32>,
    },

    /// List tasks
    List {
        /// Which tasks to show
        #[arg(short, long, value_enum, default_value_t = TaskFilter::All)]
        filter: TaskFilter,

        /// Ordering of the list
        #[arg(short, long, value_enum, default_value_t = TaskSort::Date)]
        sort: TaskSort,
    },

    /// Mark a task completed, or active again
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
    },
}

/// Sound subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SoundCommand {
    /// List the available alarm sounds
    List,

    /// Select the alarm sound
    Set {
        /// Sound id (see `sound list`)
        id: String,
    },

    /// Set the alarm volume
    Volume {
        /// Volume from 0.0 to 1.0
        #[arg(value_parser = parse_volume)]
        level: f32,
    },

    /// Play the selected alarm sound
    Test,
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Focus duration in minutes (1-120)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=MAX_FOCUS_MINUTES as i64)
    )]
    pub focus: u32,

    /// Short break duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..=MAX_BREAK_MINUTES as i64)
    )]
    pub short_break: u32,

    /// Long break duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value = "15",
        value_parser = clap::value_parser!(u32).range(1..=MAX_BREAK_MINUTES as i64)
    )]
    pub long_break: u32,

    /// Focus sessions before a long break (1-12)
    #[arg(
        short,
        long,
        default_value = "4",
        value_parser = clap::value_parser!(u32).range(1..=MAX_LONG_BREAK_INTERVAL as i64)
    )]
    pub interval: u32,

    /// Disable the alarm sound
    #[arg(long)]
    pub no_sound: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            focus: 25,
            short_break: 5,
            long_break: 15,
            interval: 4,
            no_sound: false,
        }
    }
}

impl RunArgs {
    /// Builds validated timer settings from the flags.
    pub fn settings(&self) -> Result<Settings, SettingsError> {
        let settings = Settings::default()
            .with_focus_minutes(self.focus)
            .with_short_break_minutes(self.short_break)
            .with_long_break_minutes(self.long_break)
            .with_long_break_interval(self.interval);
        settings.validate()?;
        Ok(settings)
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a volume level between 0.0 and 1.0.
fn parse_volume(s: &str) -> Result<f32, String> {
    let level: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=1.0).contains(&level) {
        return Err("volume must be between 0.0 and 1.0".to_string());
    }
    Ok(level)
}

// ============================================================================
// Tests
// ============================================================================
