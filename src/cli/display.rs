//! Display utilities for the Pomodoro Timer CLI.
//!
//! This module provides formatted output for:
//! - Task rows and list summaries
//! - The sound catalog
//! - Success and error messages

use crate::session::format_clock;
use crate::sound::{Sound, SOUNDS};
use crate::types::{Task, TaskId};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Formats a task as one list row: `<short id>  [x] text  (25m)`.
    pub fn format_task(task: &Task) -> String {
        let mut row = format!(
            "{}  [{}] {}",
            task.id.short(),
            if task.completed { "x" } else { " " },
            task.text
        );
        if let Some(minutes) = task.estimated_time {
            row.push_str(&format!("  ({}m)", minutes));
        }
        row
    }

    /// Shows a task list, or `empty_message` when there is nothing to show.
    pub fn show_tasks(tasks: &[&Task], empty_message: &str) {
        if tasks.is_empty() {
            println!("{}", empty_message);
            return;
        }
        for task in tasks {
            println!("{}", Self::format_task(task));
        }
    }

    /// Formats the list footer.
    pub fn format_task_summary(total: usize, active: usize) -> String {
        format!(
            "{} total, {} active, {} completed",
            total,
            active,
            total - active
        )
    }

    /// Shows a success message for an added task.
    pub fn show_task_added(id: TaskId) {
        println!("* Added task {}", id.short());
    }

    /// Shows a success message for a toggled task.
    pub fn show_task_toggled(task: &Task) {
        let state = if task.completed { "completed" } else { "active" };
        println!("* Marked task {} {}", task.id.short(), state);
    }

    /// Shows a success message for a deleted task.
    pub fn show_task_deleted(task: &Task) {
        println!("* Deleted task {}: {}", task.id.short(), task.text);
    }

    /// Formats one catalog row, marking the selected sound.
    pub fn format_sound(sound: &Sound, selected: bool) -> String {
        format!(
            "{} {:<14} {}  ({})",
            if selected { "*" } else { " " },
            sound.id,
            sound.name,
            format_clock(sound.tone.total_duration().as_secs() as u32)
        )
    }

    /// Shows the sound catalog and the current volume.
    pub fn show_sounds(selected_id: &str, volume: f32) {
        for sound in SOUNDS {
            println!("{}", Self::format_sound(sound, sound.id == selected_id));
        }
        println!("Volume: {}", Self::format_volume(volume));
    }

    /// Formats a volume level as a percentage.
    pub fn format_volume(volume: f32) -> String {
        format!("{}%", (volume * 100.0).round() as u32)
    }

    /// Shows a success message for a sound selection.
    pub fn show_sound_selected(sound: &Sound) {
        println!("* Alarm sound set to {}", sound.name);
    }

    /// Shows a success message for a volume change.
    pub fn show_volume_set(volume: f32) {
        println!("* Volume set to {}", Self::format_volume(volume));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================
