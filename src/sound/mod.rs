//! Sound playback system for the Pomodoro timer.
//!
//! This module provides the alarm played when a timer mode ends:
//!
//! - A static catalog of selectable sounds
//! - Synthesized tone patterns (no audio assets)
//! - Non-blocking playback with a volume level
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SoundPlayer    │ ← Main interface (fire-and-forget)
//! └────────┬─────────┘
//!          │ play(sound, volume)
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Sound catalog   │────▶│   TonePattern    │
//! │  (SOUNDS)        │     │  (sine + gaps)   │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pomodoro_tasks::sound::{default_sound, RodioSoundPlayer};
//!
//! let player = RodioSoundPlayer::new(false).expect("audio init");
//! player.play(default_sound(), 0.5).expect("playback failed");
//! ```

mod catalog;
mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use catalog::{cycle_sound, default_sound, find_sound, Sound, SOUNDS};
pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::TonePattern;

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays `sound` once at `volume` (0.0 - 1.0).
    ///
    /// This method must not block; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot be started.
    fn play(&self, sound: &Sound, volume: f32) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, sound: &Sound, volume: f32) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, sound, volume)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self)
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self)
    }
}

/// A recorded call to [`MockSoundPlayer::play`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayCall {
    /// Id of the sound played.
    pub sound_id: &'static str,
    /// Volume it was played at.
    pub volume: f32,
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<PlayCall>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<PlayCall> {
        self.calls().clone()
    }

    pub fn clear_calls(&self) {
        self.calls().clear();
    }

    fn calls(&self) -> MutexGuard<'_, Vec<PlayCall>> {
        self.play_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, sound: &Sound, volume: f32) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.calls().push(PlayCall {
            sound_id: sound.id,
            volume,
        });
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}
