//! Sound player implementation using rodio.
//!
//! This module provides the `RodioSoundPlayer` which uses the rodio v0.20
//! audio library for cross-platform sound playback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::catalog::Sound;
use super::error::SoundError;
use super::source::TonePattern;

/// Sample rate of the silence inserted between beeps.
const GAP_SAMPLE_RATE: u32 = 48_000;

/// Amplitude of a beep before the volume is applied.
const BEEP_AMPLITUDE: f32 = 0.4;

/// A sound player that uses rodio for audio playback.
///
/// Sound playback is non-blocking; sounds continue playing in the background.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Whether sound playback is disabled.
    disabled: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player.
    ///
    /// # Arguments
    ///
    /// * `disabled` - If true, all sound playback will be silently skipped.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Plays `sound` at `volume` (0.0 - 1.0).
    ///
    /// This method is non-blocking; the tone plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if a sink cannot be created on the output stream.
    pub fn play(&self, sound: &Sound, volume: f32) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping");
            return Ok(());
        }
        if sound.tone.is_silent() {
            return Err(SoundError::PlaybackError(format!(
                "sound '{}' has an empty tone pattern",
                sound.id
            )));
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;
        sink.set_volume(volume.clamp(0.0, 1.0));
        append_tone(&sink, &sound.tone);
        sink.detach(); // Non-blocking: sound continues after function returns

        debug!("Playing '{}' at volume {:.2} (detached)", sound.id, volume);
        Ok(())
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Enables sound playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
        debug!("Sound playback enabled");
    }

    /// Disables sound playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
        debug!("Sound playback disabled");
    }
}

/// Queues the beeps and gaps of `tone` on `sink`.
fn append_tone(sink: &Sink, tone: &TonePattern) {
    for _ in 0..tone.repeats {
        sink.append(
            SineWave::new(tone.frequency_hz)
                .take_duration(tone.beep)
                .amplify(BEEP_AMPLITUDE),
        );
        if !tone.gap.is_zero() {
            sink.append(Zero::<f32>::new(1, GAP_SAMPLE_RATE).take_duration(tone.gap));
        }
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<Arc<RodioSoundPlayer>> {
    match RodioSoundPlayer::new(disabled) {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("{}: {}", unavailable_message(&e), e);
            None
        }
    }
}

/// Log prefix explaining why the alarm is silent.
fn unavailable_message(error: &SoundError) -> &'static str {
    if error.is_device_error() {
        "No audio output device, sound disabled"
    } else {
        "Audio initialization failed, sound disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::catalog::default_sound;

    // Note: These tests may run in environments without audio hardware
    // (e.g., CI containers) and return early there.

    #[test]
    fn test_disabled_player_skips_playback() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_disabled());
        assert!(player.play(default_sound(), 0.5).is_ok());
    }

    #[test]
    fn test_enable_disable() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        player.enable();
        assert!(!player.is_disabled());

        player.disable();
        assert!(player.is_disabled());
    }

    #[test]
    fn test_silent_pattern_is_rejected() {
        let player = match RodioSoundPlayer::new(false) {
            Ok(p) => p,
            Err(_) => return,
        };
        let silent = Sound {
            id: "silent",
            name: "Silent",
            tone: TonePattern::new(440.0, 0, 0, 0),
        };

        assert!(matches!(
            player.play(&silent, 0.5),
            Err(SoundError::PlaybackError(_))
        ));
    }

    #[test]
    fn test_try_create_player_does_not_panic() {
        let _ = try_create_player(true);
    }

    #[test]
    fn test_unavailable_message_names_the_cause() {
        let missing = SoundError::DeviceNotAvailable("no device".to_string());
        assert!(unavailable_message(&missing).starts_with("No audio output device"));

        let other = SoundError::PlaybackError("sink failed".to_string());
        assert!(unavailable_message(&other).starts_with("Audio initialization failed"));
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        let debug_str = format!("{:?}", player);
        assert!(debug_str.contains("RodioSoundPlayer"));
    }
}
