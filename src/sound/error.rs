//! Sound system error types.
//!
//! Playback errors never interrupt the timer; callers log them and move on.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// No catalog entry has the requested id.
    #[error("Unknown sound: '{0}'")]
    UnknownSound(String),

    /// Failed to create the audio output stream.
    #[error("Failed to create audio stream: {0}")]
    StreamError(String),

    /// Generic sound playback error.
    #[error("Sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::UnknownSound(_) => "Run `pomodoro-tasks sound list` to see available sounds",
            Self::StreamError(_) => "Check your audio settings",
            Self::PlaybackError(_) => "Restart the application",
        }
    }
}
