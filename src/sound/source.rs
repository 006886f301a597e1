//! Synthesized alarm tones.
//!
//! Each catalog sound is a short beep pattern rendered on the fly, so the
//! binary needs no audio assets.

use std::time::Duration;

/// A repeated sine beep separated by silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePattern {
    /// Beep frequency in Hz.
    pub frequency_hz: f32,
    /// Length of each beep.
    pub beep: Duration,
    /// Silence after each beep.
    pub gap: Duration,
    /// Number of beeps.
    pub repeats: u32,
}

impl TonePattern {
    /// Creates a pattern from millisecond values.
    #[must_use]
    pub const fn new(frequency_hz: f32, beep_ms: u64, gap_ms: u64, repeats: u32) -> Self {
        Self {
            frequency_hz,
            beep: Duration::from_millis(beep_ms),
            gap: Duration::from_millis(gap_ms),
            repeats,
        }
    }

    /// Total playing time, including the trailing gap.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        (self.beep + self.gap) * self.repeats
    }

    /// Returns true if the pattern would produce no sound.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.repeats == 0 || self.beep.is_zero() || self.frequency_hz <= 0.0
    }
}
