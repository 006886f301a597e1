//! Static catalog of selectable alarm sounds.

use super::error::SoundError;
use super::source::TonePattern;

/// A selectable alarm sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sound {
    /// Stable identifier, persisted as the user's preference.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Tone played for this sound.
    pub tone: TonePattern,
}

/// All selectable sounds. The first entry is the default.
pub const SOUNDS: &[Sound] = &[
    Sound {
        id: "alarm_clock",
        name: "Alarm Clock",
        tone: TonePattern::new(880.0, 120, 80, 8),
    },
    Sound {
        id: "bell_timer",
        name: "Bell Timer",
        tone: TonePattern::new(1320.0, 400, 200, 3),
    },
    Sound {
        id: "chime",
        name: "Chime",
        tone: TonePattern::new(660.0, 700, 150, 2),
    },
    Sound {
        id: "digital_watch",
        name: "Digital Watch",
        tone: TonePattern::new(2048.0, 60, 60, 12),
    },
];

/// Returns the default sound (first catalog entry).
#[must_use]
pub fn default_sound() -> &'static Sound {
    &SOUNDS[0]
}

/// Looks up a sound by id.
///
/// # Errors
///
/// Returns `SoundError::UnknownSound` if no catalog entry has this id.
pub fn find_sound(id: &str) -> Result<&'static Sound, SoundError> {
    SOUNDS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SoundError::UnknownSound(id.to_string()))
}

/// Returns the sound `offset` positions away from `id`, wrapping around.
///
/// Unknown ids are treated as the default sound.
#[must_use]
pub fn cycle_sound(id: &str, offset: isize) -> &'static Sound {
    let len = SOUNDS.len() as isize;
    let current = SOUNDS.iter().position(|s| s.id == id).unwrap_or(0) as isize;
    let next = (current + offset).rem_euclid(len);
    &SOUNDS[next as usize]
}
