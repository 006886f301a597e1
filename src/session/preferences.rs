//! Persisted user preferences: alarm volume and alarm sound.
//!
//! Each preference is stored under its own key and written independently.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::sound::{self, Sound};
use crate::storage::{self, KeyValueStore, SOUND_KEY, VOLUME_KEY};

/// Volume used when nothing valid is stored.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Step used by the volume shortcuts.
pub const VOLUME_STEP: f32 = 0.05;

/// Alarm volume and sound selection.
pub struct Preferences {
    volume: f32,
    sound: &'static Sound,
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    /// Loads preferences from `store`, falling back to defaults for missing,
    /// corrupt or out-of-range values.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let volume = storage::load_json::<f32>(store.as_ref(), VOLUME_KEY)
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(DEFAULT_VOLUME);

        let sound = storage::load_json::<String>(store.as_ref(), SOUND_KEY)
            .and_then(|id| match sound::find_sound(&id) {
                Ok(sound) => Some(sound),
                Err(e) => {
                    warn!("{}, using default sound", e);
                    None
                }
            })
            .unwrap_or_else(sound::default_sound);

        debug!("Loaded preferences: volume {:.2}, sound '{}'", volume, sound.id);
        Self {
            volume,
            sound,
            store,
        }
    }

    /// Returns the alarm volume (0.0 - 1.0).
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Returns the selected alarm sound.
    pub fn sound(&self) -> &'static Sound {
        self.sound
    }

    /// Sets the volume, clamped to 0.0 - 1.0, and persists it.
    ///
    /// Non-finite values are ignored. The in-memory value is updated even
    /// when the write fails.
    pub fn set_volume(&mut self, volume: f32) -> storage::Result<()> {
        if !volume.is_finite() {
            return Ok(());
        }
        self.volume = volume.clamp(0.0, 1.0);
        storage::save_json(self.store.as_ref(), VOLUME_KEY, &self.volume)
    }

    /// Selects `sound` and persists its id.
    ///
    /// The selection is kept in memory even when the write fails.
    pub fn set_sound(&mut self, sound: &'static Sound) -> storage::Result<()> {
        self.sound = sound;
        storage::save_json(self.store.as_ref(), SOUND_KEY, sound.id)
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("volume", &self.volume)
            .field("sound", &self.sound.id)
            .finish_non_exhaustive()
    }
}
