//! Session controller for the Pomodoro timer.
//!
//! The session is the single owner of all application state: the timer
//! engine, the task store, the alarm preferences and the tick driver. Every
//! user intent goes through a method here, so the rules tying those parts
//! together live in one place:
//!
//! - The tick driver runs exactly while the timer is running
//! - Pause, reset and mode selection stop the driver before touching state
//! - A finished countdown plays the alarm and lands idle in the next mode
//! - Ticks issued before an explicit user action are dropped
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pomodoro_tasks::session::Session;
//! use pomodoro_tasks::storage::MemoryStore;
//! use pomodoro_tasks::types::Settings;
//! use tokio::sync::mpsc;
//!
//! # async fn example() {
//! let (event_tx, _event_rx) = mpsc::unbounded_channel();
//! let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
//! let mut session =
//!     Session::new(Settings::default(), Arc::new(MemoryStore::new()), event_tx, tick_tx)
//!         .expect("default settings are valid");
//!
//! session.start();
//! while let Some(tick) = tick_rx.recv().await {
//!     session.on_tick(tick);
//! }
//! # }
//! ```

mod preferences;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::sound::{self, Sound, SoundPlayer};
use crate::storage::KeyValueStore;
use crate::tasks::{self, TaskStore};
use crate::timer::{Completion, Tick, TickDriver, TimerEngine, TimerEvent};
use crate::types::{Mode, Settings, SettingsError, Task, TaskFilter, TaskId, TaskSort, TimerState};

pub use preferences::{Preferences, DEFAULT_VOLUME, VOLUME_STEP};

/// Formats a number of seconds as `MM:SS`.
///
/// Minutes are not wrapped into hours, so 120 minutes renders as `120:00`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// Session
// ============================================================================

/// Composition root owning the timer, tasks and preferences.
pub struct Session {
    engine: TimerEngine,
    tasks: TaskStore,
    preferences: Preferences,
    player: Option<Arc<dyn SoundPlayer>>,
    driver: TickDriver,
    filter: TaskFilter,
    sort: TaskSort,
}

impl Session {
    /// Creates a session, loading tasks and preferences from `store`.
    ///
    /// Timer events are sent on `event_tx`; the tick driver sends on `tick_tx`
    /// and the owner is expected to feed those ticks back into [`Session::on_tick`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a duration or the long-break interval is
    /// out of range.
    pub fn new(
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
        tick_tx: mpsc::UnboundedSender<Tick>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            engine: TimerEngine::new(settings, event_tx),
            tasks: TaskStore::load(store.clone()),
            preferences: Preferences::load(store),
            player: None,
            driver: TickDriver::new(tick_tx),
            filter: TaskFilter::default(),
            sort: TaskSort::default(),
        })
    }

    /// Attaches the alarm player. `None` means the session runs silently.
    pub fn with_player(mut self, player: Option<Arc<dyn SoundPlayer>>) -> Self {
        self.player = player;
        self
    }

    // ------------------------------------------------------------------------
    // Timer intents
    // ------------------------------------------------------------------------

    /// Starts the countdown. Does nothing if it is already running.
    pub fn start(&mut self) {
        if self.engine.start() {
            self.driver.start();
        }
    }

    /// Pauses the countdown. Does nothing if it is not running.
    pub fn pause(&mut self) {
        self.driver.cancel();
        self.engine.pause();
    }

    /// Start/pause button.
    pub fn toggle_running(&mut self) {
        if self.engine.state().is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stops the countdown and restores the full duration of the current mode.
    pub fn reset(&mut self) {
        self.driver.cancel();
        self.engine.reset();
    }

    /// Switches to `mode`, stopping any countdown in progress.
    pub fn select_mode(&mut self, mode: Mode) {
        self.driver.cancel();
        self.engine.select_mode(mode);
    }

    /// Applies one tick from the driver.
    ///
    /// Ticks from a cancelled run are ignored. When the countdown finishes
    /// the driver is stopped, the alarm plays and the timer is left idle in
    /// the next mode.
    pub fn on_tick(&mut self, tick: Tick) -> Option<Completion> {
        if !self.driver.is_current(tick) {
            debug!(
                "Dropping stale tick (generation {}, current {})",
                tick.generation,
                self.driver.generation()
            );
            return None;
        }

        let completion = self.engine.tick()?;
        self.driver.cancel();
        self.play_alarm();
        Some(completion)
    }

    fn play_alarm(&self) {
        let Some(player) = &self.player else {
            return;
        };
        if let Err(e) = player.play(self.preferences.sound(), self.preferences.volume()) {
            warn!("Failed to play alarm: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Task intents
    // ------------------------------------------------------------------------

    /// Adds a task from the add form.
    ///
    /// `estimate` is the raw minutes field. Invalid input leaves the list
    /// unchanged and returns `None`.
    pub fn add_task(&mut self, text: &str, estimate: &str) -> Option<TaskId> {
        let result = tasks::parse_estimate(estimate).and_then(|minutes| self.tasks.add(text, minutes));
        match result {
            Ok(id) => {
                debug!("Task added: {}", id.short());
                Some(id)
            }
            Err(e) => {
                debug!("Task not added: {}", e);
                None
            }
        }
    }

    /// Flips the completion flag of a task. Unknown ids are ignored.
    pub fn toggle_task(&mut self, id: TaskId) {
        if self.tasks.toggle(id).is_none() {
            debug!("Toggle ignored, no task {}", id.short());
        }
    }

    /// Removes a task. Unknown ids are ignored.
    pub fn delete_task(&mut self, id: TaskId) {
        if self.tasks.delete(id).is_none() {
            debug!("Delete ignored, no task {}", id.short());
        }
    }

    /// Returns the task list for the current filter and sort.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.list(self.filter, self.sort)
    }

    /// Returns the active task filter.
    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    /// Sets the task filter.
    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Moves to the next filter: All, Active, Completed.
    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
    }

    /// Returns the active task sort.
    pub fn sort(&self) -> TaskSort {
        self.sort
    }

    /// Sets the task sort.
    pub fn set_sort(&mut self, sort: TaskSort) {
        self.sort = sort;
    }

    /// Moves to the next sort: Date, Alphabetical, Time.
    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
    }

    /// Progress of `task` against its estimate, shown only while focusing.
    pub fn task_progress(&self, task: &Task) -> Option<f64> {
        let state = self.engine.state();
        if state.mode != Mode::Focus {
            return None;
        }
        tasks::task_progress(task, state.elapsed_seconds())
    }

    // ------------------------------------------------------------------------
    // Preference intents
    // ------------------------------------------------------------------------

    /// Sets the alarm volume, clamped to 0.0 - 1.0.
    ///
    /// A failed write is logged; the new volume still applies.
    pub fn set_volume(&mut self, volume: f32) {
        if let Err(e) = self.preferences.set_volume(volume) {
            warn!("Failed to save volume: {}", e);
        }
    }

    /// Moves the volume by `steps` increments of [`VOLUME_STEP`].
    pub fn adjust_volume(&mut self, steps: i32) {
        let volume = self.preferences.volume() + steps as f32 * VOLUME_STEP;
        self.set_volume(volume);
    }

    /// Selects the alarm sound by catalog id. Unknown ids are ignored.
    pub fn set_sound(&mut self, id: &str) {
        match sound::find_sound(id) {
            Ok(sound) => self.select_sound(sound),
            Err(e) => debug!("Sound not changed: {}", e),
        }
    }

    /// Selects the sound `offset` places away in the catalog, wrapping.
    pub fn cycle_sound(&mut self, offset: isize) {
        let sound = sound::cycle_sound(self.preferences.sound().id, offset);
        self.select_sound(sound);
    }

    fn select_sound(&mut self, sound: &'static Sound) {
        if let Err(e) = self.preferences.set_sound(sound) {
            warn!("Failed to save sound: {}", e);
        }
    }

    /// Plays the selected sound at the current volume.
    pub fn test_sound(&self) {
        self.play_alarm();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the current timer state.
    pub fn timer(&self) -> &TimerState {
        self.engine.state()
    }

    /// Returns the durations and long-break interval in use.
    pub fn settings(&self) -> &Settings {
        self.engine.settings()
    }

    /// Returns the task store.
    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Returns the alarm volume (0.0 - 1.0).
    pub fn volume(&self) -> f32 {
        self.preferences.volume()
    }

    /// Returns the selected alarm sound.
    pub fn sound(&self) -> &'static Sound {
        self.preferences.sound()
    }

    /// Returns true if an alarm player is attached and enabled.
    pub fn has_sound(&self) -> bool {
        self.player.as_ref().is_some_and(|p| !p.is_disabled())
    }

    /// Returns true while the tick driver is running.
    pub fn is_ticking(&self) -> bool {
        self.driver.is_active()
    }

    /// Terminal title for the current state, e.g. `24:59 - Pomodoro`.
    pub fn window_title(&self) -> String {
        let state = self.engine.state();
        format!("{} - {}", format_clock(state.remaining_seconds), state.mode.label())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("timer", self.engine.state())
            .field("tasks", &self.tasks.len())
            .field("preferences", &self.preferences)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::MockSoundPlayer;
    use crate::storage::MemoryStore;
    use tokio::time::Duration;

    struct Harness {
        session: Session,
        player: Arc<MockSoundPlayer>,
        tick_rx: mpsc::UnboundedReceiver<Tick>,
        _event_rx: mpsc::UnboundedReceiver<TimerEvent>,
    }

    fn create_session(settings: Settings) -> Harness {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let player = Arc::new(MockSoundPlayer::new());
        let session = Session::new(settings, Arc::new(MemoryStore::new()), event_tx, tick_tx)
            .unwrap()
            .with_player(Some(player.clone() as Arc<dyn SoundPlayer>));
        Harness {
            session,
            player,
            tick_rx,
            _event_rx: event_rx,
        }
    }

    fn short_settings() -> Settings {
        Settings::default()
            .with_focus_minutes(1)
            .with_short_break_minutes(1)
            .with_long_break_minutes(2)
            .with_long_break_interval(2)
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
        let store = Arc::new(MemoryStore::new());

        let result = Session::new(
            Settings::default().with_long_break_interval(0),
            store.clone(),
            event_tx.clone(),
            tick_tx.clone(),
        );
        assert!(matches!(result, Err(SettingsError::IntervalOutOfRange(0))));

        let result = Session::new(
            Settings::default().with_focus_minutes(0),
            store,
            event_tx,
            tick_tx,
        );
        assert!(matches!(
            result,
            Err(SettingsError::DurationOutOfRange { mode: Mode::Focus, .. })
        ));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(7200), "120:00");
    }

    mod timer_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_start_runs_driver_once() {
            let mut h = create_session(Settings::default());

            h.session.start();
            h.session.start();
            assert!(h.session.is_ticking());

            tokio::time::sleep(Duration::from_millis(3500)).await;
            while let Ok(tick) = h.tick_rx.try_recv() {
                h.session.on_tick(tick);
            }
            assert_eq!(h.session.timer().remaining_seconds, 1500 - 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_pause_stops_driver() {
            let mut h = create_session(Settings::default());
            h.session.start();

            let tick = h.tick_rx.recv().await.unwrap();
            h.session.on_tick(tick);
            h.session.pause();

            assert!(!h.session.is_ticking());
            assert!(h.session.timer().is_paused());
            assert_eq!(h.session.timer().remaining_seconds, 1499);
        }

        #[tokio::test(start_paused = true)]
        async fn test_toggle_running() {
            let mut h = create_session(Settings::default());

            h.session.toggle_running();
            assert!(h.session.timer().is_running);
            h.session.toggle_running();
            assert!(!h.session.timer().is_running);
            assert!(!h.session.is_ticking());
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_mode_while_running() {
            let mut h = create_session(Settings::default());
            h.session.start();

            h.session.select_mode(Mode::LongBreak);

            assert!(!h.session.is_ticking());
            assert_eq!(h.session.timer().mode, Mode::LongBreak);
            assert_eq!(h.session.timer().remaining_seconds, 15 * 60);
            assert!(!h.session.timer().is_running);
        }

        #[tokio::test(start_paused = true)]
        async fn test_reset_restores_duration() {
            let mut h = create_session(Settings::default());
            h.session.start();
            let tick = h.tick_rx.recv().await.unwrap();
            h.session.on_tick(tick);

            h.session.reset();

            assert_eq!(h.session.timer().remaining_seconds, 1500);
            assert!(!h.session.is_ticking());
        }

        #[tokio::test(start_paused = true)]
        async fn test_completion_plays_alarm_and_lands_idle() {
            let mut h = create_session(short_settings());
            h.session.set_sound("chime");
            h.session.set_volume(0.3);
            h.session.start();

            let mut completion = None;
            while completion.is_none() {
                let tick = h.tick_rx.recv().await.unwrap();
                completion = h.session.on_tick(tick);
            }

            let completion = completion.unwrap();
            assert_eq!(completion.finished, Mode::Focus);
            assert_eq!(completion.next, Mode::ShortBreak);
            assert!(!h.session.is_ticking());
            assert!(!h.session.timer().is_running);
            assert_eq!(h.session.timer().remaining_seconds, 60);

            let calls = h.player.get_play_calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].sound_id, "chime");
            assert_eq!(calls[0].volume, 0.3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_stale_tick_is_dropped() {
            let mut h = create_session(Settings::default());
            h.session.start();

            tokio::time::sleep(Duration::from_millis(1100)).await;
            h.session.select_mode(Mode::ShortBreak);

            let queued = h.tick_rx.try_recv().unwrap();
            assert!(h.session.on_tick(queued).is_none());
            assert_eq!(h.session.timer().remaining_seconds, 5 * 60);
            assert_eq!(h.session.timer().mode, Mode::ShortBreak);
        }

        #[tokio::test(start_paused = true)]
        async fn test_playback_failure_is_ignored() {
            let mut h = create_session(short_settings());
            h.player.set_should_fail(true);
            h.session.start();

            let mut completion = None;
            while completion.is_none() {
                let tick = h.tick_rx.recv().await.unwrap();
                completion = h.session.on_tick(tick);
            }

            assert_eq!(h.session.timer().mode, Mode::ShortBreak);
        }

        #[test]
        fn test_window_title() {
            let h = create_session(Settings::default());
            assert_eq!(h.session.window_title(), "25:00 - Pomodoro");
        }
    }

    mod task_tests {
        use super::*;

        #[test]
        fn test_add_task_parses_estimate() {
            let mut h = create_session(Settings::default());

            let id = h.session.add_task("Write report", " 30 ").unwrap();
            assert_eq!(h.session.tasks().get(id).unwrap().estimated_time, Some(30));

            let id = h.session.add_task("Read", "").unwrap();
            assert_eq!(h.session.tasks().get(id).unwrap().estimated_time, None);
        }

        #[test]
        fn test_invalid_input_is_noop() {
            let mut h = create_session(Settings::default());

            assert!(h.session.add_task("   ", "").is_none());
            assert!(h.session.add_task("Task", "0").is_none());
            assert!(h.session.add_task("Task", "abc").is_none());
            assert!(h.session.tasks().is_empty());
        }

        #[test]
        fn test_toggle_and_delete() {
            let mut h = create_session(Settings::default());
            let id = h.session.add_task("Task", "").unwrap();

            h.session.toggle_task(id);
            assert!(h.session.tasks().get(id).unwrap().completed);

            h.session.delete_task(id);
            assert!(h.session.tasks().is_empty());

            h.session.toggle_task(id);
            h.session.delete_task(id);
            assert!(h.session.tasks().is_empty());
        }

        #[test]
        fn test_visible_tasks_follow_filter_and_sort() {
            let mut h = create_session(Settings::default());
            let b = h.session.add_task("banana", "").unwrap();
            h.session.add_task("Apple", "").unwrap();
            h.session.toggle_task(b);

            h.session.set_sort(TaskSort::Alphabetical);
            let texts: Vec<_> = h.session.visible_tasks().iter().map(|t| t.text.clone()).collect();
            assert_eq!(texts, vec!["Apple", "banana"]);

            h.session.set_filter(TaskFilter::Active);
            let texts: Vec<_> = h.session.visible_tasks().iter().map(|t| t.text.clone()).collect();
            assert_eq!(texts, vec!["Apple"]);

            h.session.cycle_filter();
            assert_eq!(h.session.filter(), TaskFilter::Completed);
        }

        #[test]
        fn test_task_progress_only_in_focus() {
            let mut h = create_session(Settings::default());
            let id = h.session.add_task("Task", "10").unwrap();
            let task = h.session.tasks().get(id).unwrap().clone();

            assert_eq!(h.session.task_progress(&task), Some(0.0));

            h.session.select_mode(Mode::ShortBreak);
            assert_eq!(h.session.task_progress(&task), None);
        }
    }

    mod preference_tests {
        use super::*;

        #[test]
        fn test_adjust_volume_clamps() {
            let mut h = create_session(Settings::default());

            h.session.adjust_volume(100);
            assert_eq!(h.session.volume(), 1.0);

            h.session.adjust_volume(-100);
            assert_eq!(h.session.volume(), 0.0);
        }

        #[test]
        fn test_set_sound_ignores_unknown_id() {
            let mut h = create_session(Settings::default());

            h.session.set_sound("bell_timer");
            h.session.set_sound("foghorn");
            assert_eq!(h.session.sound().id, "bell_timer");
        }

        #[test]
        fn test_cycle_sound_wraps() {
            let mut h = create_session(Settings::default());

            h.session.cycle_sound(-1);
            assert_eq!(h.session.sound().id, "digital_watch");
            h.session.cycle_sound(1);
            assert_eq!(h.session.sound().id, "alarm_clock");
        }

        #[test]
        fn test_test_sound_uses_current_selection() {
            let mut h = create_session(Settings::default());
            h.session.set_volume(0.75);

            h.session.test_sound();

            let calls = h.player.get_play_calls();
            assert_eq!(calls[0].sound_id, "alarm_clock");
            assert_eq!(calls[0].volume, 0.75);
        }

        #[test]
        fn test_write_failure_keeps_selection() {
            let (event_tx, _event_rx) = mpsc::unbounded_channel();
            let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
            let backing = Arc::new(MemoryStore::new());
            backing.set_fail_writes(true);
            let mut session =
                Session::new(Settings::default(), backing.clone(), event_tx, tick_tx).unwrap();

            session.set_volume(0.2);
            session.cycle_sound(1);

            assert_eq!(session.volume(), 0.2);
            assert_eq!(session.sound().id, "bell_timer");
            assert!(backing.raw(crate::storage::VOLUME_KEY).is_none());
        }

        #[test]
        fn test_has_sound() {
            let h = create_session(Settings::default());
            assert!(h.session.has_sound());
            h.player.disable();
            assert!(!h.session.has_sound());
        }
    }
}
