//! UI state for the terminal front end.
//!
//! [`App`] holds what only the screen cares about (selection, form fields,
//! panels, the background tint) and forwards every real change to the
//! [`Session`].

use tokio::time::{Duration, Instant};

use crate::session::Session;
use crate::types::{Mode, TaskId};

use super::input::Action;

/// Length of one tint fade (in and out).
pub const TINT_DURATION: Duration = Duration::from_secs(1);

/// Peak opacity of the tint.
pub const TINT_PEAK: f32 = 0.3;

/// Which part of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Timer,
    FormText,
    FormMinutes,
}

impl Focus {
    pub fn is_form(&self) -> bool {
        matches!(self, Focus::FormText | Focus::FormMinutes)
    }
}

/// Background tint triggered by a change of remaining time or mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    pub mode: Mode,
    pub started: Instant,
}

impl Tint {
    /// Opacity at `now`: rises to [`TINT_PEAK`] at the midpoint, back to zero at the end.
    pub fn strength(&self, now: Instant) -> f32 {
        let t = now.saturating_duration_since(self.started).as_secs_f32() / TINT_DURATION.as_secs_f32();
        if t >= 1.0 {
            return 0.0;
        }
        TINT_PEAK * (1.0 - (2.0 * t - 1.0).abs())
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= TINT_DURATION
    }
}

/// Terminal UI state.
#[derive(Debug, Default)]
pub struct App {
    pub focus: Focus,
    pub form_text: String,
    pub form_minutes: String,
    pub selected: usize,
    pub show_settings: bool,
    pub tint: Option<Tint>,
    pub should_quit: bool,
    last_seen: Option<(Mode, u32)>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `action` to the UI state and the session.
    pub fn handle(&mut self, action: Action, session: &mut Session) {
        match action {
            Action::ToggleRunning => session.toggle_running(),
            Action::Reset => session.reset(),
            Action::SelectMode(mode) => session.select_mode(mode),
            Action::ToggleSettings => self.show_settings = !self.show_settings,
            Action::FocusForm => self.focus = Focus::FormText,
            Action::CycleFilter => {
                session.cycle_filter();
                self.clamp_selection(session);
            }
            Action::CycleSort => session.cycle_sort(),
            Action::SelectPrev => self.selected = self.selected.saturating_sub(1),
            Action::SelectNext => {
                self.selected += 1;
                self.clamp_selection(session);
            }
            Action::ToggleTask => {
                if let Some(id) = self.selected_task(session) {
                    session.toggle_task(id);
                    self.clamp_selection(session);
                }
            }
            Action::DeleteTask => {
                if let Some(id) = self.selected_task(session) {
                    session.delete_task(id);
                    self.clamp_selection(session);
                }
            }
            Action::PrevSound => session.cycle_sound(-1),
            Action::NextSound => session.cycle_sound(1),
            Action::VolumeDown => session.adjust_volume(-1),
            Action::VolumeUp => session.adjust_volume(1),
            Action::TestSound => session.test_sound(),
            Action::Quit => self.should_quit = true,

            Action::FormInput(c) => match self.focus {
                Focus::FormText => self.form_text.push(c),
                // Number field: digits only
                Focus::FormMinutes if c.is_ascii_digit() => self.form_minutes.push(c),
                _ => {}
            },
            Action::FormBackspace => {
                match self.focus {
                    Focus::FormText => self.form_text.pop(),
                    Focus::FormMinutes => self.form_minutes.pop(),
                    Focus::Timer => None,
                };
            }
            Action::FormSwitchField => {
                self.focus = match self.focus {
                    Focus::FormText => Focus::FormMinutes,
                    _ => Focus::FormText,
                };
            }
            Action::FormSubmit => {
                if session.add_task(&self.form_text, &self.form_minutes).is_some() {
                    self.form_text.clear();
                    self.form_minutes.clear();
                    self.focus = Focus::FormText;
                }
            }
            Action::FormLeave => self.focus = Focus::Timer,
        }
    }

    /// Id of the highlighted task in the current view.
    pub fn selected_task(&self, session: &Session) -> Option<TaskId> {
        session.visible_tasks().get(self.selected).map(|t| t.id)
    }

    fn clamp_selection(&mut self, session: &Session) {
        let len = session.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Records the displayed mode and remaining time.
    ///
    /// Returns true when either changed since the last call, in which case a
    /// new tint fade starts at `now`.
    pub fn observe(&mut self, session: &Session, now: Instant) -> bool {
        let timer = session.timer();
        let seen = (timer.mode, timer.remaining_seconds);
        if self.last_seen == Some(seen) {
            return false;
        }
        self.last_seen = Some(seen);
        self.tint = Some(Tint {
            mode: timer.mode,
            started: now,
        });
        true
    }

    /// Current tint and its strength, if a fade is in progress.
    pub fn tint_at(&self, now: Instant) -> Option<(Mode, f32)> {
        self.tint
            .filter(|tint| !tint.is_finished(now))
            .map(|tint| (tint.mode, tint.strength(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::Settings;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn create_session() -> Session {
        let (event_tx, _) = mpsc::unbounded_channel();
        let (tick_tx, _) = mpsc::unbounded_channel();
        Session::new(Settings::default(), Arc::new(MemoryStore::new()), event_tx, tick_tx)
            .unwrap()
    }

    fn type_text(app: &mut App, session: &mut Session, text: &str) {
        for c in text.chars() {
            app.handle(Action::FormInput(c), session);
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn test_submit_adds_and_clears() {
            let mut session = create_session();
            let mut app = App::new();

            app.handle(Action::FocusForm, &mut session);
            type_text(&mut app, &mut session, "Write tests");
            app.handle(Action::FormSwitchField, &mut session);
            type_text(&mut app, &mut session, "2x5");
            assert_eq!(app.form_minutes, "25");

            app.handle(Action::FormSubmit, &mut session);

            assert_eq!(session.tasks().len(), 1);
            assert_eq!(session.tasks().tasks()[0].estimated_time, Some(25));
            assert!(app.form_text.is_empty());
            assert!(app.form_minutes.is_empty());
            assert_eq!(app.focus, Focus::FormText);
        }

        #[test]
        fn test_rejected_submit_keeps_fields() {
            let mut session = create_session();
            let mut app = App::new();

            app.handle(Action::FocusForm, &mut session);
            type_text(&mut app, &mut session, "   ");
            app.handle(Action::FormSubmit, &mut session);

            assert!(session.tasks().is_empty());
            assert_eq!(app.form_text, "   ");
        }

        #[test]
        fn test_zero_minutes_rejected() {
            let mut session = create_session();
            let mut app = App::new();

            app.handle(Action::FocusForm, &mut session);
            type_text(&mut app, &mut session, "Task");
            app.handle(Action::FormSwitchField, &mut session);
            type_text(&mut app, &mut session, "0");
            app.handle(Action::FormSubmit, &mut session);

            assert!(session.tasks().is_empty());
        }

        #[test]
        fn test_backspace_and_leave() {
            let mut session = create_session();
            let mut app = App::new();

            app.handle(Action::FocusForm, &mut session);
            type_text(&mut app, &mut session, "ab");
            app.handle(Action::FormBackspace, &mut session);
            assert_eq!(app.form_text, "a");

            app.handle(Action::FormLeave, &mut session);
            assert_eq!(app.focus, Focus::Timer);
            assert!(!app.focus.is_form());
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_selection_is_clamped() {
            let mut session = create_session();
            let mut app = App::new();
            session.add_task("one", "");
            session.add_task("two", "");

            app.handle(Action::SelectNext, &mut session);
            app.handle(Action::SelectNext, &mut session);
            assert_eq!(app.selected, 1);

            app.handle(Action::DeleteTask, &mut session);
            assert_eq!(app.selected, 0);
            assert_eq!(session.tasks().tasks()[0].text, "one");

            app.handle(Action::SelectPrev, &mut session);
            assert_eq!(app.selected, 0);
        }

        #[test]
        fn test_toggle_selected() {
            let mut session = create_session();
            let mut app = App::new();
            session.add_task("one", "");

            app.handle(Action::ToggleTask, &mut session);
            assert!(session.tasks().tasks()[0].completed);
        }

        #[test]
        fn test_actions_on_empty_list() {
            let mut session = create_session();
            let mut app = App::new();

            app.handle(Action::ToggleTask, &mut session);
            app.handle(Action::DeleteTask, &mut session);
            app.handle(Action::SelectNext, &mut session);
            assert_eq!(app.selected, 0);
        }
    }

    mod tint_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_observe_starts_tint_on_change() {
            let mut session = create_session();
            let mut app = App::new();
            let now = Instant::now();

            assert!(app.observe(&session, now));
            assert!(!app.observe(&session, now));

            session.select_mode(Mode::ShortBreak);
            assert!(app.observe(&session, now));
            assert_eq!(app.tint.unwrap().mode, Mode::ShortBreak);
        }

        #[tokio::test(start_paused = true)]
        async fn test_tint_fades_in_and_out() {
            let tint = Tint {
                mode: Mode::Focus,
                started: Instant::now(),
            };
            let start = tint.started;

            assert_eq!(tint.strength(start), 0.0);
            assert!((tint.strength(start + Duration::from_millis(500)) - TINT_PEAK).abs() < 1e-6);
            assert!(tint.strength(start + Duration::from_millis(250)) < TINT_PEAK);
            assert_eq!(tint.strength(start + TINT_DURATION), 0.0);
            assert!(tint.is_finished(start + TINT_DURATION));
        }

        #[tokio::test(start_paused = true)]
        async fn test_tint_at_after_fade() {
            let session = create_session();
            let mut app = App::new();
            let now = Instant::now();
            app.observe(&session, now);

            assert!(app.tint_at(now + Duration::from_millis(400)).is_some());
            assert!(app.tint_at(now + Duration::from_secs(2)).is_none());
        }
    }

    #[test]
    fn test_quit_and_settings() {
        let mut session = create_session();
        let mut app = App::new();

        app.handle(Action::ToggleSettings, &mut session);
        assert!(app.show_settings);
        app.handle(Action::Quit, &mut session);
        assert!(app.should_quit);
    }
}
