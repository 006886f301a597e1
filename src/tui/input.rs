//! Keyboard mapping for the terminal UI.
//!
//! Keys are translated into [`Action`]s without touching any state, so the
//! whole keymap can be checked in unit tests.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::Mode;

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleRunning,
    Reset,
    ToggleSettings,
    SelectMode(Mode),
    FocusForm,
    CycleFilter,
    CycleSort,
    SelectPrev,
    SelectNext,
    ToggleTask,
    DeleteTask,
    PrevSound,
    NextSound,
    VolumeDown,
    VolumeUp,
    TestSound,
    Quit,

    // Add form
    FormInput(char),
    FormBackspace,
    FormSwitchField,
    FormSubmit,
    FormLeave,
}

/// Maps a key event to an action.
///
/// While `form_focused` is set only editing keys are recognised; the global
/// shortcuts are suppressed so they can be typed as text. Ctrl-C always quits.
pub fn map_key(key: KeyEvent, form_focused: bool) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    if form_focused {
        return match key.code {
            KeyCode::Char(c) => Some(Action::FormInput(c)),
            KeyCode::Backspace => Some(Action::FormBackspace),
            KeyCode::Tab | KeyCode::BackTab => Some(Action::FormSwitchField),
            KeyCode::Enter => Some(Action::FormSubmit),
            KeyCode::Esc => Some(Action::FormLeave),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char(' ') => Action::ToggleRunning,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('s') => Action::ToggleSettings,
        KeyCode::Char('1') => Action::SelectMode(Mode::Focus),
        KeyCode::Char('2') => Action::SelectMode(Mode::ShortBreak),
        KeyCode::Char('3') => Action::SelectMode(Mode::LongBreak),
        KeyCode::Char('a') => Action::FocusForm,
        KeyCode::Char('f') => Action::CycleFilter,
        KeyCode::Char('o') => Action::CycleSort,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrev,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Enter | KeyCode::Char('x') => Action::ToggleTask,
        KeyCode::Delete | KeyCode::Char('d') => Action::DeleteTask,
        KeyCode::Char('[') => Action::PrevSound,
        KeyCode::Char(']') => Action::NextSound,
        KeyCode::Char('-') => Action::VolumeDown,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::VolumeUp,
        KeyCode::Char('t') => Action::TestSound,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}
