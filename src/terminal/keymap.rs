// SPDX-License-Identifier: GPL-3.0-only

//! Key bindings for the terminal UI

use crate::capture::{CaptureMode, Message, SnapshotId};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What keystrokes currently edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing the metadata attached to the next captures
    Draft,
    /// Typing into an existing snapshot's metadata
    Snapshot(SnapshotId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Dispatch(Message),
    SelectNext,
    SelectPrevious,
    BeginDraft,
    /// Toggle editing of the selected snapshot
    BeginEdit,
    /// Remove the selected snapshot
    Delete,
    CountSelected,
    Type(char),
    Backspace,
    FinishInput,
    ToggleHelp,
    None,
}

/// Map a key press to an action for the current input mode
pub fn map_key(key: KeyEvent, input: InputMode, mode: CaptureMode) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if input != InputMode::Normal {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => Action::FinishInput,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Char(c) => Action::Type(c),
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') => Action::Dispatch(Message::StartCamera),
        KeyCode::Char('x') => Action::Dispatch(Message::StopCamera),
        KeyCode::Char(' ') => Action::Dispatch(Message::ToggleCapture),
        KeyCode::Char('i') if mode == CaptureMode::Timed => {
            Action::Dispatch(Message::CycleInterval)
        }
        KeyCode::Char('p') if mode == CaptureMode::Manual => Action::Dispatch(Message::Shoot),
        KeyCode::Char('m') => Action::BeginDraft,
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevious,
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('e') => Action::BeginEdit,
        KeyCode::Char('f') => Action::CountSelected,
        KeyCode::Char('h') => Action::ToggleHelp,
        _ => Action::None,
    }
}

/// One-line key hints for the status bar
pub fn hints(mode: CaptureMode) -> &'static str {
    match mode {
        CaptureMode::Timed => "'c' camera | space capture | 'i' interval | 'h' help | 'q' quit",
        CaptureMode::Manual => "'c' camera | space capturing | 'p' shoot | 'h' help | 'q' quit",
    }
}

/// Full key reference
pub fn help(mode: CaptureMode) -> &'static str {
    match mode {
        CaptureMode::Timed => {
            "c/x: Camera on/off | space: Start/stop capture | i: Interval | m: Metadata | \
             j/k: Select | e: Edit | d: Delete | f: Count flowers | q: Quit"
        }
        CaptureMode::Manual => {
            "c/x: Camera on/off | space: Capturing | p: Shoot | m: Metadata | \
             j/k: Select | e: Edit | d: Delete | f: Count flowers | q: Quit"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_c_quits_while_typing() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, InputMode::Draft, CaptureMode::Timed), Action::Quit);
    }

    #[test]
    fn test_letters_are_text_while_editing() {
        let input = InputMode::Snapshot(SnapshotId::new());
        assert_eq!(
            map_key(press(KeyCode::Char('q')), input, CaptureMode::Timed),
            Action::Type('q')
        );
        assert_eq!(
            map_key(press(KeyCode::Esc), input, CaptureMode::Timed),
            Action::FinishInput
        );
    }

    #[test]
    fn test_mode_specific_keys() {
        let normal = InputMode::Normal;
        assert_eq!(
            map_key(press(KeyCode::Char('i')), normal, CaptureMode::Timed),
            Action::Dispatch(Message::CycleInterval)
        );
        assert_eq!(
            map_key(press(KeyCode::Char('i')), normal, CaptureMode::Manual),
            Action::None
        );
        assert_eq!(
            map_key(press(KeyCode::Char('p')), normal, CaptureMode::Manual),
            Action::Dispatch(Message::Shoot)
        );
        assert_eq!(
            map_key(press(KeyCode::Char('p')), normal, CaptureMode::Timed),
            Action::None
        );
    }
}
