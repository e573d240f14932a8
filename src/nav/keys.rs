use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Navigate-mode key classes; raw keys only map to these outside Edit mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalKey {
    Down,
    Up,
    Next,
    Prev,
    Enter,
    Escape,
    New,
    Delete,
    Quit,
}

impl LogicalKey {
    pub const ALL: [LogicalKey; 9] = [
        LogicalKey::Down,
        LogicalKey::Up,
        LogicalKey::Next,
        LogicalKey::Prev,
        LogicalKey::Enter,
        LogicalKey::Escape,
        LogicalKey::New,
        LogicalKey::Delete,
        LogicalKey::Quit,
    ];

    pub fn from_key(key: &KeyEvent) -> Option<LogicalKey> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        Some(match key.code {
            KeyCode::Char('j') | KeyCode::Down => LogicalKey::Down,
            KeyCode::Char('k') | KeyCode::Up => LogicalKey::Up,
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => LogicalKey::Next,
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => LogicalKey::Prev,
            KeyCode::Enter => LogicalKey::Enter,
            KeyCode::Esc => LogicalKey::Escape,
            KeyCode::Char('n') => LogicalKey::New,
            KeyCode::Char('d') => LogicalKey::Delete,
            KeyCode::Char('q') => LogicalKey::Quit,
            _ => return None,
        })
    }
}

pub fn is_copy_chord(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
}
