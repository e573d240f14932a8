pub mod chrome;
pub mod field;
pub mod request_bar;
pub mod request_list;
pub mod response;
pub mod settings;
pub mod status_bar;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Anything that can be drawn into a rect and, when focused, take raw keys.
pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64);
    /// Returns whether the key changed the widget.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        let _ = key;
        false
    }
}
