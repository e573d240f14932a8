use crate::widgets::Widget;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use tui_textarea::{CursorMove, TextArea};

/// Text input backed by `tui_textarea`. Single-line editors swallow newline keys.
pub struct FieldEditor {
    ta: TextArea<'static>,
    placeholder: String,
    multiline: bool,
}

impl FieldEditor {
    pub fn single(value: &str, placeholder: &str) -> Self {
        Self::build(value, placeholder, false)
    }

    pub fn multiline(value: &str, placeholder: &str) -> Self {
        Self::build(value, placeholder, true)
    }

    fn build(value: &str, placeholder: &str, multiline: bool) -> Self {
        let mut me = Self {
            ta: TextArea::default(),
            placeholder: placeholder.to_string(),
            multiline,
        };
        me.set_value(value);
        me
    }

    pub fn value(&self) -> String {
        self.ta.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.ta.lines().iter().all(|l| l.is_empty())
    }

    pub fn set_value(&mut self, value: &str) {
        let lines: Vec<String> = if self.multiline {
            value.split('\n').map(str::to_string).collect()
        } else {
            vec![value.replace(['\r', '\n'], " ")]
        };
        let mut ta = TextArea::new(lines);
        ta.set_placeholder_text(self.placeholder.clone());
        ta.set_cursor_line_style(Style::default());
        ta.move_cursor(CursorMove::Bottom);
        ta.move_cursor(CursorMove::End);
        self.ta = ta;
    }

    fn is_newline(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter => true,
            KeyCode::Char('m') | KeyCode::Char('j') => {
                key.modifiers.contains(KeyModifiers::CONTROL)
            }
            _ => false,
        }
    }
}

impl Widget for FieldEditor {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        let cursor = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.ta.set_cursor_style(cursor);
        f.render_widget(&self.ta, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        if !self.multiline && Self::is_newline(&key) {
            return false;
        }
        self.ta.input(key)
    }
}
