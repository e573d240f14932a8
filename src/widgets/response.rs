use crate::deck_core::focus::{FocusTarget, View};
use crate::model::{NameValue, ResponseRecord};
use crate::ui::AppState;
use crate::widgets::chrome::{draw_options, dropdown_rect, panel_block};
use crate::widgets::Widget;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Scrollable read-only text.
pub struct TextViewer {
    text: String,
    scroll_y: u16,
    wrap: bool,
    last_viewport_h: u16,
}

impl TextViewer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            scroll_y: 0,
            wrap: true,
            last_viewport_h: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.scroll_y = 0;
    }

    fn max_scroll(&self) -> u16 {
        let total = self.text.lines().count().min(u16::MAX as usize) as u16;
        total.saturating_sub(self.last_viewport_h)
    }
}

impl Widget for TextViewer {
    fn render(&mut self, f: &mut Frame, area: Rect, _focused: bool, _tick: u64) {
        self.last_viewport_h = area.height;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
        let mut p = Paragraph::new(self.text.as_str()).scroll((self.scroll_y, 0));
        if self.wrap {
            p = p.wrap(Wrap { trim: false });
        }
        f.render_widget(p, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        let before = (self.scroll_y, self.wrap);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_y = self.scroll_y.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_y = self.scroll_y.saturating_add(1).min(self.max_scroll())
            }
            KeyCode::PageUp => self.scroll_y = self.scroll_y.saturating_sub(self.last_viewport_h),
            KeyCode::PageDown => {
                self.scroll_y = self
                    .scroll_y
                    .saturating_add(self.last_viewport_h)
                    .min(self.max_scroll())
            }
            KeyCode::Home => self.scroll_y = 0,
            KeyCode::End => self.scroll_y = self.max_scroll(),
            KeyCode::Char('w') | KeyCode::Char('W') => self.wrap = !self.wrap,
            _ => {}
        }
        before != (self.scroll_y, self.wrap)
    }
}

/// Two-column name/value table with a row cursor.
pub struct PairTable {
    heading: (&'static str, &'static str),
    rows: Vec<NameValue>,
    state: TableState,
}

impl PairTable {
    pub fn new(name: &'static str, value: &'static str) -> Self {
        Self {
            heading: (name, value),
            rows: Vec::new(),
            state: TableState::default(),
        }
    }

    pub fn rows(&self) -> &[NameValue] {
        &self.rows
    }

    pub fn set_rows(&mut self, rows: Vec<NameValue>) {
        self.state = TableState::default();
        if !rows.is_empty() {
            self.state.select(Some(0));
        }
        self.rows = rows;
    }
}

impl Widget for PairTable {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        let name_w = self
            .rows
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(self.heading.0.len(), 40) as u16;
        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|r| Row::new(vec![r.name.clone(), r.value.clone()]))
            .collect();
        let header = Row::new(vec![self.heading.0, self.heading.1])
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        let mut table = Table::new(rows, [Constraint::Length(name_w + 1), Constraint::Min(1)])
            .header(header);
        if focused {
            table = table.row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        }
        f.render_stateful_widget(table, area, &mut self.state);
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        let cur = self.state.selected().unwrap_or(0);
        let last = self.rows.len() - 1;
        let next = match key.code {
            KeyCode::Up | KeyCode::Char('k') => cur.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => (cur + 1).min(last),
            KeyCode::Home => 0,
            KeyCode::End => last,
            _ => cur,
        };
        self.state.select(Some(next));
        next != cur
    }
}

/// The four response pages plus which history entry they show.
pub struct ResponsePanels {
    pub body: TextViewer,
    pub headers: PairTable,
    pub cookies: PairTable,
    pub logs: TextViewer,
    shown: Option<(usize, ResponseRecord)>,
}

impl Default for ResponsePanels {
    fn default() -> Self {
        Self {
            body: TextViewer::new(),
            headers: PairTable::new("Header", "Value"),
            cookies: PairTable::new("Cookie", "Value"),
            logs: TextViewer::new(),
            shown: None,
        }
    }
}

impl ResponsePanels {
    pub fn show(&mut self, res: &ResponseRecord, history_index: usize) {
        self.body.set_text(pretty_body(&res.body));
        self.headers.set_rows(res.headers.clone());
        self.cookies.set_rows(res.cookies.clone());
        self.logs.set_text(res.trace_logs.clone());
        self.shown = Some((history_index, res.clone()));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn shown(&self) -> Option<&ResponseRecord> {
        self.shown.as_ref().map(|(_, r)| r)
    }

    pub fn shown_index(&self) -> Option<usize> {
        self.shown.as_ref().map(|(i, _)| *i)
    }

    /// Body exactly as received, not the pretty-printed form.
    pub fn shown_body(&self) -> Option<String> {
        self.shown().map(|r| r.body.clone())
    }
}

/// Pretty-print JSON bodies; anything else is shown verbatim.
pub fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(v) if v.is_object() || v.is_array() => {
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| body.to_string())
        }
        _ => body.to_string(),
    }
}

pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

pub fn draw_status_line(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let focused = matches!(state.nav.view, View::History | View::HistoryOptions);
    let block = panel_block("History", focused, theme);
    let line = match state.response.shown() {
        Some(res) => {
            let total = state.history.len();
            let pos = state.response.shown_index().unwrap_or(0) + 1;
            Line::from(vec![
                Span::styled(res.status.clone(), theme.status_style(&res.status)),
                Span::raw("  "),
                Span::raw(res.duration.clone()),
                Span::styled("  ·  ", theme.text_muted()),
                Span::raw(res.size.clone()),
                Span::styled("  ·  ", theme.text_muted()),
                Span::raw(relative_time(res.response_at, Utc::now())),
                Span::styled(format!("  [{pos}/{total}]"), theme.text_muted()),
            ])
        }
        None => Line::styled("No response yet", theme.text_muted()),
    };
    f.render_widget(Paragraph::new(line).block(block), area);
}

/// History picker drawn over whatever sits below the status line.
pub fn draw_history_options(f: &mut Frame, anchor: Rect, bounds: Rect, state: &AppState) {
    let Some(record) = state.requests.get(state.request_cursor.index()) else {
        return;
    };
    let now = Utc::now();
    let options: Vec<String> = record
        .responses
        .iter()
        .map(|r| format!("{}  {}  {}", r.status, r.duration, relative_time(r.response_at, now)))
        .collect();
    let rect = dropdown_rect(anchor, options.len() as u16 + 2, bounds);
    draw_options(
        f,
        rect,
        &options,
        state.response.shown_index().unwrap_or(0),
        state.history.index(),
        &state.theme,
    );
}

pub fn draw_response(f: &mut Frame, area: Rect, state: &mut AppState) {
    let theme = state.theme.clone();
    let view = state.nav.view;
    let in_group = state.response_pages.contains(view);
    let titles = ["Body", "Headers", "Cookies", "Logs"];
    let tabs = Tabs::new(titles.iter().map(|t| Line::from(*t)).collect::<Vec<_>>())
        .select(state.response_pages.page())
        .style(Style::default().fg(theme.muted))
        .highlight_style(if in_group {
            theme.text_editing_bold()
        } else {
            theme.text_active_bold()
        })
        .divider(Span::styled(" │ ", Style::default().fg(theme.frame)));
    let block = panel_block(tabs_title(state), in_group, &theme);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);
    f.render_widget(tabs, rows[0]);

    let editing = state.nav.focused();
    let panels = &mut state.response;
    let tick = state.tick;
    match state.response_pages.current_view() {
        View::ResponseHeaders => panels.headers.render(
            f,
            rows[1],
            editing == Some(FocusTarget::ResponseHeaders),
            tick,
        ),
        View::ResponseCookies => panels.cookies.render(
            f,
            rows[1],
            editing == Some(FocusTarget::ResponseCookies),
            tick,
        ),
        View::ResponseLogs => {
            panels
                .logs
                .render(f, rows[1], editing == Some(FocusTarget::ResponseLogs), tick)
        }
        _ => panels
            .body
            .render(f, rows[1], editing == Some(FocusTarget::ResponseBody), tick),
    }
}

fn tabs_title(state: &AppState) -> String {
    let dots: String = (0..state.response_pages.page_count())
        .map(|i| if i == state.response_pages.page() { '●' } else { '○' })
        .collect();
    format!("Response {dots}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn end_jumps_to_bottom_and_w_toggles_wrap() {
        let text = (0..30)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut w = TextViewer::new();
        w.set_text(text);
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| w.render(f, Rect::new(0, 0, 40, 10), true, 0))
            .unwrap();
        assert!(w.on_key(key(KeyCode::End)));
        assert_eq!(w.scroll_y, 20);
        assert!(!w.on_key(key(KeyCode::Down)));
        assert!(w.wrap);
        w.on_key(key(KeyCode::Char('w')));
        assert!(!w.wrap);
    }

    #[test]
    fn pair_table_cursor_is_clamped() {
        let mut t = PairTable::new("Header", "Value");
        assert!(!t.on_key(key(KeyCode::Down)));
        t.set_rows(vec![NameValue::new("a", "1"), NameValue::new("b", "2")]);
        assert!(t.on_key(key(KeyCode::Down)));
        assert!(!t.on_key(key(KeyCode::Down)));
        assert!(t.on_key(key(KeyCode::Home)));
    }

    #[test]
    fn json_bodies_are_pretty_printed() {
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(pretty_body("plain"), "plain");
        assert_eq!(pretty_body("42"), "42");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - chrono::Duration::seconds(30), now), "30s ago");
        assert_eq!(relative_time(now - chrono::Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_time(now - chrono::Duration::hours(3), now), "3h ago");
        assert_eq!(relative_time(now - chrono::Duration::days(2), now), "2d ago");
        assert_eq!(relative_time(now + chrono::Duration::seconds(9), now), "just now");
    }
}
