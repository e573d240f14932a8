use crate::deck_core::focus::{FocusTarget, View};
use crate::ui::AppState;
use crate::widgets::chrome::panel_block;
use crate::widgets::Widget;
use ratatui::prelude::*;
use ratatui::widgets::*;

const HELP: [(&str, &str); 8] = [
    ("j/k", "down/up"),
    ("h/l", "prev/next"),
    ("enter", "open/edit"),
    ("esc", "back"),
    ("n", "new"),
    ("d", "delete"),
    ("^c", "copy"),
    ("q", "quit"),
];

/// Visible `[start, end)` window keeping `selected` on screen, scrolled as little as possible.
pub(crate) fn compute_scroll_window(total: usize, selected: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let ih = inner_h as usize;
    let sel = selected.min(total - 1);
    let start = sel.saturating_sub(ih - 1);
    (start, (start + ih).min(total))
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, state: &mut AppState) {
    let help_h = HELP.len() as u16 / 2 + 2;
    let rows = Layout::vertical([Constraint::Length(help_h), Constraint::Min(0)]).split(area);
    draw_help(f, rows[0], state);
    draw_requests(f, rows[1], state);
}

fn draw_help(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let lines: Vec<Line> = HELP
        .chunks(2)
        .map(|pair| {
            let mut spans = Vec::new();
            for (k, what) in pair {
                spans.push(Span::styled(format!("{k:>5} "), theme.text_active_bold()));
                spans.push(Span::styled(format!("{what:<10}"), theme.text_muted()));
            }
            Line::from(spans)
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(panel_block("Keys", false, theme)),
        area,
    );
}

fn draw_requests(f: &mut Frame, area: Rect, state: &mut AppState) {
    let theme = state.theme.clone();
    let focused = state.nav.view == View::Requests;
    let block = panel_block(
        format!("Requests ({})", state.requests.len()),
        focused,
        &theme,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);
    if state.requests.is_empty() {
        f.render_widget(
            Paragraph::new("press n to create a request").style(theme.text_muted()),
            inner,
        );
        return;
    }
    let current = state.request_cursor.index();
    let (start, end) = compute_scroll_window(state.requests.len(), current, inner.height);
    let editing_name = state.nav.focused() == Some(FocusTarget::RequestName);
    for (row, idx) in (start..end).enumerate() {
        let rect = Rect {
            x: inner.x,
            y: inner.y + row as u16,
            width: inner.width,
            height: 1,
        };
        let Some(req) = state.requests.get(idx) else {
            break;
        };
        if idx == current && editing_name {
            let tick = state.tick;
            state.draft.name.render(f, rect, true, tick);
            continue;
        }
        let method = Span::styled(
            format!("{:<7}", req.method),
            Style::default().fg(theme.method_color(&req.method)),
        );
        let name = if idx == current {
            Span::styled(
                req.name.clone(),
                if focused {
                    theme.list_cursor_style()
                } else {
                    theme.text_editing_bold()
                },
            )
        } else {
            Span::raw(req.name.clone())
        };
        f.render_widget(Paragraph::new(Line::from(vec![method, name])), rect);
    }
}
