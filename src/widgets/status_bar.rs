use crate::deck_core::focus::View;
use crate::ui::{AppState, ToastLevel};
use ratatui::prelude::*;
use ratatui::widgets::*;

fn context_help(state: &AppState) -> &'static str {
    if state.nav.is_editing() {
        return "esc done";
    }
    match state.nav.view {
        View::Requests => "j/k select  enter rename  n new  d delete  tab next",
        View::Method | View::BodyType | View::AuthType | View::History => "enter choose  j down",
        View::Url => "enter edit  tab next",
        View::Send => "enter send",
        View::Query | View::Headers => "enter open  n add",
        View::QueryContent | View::HeadersContent => "enter edit  h/l name/value  esc back",
        View::BodyContent | View::AuthContent => "enter edit  esc back",
        v if v.is_options() => "j/k move  enter pick  esc cancel",
        _ => "enter focus  tab next  ^c copy",
    }
}

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let mut spans: Vec<Span> = Vec::new();
    let (mode, mode_style) = if state.nav.is_editing() {
        ("EDIT", theme.text_editing_bold())
    } else {
        ("NAV", theme.text_active_bold())
    };
    spans.push(Span::styled(format!(" {mode} "), mode_style.add_modifier(Modifier::REVERSED)));
    spans.push(Span::styled(
        format!(" {}  |  ", state.nav.view.label()),
        theme.text_muted(),
    ));
    if !state.in_flight.is_empty() {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][state.tick as usize % 6];
        spans.push(Span::styled(
            format!("{spinner} {} in flight  |  ", state.in_flight.len()),
            Style::default().fg(theme.primary),
        ));
    }
    if let Some(t) = &state.toast {
        let color = theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    spans.push(Span::styled(context_help(state), theme.text_muted()));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(state.theme.text_muted())
        .title(Span::styled(
            "Debug",
            state.theme.text_muted().add_modifier(Modifier::BOLD),
        ));
    let h = area.height.saturating_sub(1) as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b);
    f.render_widget(p, area);
}
