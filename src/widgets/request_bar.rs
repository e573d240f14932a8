use crate::deck_core::focus::{FocusTarget, View};
use crate::ui::AppState;
use crate::widgets::chrome::panel_block;
use crate::widgets::Widget;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Method, URL and Send; returns the method rect so the options list can hang under it.
pub fn draw_request_bar(f: &mut Frame, area: Rect, state: &mut AppState) -> Rect {
    let theme = state.theme.clone();
    let view = state.nav.view;
    let cols = Layout::horizontal([
        Constraint::Length(11),
        Constraint::Min(10),
        Constraint::Length(8),
    ])
    .split(area);

    let method = state.draft.method.label().to_string();
    let method_style = Style::default()
        .fg(theme.method_color(&method))
        .add_modifier(Modifier::BOLD);
    f.render_widget(
        Paragraph::new(Span::styled(method, method_style))
            .alignment(Alignment::Center)
            .block(panel_block(
                "Method",
                matches!(view, View::Method | View::MethodOptions),
                &theme,
            )),
        cols[0],
    );

    let editing = state.nav.focused() == Some(FocusTarget::Url);
    let block = panel_block("URL", view == View::Url, &theme);
    let inner = block.inner(cols[1]);
    f.render_widget(block, cols[1]);
    let tick = state.tick;
    state.draft.url.render(f, inner, editing, tick);

    let send_focused = view == View::Send;
    let pending = state
        .requests
        .get(state.request_cursor.index())
        .and_then(|r| r.id)
        .is_some_and(|id| state.in_flight.contains(&id));
    let label = if pending {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][tick as usize % 6];
        format!("{spinner} ...")
    } else {
        "Send".to_string()
    };
    let style = if send_focused {
        theme.list_cursor_style()
    } else {
        theme.text_active_bold()
    };
    f.render_widget(
        Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(panel_block("", send_focused, &theme)),
        cols[2],
    );
    cols[0]
}
