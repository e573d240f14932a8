use crate::app::draft::PairList;
use crate::deck_core::focus::{FocusTarget, View};
use crate::theme::Theme;
use crate::ui::AppState;
use crate::widgets::chrome::{draw_options, dropdown_rect, panel_block};
use crate::widgets::Widget;
use ratatui::prelude::*;
use ratatui::widgets::*;

const DIVIDER: &str = " │ ";

fn tab_titles(state: &AppState) -> [String; 4] {
    [
        format!("Body: {}", state.draft.body.kinds.label()),
        format!("Auth: {}", state.draft.auth.kinds.label()),
        format!("Query ({})", state.draft.query.pairs().len()),
        format!("Headers ({})", state.draft.headers.pairs().len()),
    ]
}

/// Column where tab `idx` starts, matching `Tabs` default one-cell padding.
fn tab_x(titles: &[String], idx: usize) -> u16 {
    titles
        .iter()
        .take(idx)
        .map(|t| t.chars().count() as u16 + 2 + DIVIDER.chars().count() as u16)
        .sum()
}

/// Tab row for body/auth/query/headers; returns the rect to hang an open selector under.
pub fn draw_settings_bar(f: &mut Frame, area: Rect, state: &AppState) -> Rect {
    let theme = &state.theme;
    let view = state.nav.view;
    let page = state.request_pages.page();
    let titles = tab_titles(state);
    let in_bar = matches!(
        view,
        View::BodyType
            | View::AuthType
            | View::Query
            | View::Headers
            | View::BodyOptions
            | View::AuthOptions
    );
    let dots: String = (0..state.request_pages.page_count())
        .map(|i| if i == page { '●' } else { '○' })
        .collect();
    let tabs = Tabs::new(titles.iter().map(|t| Line::from(t.clone())).collect::<Vec<_>>())
        .select(page)
        .style(Style::default().fg(theme.muted))
        .highlight_style(if in_bar {
            theme.list_cursor_style()
        } else {
            theme.text_active_bold()
        })
        .divider(Span::styled(DIVIDER, Style::default().fg(theme.frame)));
    let block = panel_block(format!("Settings {dots}"), in_bar, theme);
    let inner = block.inner(area);
    f.render_widget(tabs.block(block), area);
    let x = inner.x + tab_x(&titles, page).min(inner.width);
    Rect {
        x,
        y: inner.y,
        width: inner.width.saturating_sub(x - inner.x),
        height: 1,
    }
}

pub fn draw_settings_options(f: &mut Frame, anchor: Rect, bounds: Rect, state: &AppState) {
    let selector = match state.nav.view {
        View::BodyOptions => &state.draft.body.kinds,
        View::AuthOptions => &state.draft.auth.kinds,
        _ => return,
    };
    let rect = dropdown_rect(anchor, selector.options().len() as u16 + 2, bounds);
    draw_options(
        f,
        rect,
        selector.options(),
        selector.selected(),
        selector.highlighted(),
        &state.theme,
    );
}

pub fn draw_settings_content(f: &mut Frame, area: Rect, state: &mut AppState) {
    let theme = state.theme.clone();
    let view = state.nav.view;
    let editing = state.nav.focused();
    let tick = state.tick;
    match state.request_pages.current_view() {
        View::AuthType => {
            let focused = view == View::AuthContent;
            let block = panel_block("Auth", focused, &theme);
            let inner = block.inner(area);
            f.render_widget(block, area);
            let auth = &mut state.draft.auth;
            let labels = auth.kind().field_labels();
            if labels.is_empty() {
                f.render_widget(
                    Paragraph::new("No auth. Enter on the auth tab to pick a scheme.")
                        .style(theme.text_muted()),
                    inner,
                );
                return;
            }
            let cursor = auth.field_index();
            for (i, (field, label)) in auth
                .active_fields_mut()
                .iter_mut()
                .zip(labels.iter())
                .enumerate()
            {
                let y = inner.y + i as u16;
                if y >= inner.y + inner.height {
                    break;
                }
                let cols = Layout::horizontal([Constraint::Length(10), Constraint::Min(1)])
                    .split(Rect::new(inner.x, y, inner.width, 1));
                let label_style = if focused && i == cursor {
                    theme.list_cursor_style()
                } else {
                    theme.text_muted()
                };
                f.render_widget(Paragraph::new(Span::styled(*label, label_style)), cols[0]);
                let is_editing = editing == Some(FocusTarget::AuthField) && i == cursor;
                field.render(f, cols[1], is_editing, tick);
            }
        }
        View::Query => draw_pairs(
            f,
            area,
            &mut state.draft.query,
            view == View::QueryContent,
            editing == Some(FocusTarget::QuerySlot),
            "Query params",
            &theme,
            tick,
        ),
        View::Headers => draw_pairs(
            f,
            area,
            &mut state.draft.headers,
            view == View::HeadersContent,
            editing == Some(FocusTarget::HeaderSlot),
            "Headers",
            &theme,
            tick,
        ),
        _ => {
            let focused = view == View::BodyContent;
            let title = format!("Body ({})", state.draft.body.kinds.label());
            let block = panel_block(title, focused, &theme);
            let inner = block.inner(area);
            f.render_widget(block, area);
            if !state.draft.body.has_content() {
                f.render_widget(
                    Paragraph::new("No body. Enter on the body tab to pick a type.")
                        .style(theme.text_muted()),
                    inner,
                );
                return;
            }
            state
                .draft
                .body
                .editor
                .render(f, inner, editing == Some(FocusTarget::Body), tick);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_pairs(
    f: &mut Frame,
    area: Rect,
    list: &mut PairList,
    focused: bool,
    editing: bool,
    title: &str,
    theme: &Theme,
    tick: u64,
) {
    let block = panel_block(title.to_string(), focused, theme);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let cursor = list.cursor().index();
    let half = inner.width / 2;
    for (pair, slots) in list.fields_mut().chunks_mut(2).enumerate() {
        let y = inner.y + pair as u16;
        if y >= inner.y + inner.height {
            break;
        }
        for (slot, field) in slots.iter_mut().enumerate() {
            let idx = pair * 2 + slot;
            let rect = Rect::new(inner.x + half * slot as u16, y, half.saturating_sub(1), 1);
            if focused && !editing && idx == cursor {
                f.render_widget(
                    Block::default().style(Style::default().add_modifier(Modifier::UNDERLINED)),
                    rect,
                );
            }
            field.render(f, rect, editing && idx == cursor, tick);
        }
    }
}
