use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

pub fn panel_block<'a>(title: impl Into<Line<'a>>, focused: bool, theme: &Theme) -> Block<'a> {
    let b = Block::default().borders(Borders::ALL).title(title);
    if focused {
        b.border_style(theme.border_focused())
    } else {
        b.border_style(theme.border_unfocused())
    }
}

/// Rect of `height` rows directly below `anchor`, clipped to `bounds`.
pub fn dropdown_rect(anchor: Rect, height: u16, bounds: Rect) -> Rect {
    let y = anchor.y.saturating_add(anchor.height);
    let max_h = bounds.y.saturating_add(bounds.height).saturating_sub(y);
    Rect {
        x: anchor.x,
        y,
        width: anchor.width.max(16).min(bounds.width),
        height: height.min(max_h),
    }
}

/// Floating option list: `selected` is marked, `highlighted` carries the cursor.
pub fn draw_options(
    f: &mut Frame,
    area: Rect,
    options: &[String],
    selected: usize,
    highlighted: usize,
    theme: &Theme,
) {
    if area.height == 0 {
        return;
    }
    let items: Vec<ListItem> = options
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let mark = if i == selected { "● " } else { "  " };
            ListItem::new(format!("{mark}{o}"))
        })
        .collect();
    let mut ls = ListState::default();
    ls.select(Some(highlighted));
    let list = List::new(items)
        .block(panel_block("", true, theme))
        .style(theme.base_style())
        .highlight_style(theme.list_cursor_style());
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut ls);
}
