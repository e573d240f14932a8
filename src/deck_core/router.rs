use crate::deck_core::focus::FocusTarget;
use crate::ui::AppState;
use crate::widgets::Widget;
use crossterm::event::KeyEvent;

/// The one widget that owns keystrokes for `target`, if it exists right now.
pub fn focused_widget(state: &mut AppState, target: FocusTarget) -> Option<&mut dyn Widget> {
    let draft = &mut state.draft;
    let w: &mut dyn Widget = match target {
        FocusTarget::RequestName => &mut draft.name,
        FocusTarget::Url => &mut draft.url,
        FocusTarget::Body => &mut draft.body.editor,
        FocusTarget::AuthField => draft.auth.focused_mut()?,
        FocusTarget::QuerySlot => draft.query.focused_mut()?,
        FocusTarget::HeaderSlot => draft.headers.focused_mut()?,
        FocusTarget::ResponseBody => &mut state.response.body,
        FocusTarget::ResponseHeaders => &mut state.response.headers,
        FocusTarget::ResponseCookies => &mut state.response.cookies,
        FocusTarget::ResponseLogs => &mut state.response.logs,
    };
    Some(w)
}

/// Deliver a raw key to the focused widget; `false` when nothing is focused.
pub fn forward(state: &mut AppState, key: KeyEvent) -> bool {
    let Some(target) = state.nav.focused() else {
        return false;
    };
    match focused_widget(state, target) {
        Some(w) => w.on_key(key),
        None => false,
    }
}
