pub mod commit;
pub mod draft;

use crate::deck_core::focus::{FocusTarget, NavigationState, PairListKind, View};
use crate::deck_core::registry::{self, Action, PageGroupKind};
use crate::deck_core::router;
use crate::model::{RequestRecord, ResponseRecord, NEW_REQUEST_NAME};
use crate::nav::cursor::BoundedCursor;
use crate::nav::keys::{is_copy_chord, LogicalKey};
use crate::services::transport::{OutgoingRequest, TransportMsg};
use crate::ui::{AppState, ToastLevel};
use commit::commit;
use crossterm::event::KeyEvent;
use draft::Draft;

pub enum AppMsg {
    Key(KeyEvent),
    Response(TransportMsg),
}

pub enum Effect {
    Send(OutgoingRequest),
    Copy {
        text: String,
        what: &'static str,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

impl Effect {
    pub fn toast(state: &AppState, level: ToastLevel, text: impl Into<String>) -> Effect {
        Effect::ShowToast {
            text: text.into(),
            level,
            seconds: state.config.toast_secs,
        }
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        AppMsg::Key(key) => on_key(state, key, &mut effects),
        AppMsg::Response(msg) => on_response(state, msg, &mut effects),
    }
    // Pages are derived from the view, never moved on their own.
    state.request_pages.follow(state.nav.view);
    state.response_pages.follow(state.nav.view);
    effects
}

fn on_key(state: &mut AppState, key: KeyEvent, effects: &mut Vec<Effect>) {
    if state.nav.is_editing() {
        let action = LogicalKey::from_key(&key)
            .and_then(|lk| registry::resolve(&state.nav, lk))
            .unwrap_or(Action::Forward);
        match action {
            Action::ExitEdit => exit_edit(state, effects),
            _ => {
                router::forward(state, key);
            }
        }
        return;
    }
    if is_copy_chord(&key) {
        copy(state, effects);
        return;
    }
    let Some(lk) = LogicalKey::from_key(&key) else {
        return;
    };
    if state.requests.is_empty() {
        // Nothing to navigate; only creating a request or quitting makes sense.
        state.nav.view = View::Requests;
        match lk {
            LogicalKey::New => apply(state, Action::NewRequest, effects),
            LogicalKey::Quit => apply(state, Action::Quit, effects),
            _ => {}
        }
        return;
    }
    if let Some(action) = registry::resolve(&state.nav, lk) {
        state.dbg(format!("{} {lk:?} -> {action:?}", state.nav.view.label()));
        tracing::debug!(view = ?state.nav.view, key = ?lk, action = ?action, "transition");
        apply(state, action, effects);
    }
}

fn apply(state: &mut AppState, action: Action, effects: &mut Vec<Effect>) {
    match action {
        Action::Goto(v) => state.nav.view = v,
        Action::Page { group, forward } => {
            let g = match group {
                PageGroupKind::RequestSettings => &mut state.request_pages,
                PageGroupKind::Response => &mut state.response_pages,
            };
            let moved = if forward { g.next_page() } else { g.prev_page() };
            if moved {
                state.nav.view = g.current_view();
            }
        }
        Action::EnterRequestGroup => state.nav.view = state.request_pages.current_view(),
        Action::EnterResponseGroup => state.nav.view = state.response_pages.current_view(),
        Action::DescendBody => {
            state.nav.view = if state.draft.body.has_content() {
                View::BodyContent
            } else {
                View::History
            };
        }
        Action::DescendAuth => {
            state.nav.view = if state.draft.auth.has_content() {
                View::AuthContent
            } else {
                View::History
            };
        }
        Action::AscendFromHistory => state.nav.view = deepest_settings_view(state),
        Action::SelectRequest { forward } => {
            let moved = if forward {
                state.request_cursor.down()
            } else {
                state.request_cursor.up()
            };
            if moved {
                load_current(state);
            }
        }
        Action::OpenOptions(v) => open_options(state, v),
        Action::OptionCursor { forward } => match state.nav.view {
            View::MethodOptions => {
                state.draft.method.step(forward);
            }
            View::BodyOptions => {
                state.draft.body.kinds.step(forward);
            }
            View::AuthOptions => {
                state.draft.auth.kinds.step(forward);
            }
            View::HistoryOptions => {
                if forward {
                    state.history.down();
                } else {
                    state.history.up();
                }
            }
            _ => {}
        },
        Action::ConfirmOption => confirm_option(state, effects),
        Action::CloseOptions => state.nav.view = state.nav.view.owner(),
        Action::FieldCursor { forward } => {
            let moved = match state.draft.auth.cursor_mut() {
                Some(c) if forward => c.down(),
                Some(c) => c.up(),
                None => false,
            };
            if !moved {
                state.nav.view = if forward {
                    View::History
                } else {
                    View::AuthType
                };
            }
        }
        Action::PairCursor { list, forward } => {
            let cursor = state.draft.pairs_mut(list).cursor_mut();
            let moved = if forward { cursor.down() } else { cursor.up() };
            if !moved {
                state.nav.view = if forward {
                    View::History
                } else {
                    list.list_view()
                };
            }
        }
        Action::PairSlot { list, forward } => {
            let cursor = state.draft.pairs_mut(list).cursor_mut();
            if forward {
                cursor.next_slot();
            } else {
                cursor.prev_slot();
            }
        }
        Action::Focus(target) => focus(state, target),
        Action::Send => send(state, effects),
        Action::NewRequest => new_request(state),
        Action::DeleteRequest => delete_request(state, effects),
        Action::NewPair(list) => {
            state.draft.pairs_mut(list).focus_new();
            state.nav.view = list.content_view();
            state.nav.enter_edit(slot_target(list));
        }
        Action::ExitEdit => exit_edit(state, effects),
        // Raw keys are routed in `on_key`; nothing to do without the event.
        Action::Forward => {}
        Action::Quit => state.should_quit = true,
    }
}

fn slot_target(list: PairListKind) -> FocusTarget {
    match list {
        PairListKind::Query => FocusTarget::QuerySlot,
        PairListKind::Headers => FocusTarget::HeaderSlot,
    }
}

fn deepest_settings_view(state: &AppState) -> View {
    match state.request_pages.current_view() {
        View::BodyType if state.draft.body.has_content() => View::BodyContent,
        View::AuthType if state.draft.auth.has_content() => View::AuthContent,
        View::Query => View::QueryContent,
        View::Headers => View::HeadersContent,
        other => other,
    }
}

fn open_options(state: &mut AppState, view: View) {
    match view {
        View::MethodOptions => state.draft.method.open(),
        View::BodyOptions => state.draft.body.kinds.open(),
        View::AuthOptions => state.draft.auth.kinds.open(),
        View::HistoryOptions => {
            if !state.history.is_active() {
                return;
            }
            state.history.set(state.response.shown_index().unwrap_or(0));
        }
        _ => return,
    }
    state.nav.view = view;
}

fn confirm_option(state: &mut AppState, effects: &mut Vec<Effect>) {
    match state.nav.view {
        View::MethodOptions => {
            state.draft.method.confirm();
            commit(state, effects);
        }
        View::BodyOptions => {
            state.draft.body.confirm_variant();
            commit(state, effects);
        }
        View::AuthOptions => {
            state.draft.auth.kinds.confirm();
            commit(state, effects);
        }
        View::HistoryOptions => {
            let idx = state.history.index();
            if let Some(res) = current_request(state).and_then(|r| r.responses.get(idx)) {
                let res = res.clone();
                state.response.show(&res, idx);
            }
        }
        _ => return,
    }
    state.nav.view = state.nav.view.owner();
}

fn focus(state: &mut AppState, target: FocusTarget) {
    let available = match target {
        FocusTarget::Body => state.draft.body.has_content(),
        FocusTarget::AuthField => state.draft.auth.has_content(),
        _ => true,
    };
    if available && router::focused_widget(state, target).is_some() {
        state.nav.enter_edit(target);
    }
}

/// Leave Edit mode, committing unless the focused widget was a read-only viewer.
pub fn exit_edit(state: &mut AppState, effects: &mut Vec<Effect>) {
    let Some(target) = state.nav.exit_edit() else {
        return;
    };
    if !target.is_read_only() {
        commit(state, effects);
    }
}

fn current_request(state: &AppState) -> Option<&RequestRecord> {
    state.requests.get(state.request_cursor.index())
}

/// Rebuild the draft and response panels from the request under the cursor.
pub fn load_current(state: &mut AppState) {
    match state.requests.get(state.request_cursor.index()) {
        Some(record) => {
            state.draft = Draft::load(record);
            state.history = BoundedCursor::new(record.responses.len());
            match record.responses.first() {
                Some(latest) => state.response.show(latest, 0),
                None => state.response.clear(),
            }
        }
        None => {
            state.draft = Draft::default();
            state.history = BoundedCursor::new(0);
            state.response.clear();
        }
    }
}

fn new_request(state: &mut AppState) {
    state.requests.push(RequestRecord::new(NEW_REQUEST_NAME));
    state.request_cursor.resize(state.requests.len());
    state.request_cursor.set(state.requests.len() - 1);
    load_current(state);
    state.nav = NavigationState {
        view: View::Requests,
        mode: crate::deck_core::focus::Mode::Edit(FocusTarget::RequestName),
    };
    tracing::debug!(count = state.requests.len(), "new request drafted");
}

fn delete_request(state: &mut AppState, effects: &mut Vec<Effect>) {
    let idx = state.request_cursor.index();
    let Some(id) = state.requests.get(idx).map(|r| r.id) else {
        return;
    };
    if let (Some(id), Some(store)) = (id, state.store.as_mut()) {
        if let Err(e) = store.delete(id) {
            tracing::error!(request_id = id, error = %e, "deleting request failed");
            effects.push(Effect::toast(
                state,
                ToastLevel::Error,
                format!("Delete failed: {e}"),
            ));
            return;
        }
    }
    if let Some(id) = id {
        state.in_flight.remove(&id);
    }
    let removed = state.requests.remove(idx);
    state.request_cursor.resize(state.requests.len());
    load_current(state);
    state.nav = NavigationState::default();
    tracing::info!(request_id = ?removed.id, name = %removed.name, "request deleted");
}

fn send(state: &mut AppState, effects: &mut Vec<Effect>) {
    let idx = state.request_cursor.index();
    if state.requests.get(idx).is_some_and(|r| r.id.is_none()) {
        commit(state, effects);
    }
    let Some(id) = state.requests.get(idx).and_then(|r| r.id) else {
        effects.push(Effect::toast(
            state,
            ToastLevel::Error,
            "Request must be saved before sending",
        ));
        return;
    };
    if !state.in_flight.insert(id) {
        effects.push(Effect::toast(
            state,
            ToastLevel::Info,
            "Request already in flight",
        ));
        return;
    }
    let outgoing = state.draft.outgoing(id);
    state.dbg(format!("send {} {}", outgoing.method, outgoing.url));
    effects.push(Effect::Send(outgoing));
}

fn on_response(state: &mut AppState, msg: TransportMsg, effects: &mut Vec<Effect>) {
    state.in_flight.remove(&msg.request_id);
    let Some(pos) = state
        .requests
        .iter()
        .position(|r| r.id == Some(msg.request_id))
    else {
        tracing::debug!(request_id = msg.request_id, "dropping completion for deleted request");
        return;
    };
    let res = match msg.outcome {
        Ok(res) => res,
        Err(e) => {
            effects.push(Effect::toast(
                state,
                ToastLevel::Error,
                format!("Request failed: {e}"),
            ));
            exit_edit(state, effects);
            return;
        }
    };
    let mut record = ResponseRecord {
        id: None,
        request_id: msg.request_id,
        request_method: msg.method,
        request_url: msg.url,
        body: res.body,
        status: res.status,
        headers: res.headers,
        cookies: res.cookies,
        duration: res.duration,
        size: res.size,
        response_at: res.response_at,
        trace_logs: res.trace_logs,
    };
    if let Some(store) = state.store.as_mut() {
        if let Err(e) = store.append_response(&mut record) {
            tracing::error!(request_id = msg.request_id, error = %e, "saving response failed");
            effects.push(Effect::toast(
                state,
                ToastLevel::Error,
                format!("Response not saved: {e}"),
            ));
        }
    }
    let summary = format!("{} in {}", record.status, record.duration);
    state.requests[pos].responses.insert(0, record);
    if pos == state.request_cursor.index() {
        let len = state.requests[pos].responses.len();
        state.history.resize(len);
        state.history.set(0);
        let latest = state.requests[pos].responses[0].clone();
        state.response.show(&latest, 0);
    }
    effects.push(Effect::toast(state, ToastLevel::Success, summary));
}

fn copy(state: &mut AppState, effects: &mut Vec<Effect>) {
    if state.nav.view.in_response_area() {
        if let Some(text) = state.response.shown_body() {
            effects.push(Effect::Copy {
                text,
                what: "response body",
            });
        }
        return;
    }
    if let Some(record) = current_request(state) {
        let curl = state.draft.outgoing(record.id.unwrap_or_default()).to_curl();
        effects.push(Effect::Copy {
            text: curl,
            what: "curl command",
        });
    }
}

#[cfg(test)]
mod tests;
