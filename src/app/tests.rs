use super::*;
use crate::deck_core::focus::Mode;
use crate::model::{AppConfig, NameValue, ResponseRecord};
use crate::services::store::memory::MemoryStore;
use crate::services::store::{SqliteStore, Store};
use crate::services::transport::{TransportError, TransportResponse};
use crate::ui::ToastLevel;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyModifiers};

fn press(st: &mut AppState, code: KeyCode) -> Vec<Effect> {
    update(st, AppMsg::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn keys(st: &mut AppState, seq: &str) -> Vec<Effect> {
    let mut out = Vec::new();
    for c in seq.chars() {
        out.extend(press(st, KeyCode::Char(c)));
    }
    out
}

fn enter(st: &mut AppState) -> Vec<Effect> {
    press(st, KeyCode::Enter)
}

fn esc(st: &mut AppState) -> Vec<Effect> {
    press(st, KeyCode::Esc)
}

fn toasts(effects: &[Effect]) -> Vec<(ToastLevel, String)> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::ShowToast { text, level, .. } => Some((*level, text.clone())),
            _ => None,
        })
        .collect()
}

fn saved(id: i64, name: &str) -> RequestRecord {
    let mut r = RequestRecord::new(name);
    r.id = Some(id);
    r.url = format!("https://example.com/{name}");
    r
}

fn response(request_id: i64, status: &str, body: &str) -> ResponseRecord {
    ResponseRecord {
        id: None,
        request_id,
        request_method: "GET".into(),
        request_url: "https://example.com".into(),
        body: body.into(),
        status: status.into(),
        headers: vec![NameValue::new("Content-Type", "application/json")],
        cookies: Vec::new(),
        duration: "12ms".into(),
        size: body.len().to_string(),
        response_at: Utc::now(),
        trace_logs: "resolve 1 ms\n".into(),
    }
}

fn ok_msg(request_id: i64, status: &str, body: &str) -> TransportMsg {
    TransportMsg {
        request_id,
        method: "GET".into(),
        url: "https://example.com".into(),
        outcome: Ok(TransportResponse {
            status: status.into(),
            headers: vec![NameValue::new("Content-Type", "application/json")],
            cookies: vec![NameValue::new("sid", "abc")],
            body: body.into(),
            size: body.len().to_string(),
            duration: "87ms".into(),
            response_at: Utc::now(),
            trace_logs: "resolve 2 ms\nfirst byte 80 ms\n".into(),
        }),
    }
}

fn with_store(requests: Vec<RequestRecord>) -> (AppState, MemoryStore) {
    let store = MemoryStore::with_requests(requests);
    let mut st = AppState::new(AppConfig::default(), Some(Box::new(store.clone())));
    let loaded = store.list_requests().unwrap();
    st.set_requests(loaded.requests);
    (st, store)
}

/// Page/view agreement and one focused widget exactly when editing.
fn check_invariants(st: &mut AppState) {
    let view = st.nav.view;
    if let Some(p) = st.request_pages.page_of(view) {
        assert_eq!(st.request_pages.page(), p, "settings page out of sync at {view:?}");
    }
    if let Some(p) = st.response_pages.page_of(view) {
        assert_eq!(st.response_pages.page(), p, "response page out of sync at {view:?}");
    }
    match st.nav.mode {
        Mode::Edit(target) => assert!(
            router::focused_widget(st, target).is_some(),
            "edit mode without a widget for {target:?}"
        ),
        Mode::Navigate => assert!(st.nav.focused().is_none()),
    }
}

#[test]
fn new_request_from_empty_list_enters_name_edit() {
    let (mut st, store) = with_store(Vec::new());
    keys(&mut st, "jlk");
    esc(&mut st);
    assert_eq!(st.nav, NavigationState::default());

    keys(&mut st, "n");
    assert_eq!(st.requests.len(), 1);
    assert_eq!(st.nav.view, View::Requests);
    assert_eq!(st.nav.mode, Mode::Edit(FocusTarget::RequestName));
    assert_eq!(st.draft.name.value(), NEW_REQUEST_NAME);
    assert_eq!(st.draft.method.label(), "GET");
    assert!(st.draft.url.value().is_empty());
    assert_eq!(st.draft.body.kinds.label(), "No body");

    keys(&mut st, " 2");
    esc(&mut st);
    assert_eq!(st.nav.mode, Mode::Navigate);
    assert_eq!(store.state.borrow().saves, 1);
    assert_eq!(st.requests[0].name, "New Request 2");
    assert!(st.requests[0].id.is_some());
}

#[test]
fn choosing_json_body_commits_once_and_closes_options() {
    let (mut st, store) = with_store(vec![saved(1, "users")]);
    keys(&mut st, "lj");
    assert_eq!(st.nav.view, View::BodyType);
    enter(&mut st);
    assert_eq!(st.nav.view, View::BodyOptions);
    keys(&mut st, "j");
    assert_eq!(st.draft.body.kinds.label(), "No body");
    enter(&mut st);
    assert_eq!(st.nav.view, View::BodyType);
    assert_eq!(st.draft.body.kinds.label(), "Json");
    assert_eq!(st.requests[0].body.selected, 1);
    assert_eq!(store.state.borrow().saves, 1);
}

#[test]
fn escape_closes_options_without_changing_selection() {
    let (mut st, store) = with_store(vec![saved(1, "users")]);
    keys(&mut st, "l");
    enter(&mut st);
    assert_eq!(st.nav.view, View::MethodOptions);
    keys(&mut st, "jj");
    esc(&mut st);
    assert_eq!(st.nav.view, View::Method);
    assert_eq!(st.draft.method.label(), "GET");
    assert_eq!(store.state.borrow().saves, 0);
}

#[test]
fn down_at_last_pair_moves_to_history() {
    let (mut st, _store) = with_store(vec![saved(1, "users")]);
    keys(&mut st, "ljlll");
    assert_eq!(st.nav.view, View::Headers);
    assert_eq!(st.request_pages.page(), 3);
    keys(&mut st, "j");
    assert_eq!(st.nav.view, View::HeadersContent);
    assert_eq!(st.draft.headers.pair_count(), 1);
    keys(&mut st, "j");
    assert_eq!(st.draft.headers.cursor().index(), 0);
    assert_eq!(st.nav.view, View::History);
    keys(&mut st, "k");
    assert_eq!(st.nav.view, View::HeadersContent);
    keys(&mut st, "k");
    assert_eq!(st.nav.view, View::Headers);
}

#[test]
fn pair_slots_and_new_pair_edit() {
    let (mut st, store) = with_store(vec![saved(1, "users")]);
    keys(&mut st, "ljll");
    assert_eq!(st.nav.view, View::Query);
    keys(&mut st, "n");
    assert_eq!(st.nav.view, View::QueryContent);
    assert_eq!(st.nav.mode, Mode::Edit(FocusTarget::QuerySlot));
    keys(&mut st, "page");
    esc(&mut st);
    keys(&mut st, "l");
    assert_eq!(st.draft.query.cursor().index(), 1);
    enter(&mut st);
    keys(&mut st, "2");
    esc(&mut st);
    assert_eq!(st.requests[0].query, vec![NameValue::new("page", "2")]);
    assert_eq!(st.draft.query.pair_count(), 2);
    assert_eq!(store.state.borrow().saves, 2);
}

#[test]
fn send_appends_response_and_refreshes_panels() {
    let mut req = saved(1, "users");
    req.responses = vec![response(1, "200 OK", "old")];
    let (mut st, store) = with_store(vec![req]);
    assert_eq!(st.response.shown_body().as_deref(), Some("old"));

    keys(&mut st, "lll");
    assert_eq!(st.nav.view, View::Send);
    let effects = enter(&mut st);
    let sent: Vec<&OutgoingRequest> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].request_id, 1);
    assert_eq!(sent[0].url, "https://example.com/users");
    assert!(st.in_flight.contains(&1));

    let again = enter(&mut st);
    assert!(!again.iter().any(|e| matches!(e, Effect::Send(_))));
    assert_eq!(toasts(&again)[0].0, ToastLevel::Info);

    let effects = update(&mut st, AppMsg::Response(ok_msg(1, "201 Created", r#"{"id":5}"#)));
    assert!(st.in_flight.is_empty());
    assert_eq!(store.state.borrow().appends, 1);
    let history = &st.requests[0].responses;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, "201 Created");
    assert_eq!(history[1].body, "old");
    assert_eq!(st.response.body.text(), "{\n  \"id\": 5\n}");
    assert_eq!(st.response.cookies.rows(), [NameValue::new("sid", "abc")]);
    assert!(st.response.logs.text().contains("first byte"));
    assert_eq!(st.history.len(), 2);
    assert_eq!(toasts(&effects)[0].0, ToastLevel::Success);
}

#[test]
fn unsaved_request_is_committed_before_sending() {
    let (mut st, store) = with_store(Vec::new());
    keys(&mut st, "n");
    esc(&mut st);
    store.state.borrow_mut().saves = 0;
    st.requests[0].id = None;
    keys(&mut st, "lll");
    let effects = enter(&mut st);
    assert_eq!(store.state.borrow().saves, 1);
    let id = st.requests[0].id.unwrap();
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Send(r) if r.request_id == id)));
}

#[test]
fn completion_for_another_request_lands_in_its_history() {
    let (mut st, _store) = with_store(vec![saved(1, "a"), saved(2, "b")]);
    st.in_flight.insert(2);
    update(&mut st, AppMsg::Response(ok_msg(2, "204 No Content", "")));
    assert_eq!(st.requests[1].responses.len(), 1);
    assert!(st.requests[0].responses.is_empty());
    assert!(st.response.shown().is_none());
    assert!(st.in_flight.is_empty());
}

#[test]
fn completion_after_delete_is_dropped() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let mut r = RequestRecord::new("users");
    r.url = "https://example.com/users".into();
    store.save(&mut r).unwrap();
    let id = r.id.unwrap();
    let loaded = store.list_requests().unwrap();
    let mut st = AppState::new(AppConfig::default(), Some(Box::new(store)));
    st.set_requests(loaded.requests);
    st.in_flight.insert(id);
    st.nav.view = View::Requests;
    keys(&mut st, "d");
    assert!(st.requests.is_empty());

    let effects = update(&mut st, AppMsg::Response(ok_msg(id, "200 OK", "{}")));
    assert!(toasts(&effects).is_empty());
    assert!(st.in_flight.is_empty());
    let left = st.store.as_ref().unwrap().list_requests().unwrap();
    assert!(left.requests.is_empty());
}

#[test]
fn deleting_only_request_resets_everything() {
    let (mut st, store) = with_store(vec![saved(1, "users")]);
    st.nav.view = View::Requests;
    keys(&mut st, "d");
    assert!(st.requests.is_empty());
    assert_eq!(st.request_cursor.index(), 0);
    assert!(!st.request_cursor.is_active());
    assert_eq!(st.nav, NavigationState::default());
    assert_eq!(st.draft.method.label(), "GET");
    assert!(st.draft.url.value().is_empty());
    assert_eq!(store.state.borrow().deletes, 1);
    assert!(store.state.borrow().requests.is_empty());
}

#[test]
fn failed_delete_keeps_the_request() {
    let (mut st, store) = with_store(vec![saved(1, "users")]);
    store.state.borrow_mut().fail_writes = true;
    let effects = keys(&mut st, "d");
    assert_eq!(st.requests.len(), 1);
    assert_eq!(toasts(&effects)[0].0, ToastLevel::Error);
}

#[test]
fn selecting_another_request_loads_its_draft() {
    let (mut st, _store) = with_store(vec![saved(1, "a"), saved(2, "b")]);
    keys(&mut st, "j");
    assert_eq!(st.request_cursor.index(), 1);
    assert_eq!(st.draft.url.value(), "https://example.com/b");
    keys(&mut st, "jj");
    assert_eq!(st.request_cursor.index(), 1);
    keys(&mut st, "k");
    assert_eq!(st.draft.name.value(), "a");
}

#[test]
fn commit_twice_is_idempotent() {
    let mut req = saved(1, "users");
    req.headers = vec![NameValue::new("Accept", "*/*")];
    let (mut st, store) = with_store(vec![req]);
    let mut effects = Vec::new();
    assert!(commit::commit(&mut st, &mut effects));
    let first_local = st.requests[0].clone();
    let first_stored = store.state.borrow().requests.clone();
    assert!(commit::commit(&mut st, &mut effects));
    assert_eq!(st.requests[0], first_local);
    assert_eq!(store.state.borrow().requests, first_stored);
    assert!(effects.is_empty());
}

#[test]
fn commit_keeps_only_non_blank_pairs_plus_trailer() {
    let mut req = saved(1, "users");
    req.headers = vec![NameValue::new("A", "1"), NameValue::new("B", "2")];
    let (mut st, _store) = with_store(vec![req]);
    st.draft.headers.fields_mut()[0].set_value("");
    st.draft.headers.fields_mut()[1].set_value("");
    st.draft.headers.fields_mut()[4].set_value("C");
    let mut effects = Vec::new();
    commit::commit(&mut st, &mut effects);
    assert_eq!(
        st.requests[0].headers,
        vec![NameValue::new("B", "2"), NameValue::new("C", "")]
    );
    assert_eq!(st.draft.headers.pair_count(), 3);
    assert!(st
        .draft
        .headers
        .fields_mut()
        .iter()
        .rev()
        .take(2)
        .all(|f| f.is_empty()));
}

#[test]
fn store_failure_surfaces_toast_and_keeps_draft() {
    let (mut st, store) = with_store(vec![saved(1, "users")]);
    store.state.borrow_mut().fail_writes = true;
    keys(&mut st, "ll");
    enter(&mut st);
    assert_eq!(st.nav.mode, Mode::Edit(FocusTarget::Url));
    keys(&mut st, "/v2");
    let effects = esc(&mut st);
    assert_eq!(st.nav.mode, Mode::Navigate);
    let t = toasts(&effects);
    assert_eq!(t.len(), 1);
    assert_eq!(t[0].0, ToastLevel::Error);
    assert!(t[0].1.starts_with("Save failed"));
    assert_eq!(st.draft.url.value(), "https://example.com/users/v2");
    assert_eq!(
        store.state.borrow().requests[0].url,
        "https://example.com/users"
    );
    assert_eq!(st.requests[0].url, "https://example.com/users");
}

#[test]
fn transport_failure_returns_to_navigate_with_draft_intact() {
    let (mut st, _store) = with_store(vec![saved(1, "users")]);
    st.in_flight.insert(1);
    keys(&mut st, "ll");
    enter(&mut st);
    keys(&mut st, "?q=1");
    let effects = update(
        &mut st,
        AppMsg::Response(TransportMsg {
            request_id: 1,
            method: "GET".into(),
            url: "https://example.com/users".into(),
            outcome: Err(TransportError::InvalidUrl {
                url: "x".into(),
                reason: "dns".into(),
            }),
        }),
    );
    assert_eq!(st.nav.mode, Mode::Navigate);
    assert!(st.in_flight.is_empty());
    assert!(st.requests[0].responses.is_empty());
    assert_eq!(st.draft.url.value(), "https://example.com/users?q=1");
    assert!(toasts(&effects)
        .iter()
        .any(|(l, text)| *l == ToastLevel::Error && text.starts_with("Request failed")));
}

#[test]
fn history_options_switch_displayed_response() {
    let mut req = saved(1, "users");
    req.responses = vec![response(1, "200 OK", "newest"), response(1, "500 Oops", "older")];
    let (mut st, _store) = with_store(Vec::new());
    st.set_requests(vec![req]);
    keys(&mut st, "ljj");
    assert_eq!(st.nav.view, View::History);
    enter(&mut st);
    assert_eq!(st.nav.view, View::HistoryOptions);
    keys(&mut st, "jj");
    assert_eq!(st.history.index(), 1);
    enter(&mut st);
    assert_eq!(st.nav.view, View::History);
    assert_eq!(st.response.shown_body().as_deref(), Some("older"));

    enter(&mut st);
    keys(&mut st, "k");
    esc(&mut st);
    assert_eq!(st.response.shown_index(), Some(1));
}

#[test]
fn history_without_responses_stays_closed() {
    let (mut st, _store) = with_store(vec![saved(1, "users")]);
    keys(&mut st, "ljj");
    enter(&mut st);
    assert_eq!(st.nav.view, View::History);
}

#[test]
fn response_viewer_scrolls_without_committing() {
    let mut req = saved(1, "users");
    req.responses = vec![response(1, "200 OK", "a\nb\nc")];
    let (mut st, store) = with_store(vec![req]);
    keys(&mut st, "ljjj");
    assert_eq!(st.nav.view, View::ResponseBody);
    enter(&mut st);
    assert_eq!(st.nav.mode, Mode::Edit(FocusTarget::ResponseBody));
    keys(&mut st, "jjq");
    assert!(!st.should_quit);
    esc(&mut st);
    assert_eq!(st.nav.mode, Mode::Navigate);
    assert_eq!(store.state.borrow().saves, 0);
    keys(&mut st, "llll");
    assert_eq!(st.nav.view, View::ResponseLogs);
    assert_eq!(st.response_pages.page(), 3);
}

#[test]
fn auth_fields_walk_and_fall_off_both_ends() {
    let mut req = saved(1, "users");
    req.auth.selected = 1;
    let (mut st, _store) = with_store(vec![req]);
    keys(&mut st, "ljl");
    assert_eq!(st.nav.view, View::AuthType);
    keys(&mut st, "j");
    assert_eq!(st.nav.view, View::AuthContent);
    keys(&mut st, "j");
    assert_eq!(st.draft.auth.field_index(), 1);
    keys(&mut st, "j");
    assert_eq!(st.nav.view, View::History);
    keys(&mut st, "k");
    assert_eq!(st.nav.view, View::AuthContent);
    keys(&mut st, "kk");
    assert_eq!(st.nav.view, View::AuthType);
}

#[test]
fn empty_body_cannot_be_focused() {
    let (mut st, _store) = with_store(vec![saved(1, "users")]);
    st.nav.view = View::BodyContent;
    enter(&mut st);
    assert_eq!(st.nav.mode, Mode::Navigate);
}

#[test]
fn copy_chord_exports_curl_or_response_body() {
    let mut req = saved(1, "users");
    req.responses = vec![response(1, "200 OK", "{\"a\":1}")];
    let (mut st, _store) = with_store(vec![req]);
    let chord = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    let effects = update(&mut st, AppMsg::Key(chord));
    match effects.as_slice() {
        [Effect::Copy { text, what }] => {
            assert_eq!(*what, "curl command");
            assert!(text.starts_with("curl"));
            assert!(text.contains("https://example.com/users"));
        }
        _ => panic!("expected one copy effect"),
    }
    st.nav.view = View::ResponseBody;
    let effects = update(&mut st, AppMsg::Key(chord));
    assert!(matches!(
        effects.as_slice(),
        [Effect::Copy { text, .. }] if text == "{\"a\":1}"
    ));
}

#[test]
fn invariants_hold_across_a_long_key_walk() {
    let mut req = saved(1, "users");
    req.auth.selected = 4;
    req.body.selected = 3;
    req.responses = vec![response(1, "200 OK", "x"), response(1, "404 Not Found", "y")];
    let (mut st, _store) = with_store(vec![req, saved(2, "other")]);
    let walk = [
        "l", "j", "l", "l", "j", "j", "k", "\x1b", "h", "h", "j", "k", "k", "l", "l", "\n",
        "x", "\x1b", "j", "j", "l", "l", "l", "l", "h", "\n", "\x1b", "k", "k", "h", "h",
        "j", "\n", "j", "\n", "\x1b", "j", "k", "l", "l", "j", "n", "a", "\x1b", "j", "j",
        "k", "h", "h", "h", "h", "j", "d",
    ];
    check_invariants(&mut st);
    for step in walk {
        let code = match step {
            "\n" => KeyCode::Enter,
            "\x1b" => KeyCode::Esc,
            s => KeyCode::Char(s.chars().next().unwrap_or(' ')),
        };
        press(&mut st, code);
        check_invariants(&mut st);
    }
    assert!(!st.should_quit);
}

#[test]
fn quit_works_from_any_navigate_view() {
    let (mut st, _store) = with_store(vec![saved(1, "users")]);
    st.nav.view = View::HeadersContent;
    keys(&mut st, "q");
    assert!(st.should_quit);
}
