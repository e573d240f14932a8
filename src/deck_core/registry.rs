use crate::deck_core::focus::{FocusTarget, Mode, NavigationState, PairListKind, View};
use crate::nav::keys::LogicalKey;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageGroupKind {
    RequestSettings,
    Response,
}

/// Side-effect tag resolved from `(View, LogicalKey)`; the update step applies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Goto(View),
    /// Move the group page and the view together.
    Page {
        group: PageGroupKind,
        forward: bool,
    },
    /// Down from the top bar into the active request-settings page.
    EnterRequestGroup,
    EnterResponseGroup,
    DescendBody,
    DescendAuth,
    /// Up from History into the deepest view of the active settings page.
    AscendFromHistory,
    SelectRequest {
        forward: bool,
    },
    OpenOptions(View),
    OptionCursor {
        forward: bool,
    },
    ConfirmOption,
    CloseOptions,
    FieldCursor {
        forward: bool,
    },
    PairCursor {
        list: PairListKind,
        forward: bool,
    },
    PairSlot {
        list: PairListKind,
        forward: bool,
    },
    Focus(FocusTarget),
    Send,
    NewRequest,
    DeleteRequest,
    NewPair(PairListKind),
    ExitEdit,
    /// Hand the raw key to the focused widget.
    Forward,
    Quit,
}

type Table = HashMap<(View, LogicalKey), Action>;

fn rows() -> Vec<((View, LogicalKey), Action)> {
    use Action::*;
    use LogicalKey as K;
    use PageGroupKind::*;
    use View as V;

    let settings_fwd = Page {
        group: RequestSettings,
        forward: true,
    };
    let settings_back = Page {
        group: RequestSettings,
        forward: false,
    };
    let response_fwd = Page {
        group: Response,
        forward: true,
    };
    let response_back = Page {
        group: Response,
        forward: false,
    };

    let mut rows = vec![
        // request list
        ((V::Requests, K::Down), SelectRequest { forward: true }),
        ((V::Requests, K::Up), SelectRequest { forward: false }),
        ((V::Requests, K::Next), Goto(V::Method)),
        ((V::Requests, K::Enter), Focus(FocusTarget::RequestName)),
        ((V::Requests, K::New), NewRequest),
        ((V::Requests, K::Delete), DeleteRequest),
        // top bar
        ((V::Method, K::Next), Goto(V::Url)),
        ((V::Method, K::Prev), Goto(V::Requests)),
        ((V::Method, K::Down), EnterRequestGroup),
        ((V::Method, K::Enter), OpenOptions(V::MethodOptions)),
        ((V::Url, K::Next), Goto(V::Send)),
        ((V::Url, K::Prev), Goto(V::Method)),
        ((V::Url, K::Down), EnterRequestGroup),
        ((V::Url, K::Enter), Focus(FocusTarget::Url)),
        ((V::Send, K::Prev), Goto(V::Url)),
        ((V::Send, K::Down), EnterRequestGroup),
        ((V::Send, K::Enter), Send),
        // request settings tab row
        ((V::BodyType, K::Next), settings_fwd),
        ((V::BodyType, K::Prev), Goto(V::Requests)),
        ((V::BodyType, K::Down), DescendBody),
        ((V::BodyType, K::Up), Goto(V::Method)),
        ((V::BodyType, K::Enter), OpenOptions(V::BodyOptions)),
        ((V::AuthType, K::Next), settings_fwd),
        ((V::AuthType, K::Prev), settings_back),
        ((V::AuthType, K::Down), DescendAuth),
        ((V::AuthType, K::Up), Goto(V::Method)),
        ((V::AuthType, K::Enter), OpenOptions(V::AuthOptions)),
        ((V::Query, K::Next), settings_fwd),
        ((V::Query, K::Prev), settings_back),
        ((V::Query, K::Up), Goto(V::Method)),
        ((V::Headers, K::Prev), settings_back),
        ((V::Headers, K::Up), Goto(V::Method)),
        // request settings content
        ((V::BodyContent, K::Down), Goto(V::History)),
        ((V::BodyContent, K::Up), Goto(V::BodyType)),
        ((V::BodyContent, K::Enter), Focus(FocusTarget::Body)),
        ((V::BodyContent, K::Escape), Goto(V::BodyType)),
        ((V::AuthContent, K::Down), FieldCursor { forward: true }),
        ((V::AuthContent, K::Up), FieldCursor { forward: false }),
        ((V::AuthContent, K::Enter), Focus(FocusTarget::AuthField)),
        ((V::AuthContent, K::Escape), Goto(V::AuthType)),
        // history and response tab row
        ((V::History, K::Down), EnterResponseGroup),
        ((V::History, K::Up), AscendFromHistory),
        ((V::History, K::Enter), OpenOptions(V::HistoryOptions)),
        ((V::ResponseBody, K::Next), response_fwd),
        ((V::ResponseBody, K::Prev), Goto(V::Requests)),
        ((V::ResponseHeaders, K::Next), response_fwd),
        ((V::ResponseHeaders, K::Prev), response_back),
        ((V::ResponseCookies, K::Next), response_fwd),
        ((V::ResponseCookies, K::Prev), response_back),
        ((V::ResponseLogs, K::Prev), response_back),
    ];

    for list in [PairListKind::Query, PairListKind::Headers] {
        let target = match list {
            PairListKind::Query => FocusTarget::QuerySlot,
            PairListKind::Headers => FocusTarget::HeaderSlot,
        };
        let (lv, cv) = (list.list_view(), list.content_view());
        rows.extend([
            ((lv, K::Down), Goto(cv)),
            ((lv, K::Enter), Goto(cv)),
            ((lv, K::New), NewPair(list)),
            ((cv, K::Down), PairCursor { list, forward: true }),
            ((cv, K::Up), PairCursor { list, forward: false }),
            ((cv, K::Next), PairSlot { list, forward: true }),
            ((cv, K::Prev), PairSlot { list, forward: false }),
            ((cv, K::Enter), Focus(target)),
            ((cv, K::Escape), Goto(lv)),
        ]);
    }

    for v in [
        V::MethodOptions,
        V::BodyOptions,
        V::AuthOptions,
        V::HistoryOptions,
    ] {
        rows.extend([
            ((v, K::Down), OptionCursor { forward: true }),
            ((v, K::Up), OptionCursor { forward: false }),
            ((v, K::Enter), ConfirmOption),
            ((v, K::Escape), CloseOptions),
        ]);
    }

    for v in [
        V::ResponseBody,
        V::ResponseHeaders,
        V::ResponseCookies,
        V::ResponseLogs,
    ] {
        rows.push(((v, K::Up), Goto(V::History)));
        if let Some(target) = FocusTarget::response_target(v) {
            rows.push(((v, K::Enter), Focus(target)));
        }
    }

    rows
}

pub fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| rows().into_iter().collect())
}

/// Navigate-mode lookup. `Quit` is bound on every view.
pub fn resolve(nav: &NavigationState, key: LogicalKey) -> Option<Action> {
    match nav.mode {
        Mode::Edit(_) => Some(match key {
            LogicalKey::Escape => Action::ExitEdit,
            _ => Action::Forward,
        }),
        Mode::Navigate => {
            if key == LogicalKey::Quit {
                return Some(Action::Quit);
            }
            table().get(&(nav.view, key)).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(view: View) -> NavigationState {
        NavigationState {
            view,
            mode: Mode::Navigate,
        }
    }

    #[test]
    fn rows_are_unique() {
        let all = rows();
        assert_eq!(all.len(), table().len(), "duplicate (view, key) row");
    }

    #[test]
    fn every_view_is_reachable_and_escapable() {
        for v in View::ALL {
            let bound = LogicalKey::ALL
                .iter()
                .filter(|k| table().contains_key(&(v, **k)))
                .count();
            assert!(bound > 0, "{v:?} has no bindings");
        }
        for v in View::ALL.into_iter().filter(|v| v.is_secondary()) {
            let out = resolve(&nav(v), LogicalKey::Escape);
            assert!(out.is_some(), "{v:?} cannot be left with Escape");
        }
    }

    #[test]
    fn edit_mode_forwards_everything_but_escape() {
        let editing = NavigationState {
            view: View::Url,
            mode: Mode::Edit(FocusTarget::Url),
        };
        for k in LogicalKey::ALL {
            let expect = if k == LogicalKey::Escape {
                Action::ExitEdit
            } else {
                Action::Forward
            };
            assert_eq!(resolve(&editing, k), Some(expect));
        }
    }

    #[test]
    fn tab_rows_only_link_primary_views() {
        for ((from, key), action) in rows() {
            if !matches!(key, LogicalKey::Next | LogicalKey::Prev) {
                continue;
            }
            if let Action::Goto(to) = action {
                assert!(from.is_primary(), "{from:?} tabs like a primary view");
                assert!(to.is_primary(), "{from:?} tabs into nested {to:?}");
            }
        }
    }

    #[test]
    fn tab_at_end_of_row_is_clamped() {
        assert_eq!(resolve(&nav(View::Send), LogicalKey::Next), None);
        assert_eq!(resolve(&nav(View::Headers), LogicalKey::Next), None);
        assert_eq!(resolve(&nav(View::ResponseLogs), LogicalKey::Next), None);
        assert_eq!(resolve(&nav(View::Requests), LogicalKey::Prev), None);
    }

    #[test]
    fn quit_is_global_in_navigate() {
        for v in View::ALL {
            assert_eq!(resolve(&nav(v), LogicalKey::Quit), Some(Action::Quit));
        }
    }
}
