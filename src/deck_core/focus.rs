use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    #[default]
    Requests,
    Method,
    Url,
    Send,
    BodyType,
    AuthType,
    Query,
    Headers,
    History,
    ResponseBody,
    ResponseHeaders,
    ResponseCookies,
    ResponseLogs,
    MethodOptions,
    BodyOptions,
    AuthOptions,
    BodyContent,
    AuthContent,
    QueryContent,
    HeadersContent,
    HistoryOptions,
}

impl View {
    #[cfg(test)]
    pub const ALL: [View; 21] = [
        View::Requests,
        View::Method,
        View::Url,
        View::Send,
        View::BodyType,
        View::AuthType,
        View::Query,
        View::Headers,
        View::History,
        View::ResponseBody,
        View::ResponseHeaders,
        View::ResponseCookies,
        View::ResponseLogs,
        View::MethodOptions,
        View::BodyOptions,
        View::AuthOptions,
        View::BodyContent,
        View::AuthContent,
        View::QueryContent,
        View::HeadersContent,
        View::HistoryOptions,
    ];

    /// Tab-order views; everything else is nested under one of these.
    #[cfg(test)]
    pub fn is_primary(self) -> bool {
        !self.is_secondary()
    }

    #[cfg(test)]
    pub fn is_secondary(self) -> bool {
        matches!(
            self,
            View::MethodOptions
                | View::BodyOptions
                | View::AuthOptions
                | View::BodyContent
                | View::AuthContent
                | View::QueryContent
                | View::HeadersContent
                | View::HistoryOptions
        )
    }

    pub fn is_options(self) -> bool {
        matches!(
            self,
            View::MethodOptions | View::BodyOptions | View::AuthOptions | View::HistoryOptions
        )
    }

    /// The primary view a secondary view is nested under.
    pub fn owner(self) -> View {
        match self {
            View::MethodOptions => View::Method,
            View::BodyOptions | View::BodyContent => View::BodyType,
            View::AuthOptions | View::AuthContent => View::AuthType,
            View::QueryContent => View::Query,
            View::HeadersContent => View::Headers,
            View::HistoryOptions => View::History,
            other => other,
        }
    }

    pub fn in_response_area(self) -> bool {
        matches!(
            self.owner(),
            View::History
                | View::ResponseBody
                | View::ResponseHeaders
                | View::ResponseCookies
                | View::ResponseLogs
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Requests => "requests",
            View::Method => "method",
            View::Url => "url",
            View::Send => "send",
            View::BodyType => "body type",
            View::AuthType => "auth type",
            View::Query => "query",
            View::Headers => "headers",
            View::History => "history",
            View::ResponseBody => "response body",
            View::ResponseHeaders => "response headers",
            View::ResponseCookies => "response cookies",
            View::ResponseLogs => "response logs",
            View::MethodOptions => "method options",
            View::BodyOptions => "body options",
            View::AuthOptions => "auth options",
            View::BodyContent => "body",
            View::AuthContent => "auth fields",
            View::QueryContent => "query params",
            View::HeadersContent => "header list",
            View::HistoryOptions => "history options",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairListKind {
    Query,
    Headers,
}

impl PairListKind {
    pub fn list_view(self) -> View {
        match self {
            PairListKind::Query => View::Query,
            PairListKind::Headers => View::Headers,
        }
    }

    pub fn content_view(self) -> View {
        match self {
            PairListKind::Query => View::QueryContent,
            PairListKind::Headers => View::HeadersContent,
        }
    }
}

/// The single widget that owns keystrokes while in Edit mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusTarget {
    RequestName,
    Url,
    Body,
    AuthField,
    QuerySlot,
    HeaderSlot,
    ResponseBody,
    ResponseHeaders,
    ResponseCookies,
    ResponseLogs,
}

impl FocusTarget {
    /// Read-only viewers take keys for scrolling and never commit.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            FocusTarget::ResponseBody
                | FocusTarget::ResponseHeaders
                | FocusTarget::ResponseCookies
                | FocusTarget::ResponseLogs
        )
    }

    pub fn response_target(view: View) -> Option<FocusTarget> {
        match view {
            View::ResponseBody => Some(FocusTarget::ResponseBody),
            View::ResponseHeaders => Some(FocusTarget::ResponseHeaders),
            View::ResponseCookies => Some(FocusTarget::ResponseCookies),
            View::ResponseLogs => Some(FocusTarget::ResponseLogs),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Navigate,
    Edit(FocusTarget),
}

/// Current view plus input mode; the whole of the modal state the update step threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub view: View,
    pub mode: Mode,
}

impl NavigationState {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit(_))
    }

    pub fn focused(&self) -> Option<FocusTarget> {
        match self.mode {
            Mode::Edit(target) => Some(target),
            Mode::Navigate => None,
        }
    }

    pub fn enter_edit(&mut self, target: FocusTarget) {
        self.mode = Mode::Edit(target);
    }

    /// Returns the target that was focused, if any.
    pub fn exit_edit(&mut self) -> Option<FocusTarget> {
        let prev = self.focused();
        self.mode = Mode::Navigate;
        prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_views_have_primary_owners() {
        for v in View::ALL {
            assert!(v.owner().is_primary(), "{v:?} owner must be primary");
            if v.is_primary() {
                assert_eq!(v.owner(), v);
            }
        }
    }

    #[test]
    fn edit_mode_always_names_one_target() {
        let mut nav = NavigationState::default();
        assert_eq!(nav.focused(), None);
        nav.enter_edit(FocusTarget::Url);
        assert!(nav.is_editing());
        assert_eq!(nav.focused(), Some(FocusTarget::Url));
        assert_eq!(nav.exit_edit(), Some(FocusTarget::Url));
        assert_eq!(nav.focused(), None);
        assert_eq!(nav.exit_edit(), None);
    }

    #[test]
    fn navigation_state_serializes() {
        let nav = NavigationState {
            view: View::HeadersContent,
            mode: Mode::Edit(FocusTarget::HeaderSlot),
        };
        let s = serde_json::to_string(&nav).unwrap();
        let back: NavigationState = serde_json::from_str(&s).unwrap();
        assert_eq!(back, nav);
    }
}
