use crate::deck_core::focus::View;

/// Four mutually exclusive content pages behind one tab row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaneGroup {
    members: [View; 4],
    page: usize,
}

impl PaneGroup {
    pub fn request_settings() -> Self {
        Self {
            members: [View::BodyType, View::AuthType, View::Query, View::Headers],
            page: 0,
        }
    }

    pub fn response() -> Self {
        Self {
            members: [
                View::ResponseBody,
                View::ResponseHeaders,
                View::ResponseCookies,
                View::ResponseLogs,
            ],
            page: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.members.len()
    }

    pub fn current_view(&self) -> View {
        self.members[self.page]
    }

    pub fn contains(&self, view: View) -> bool {
        self.page_of(view).is_some()
    }

    /// Page owning `view`, including views nested under a member.
    pub fn page_of(&self, view: View) -> Option<usize> {
        let owner = view.owner();
        self.members.iter().position(|m| *m == owner)
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.members.len() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Re-derive the page from the current view; views outside the group keep the last page.
    pub fn follow(&mut self, view: View) {
        if let Some(p) = self.page_of(view) {
            self.page = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_saturates() {
        let mut g = PaneGroup::request_settings();
        assert!(!g.prev_page());
        assert!(g.next_page());
        assert!(g.next_page());
        assert!(g.next_page());
        assert!(!g.next_page());
        assert_eq!(g.current_view(), View::Headers);
        assert_eq!(g.page(), g.page_count() - 1);
    }

    #[test]
    fn page_is_a_function_of_view_offset() {
        let mut g = PaneGroup::request_settings();
        for (offset, v) in [View::BodyType, View::AuthType, View::Query, View::Headers]
            .into_iter()
            .enumerate()
        {
            g.follow(v);
            assert_eq!(g.page(), offset);
        }
        g.follow(View::AuthContent);
        assert_eq!(g.page(), 1);
        g.follow(View::Method);
        assert_eq!(g.page(), 1);
    }

    #[test]
    fn response_group_tracks_its_own_members() {
        let mut g = PaneGroup::response();
        g.follow(View::ResponseCookies);
        assert_eq!(g.page(), 2);
        assert!(!g.contains(View::Headers));
        assert!(g.contains(View::ResponseLogs));
    }
}
