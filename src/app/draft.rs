//! Live, uncommitted edit state for the current request.
//!
//! Every field the user can touch is held here; `write_into` copies the whole
//! draft onto a `RequestRecord` in one step so a commit never patches partially.

use crate::deck_core::focus::PairListKind;
use crate::model::{
    AuthKind, AuthSpec, AuthVariant, BodySpec, NameValue, RequestRecord, BODY_VARIANTS, METHODS,
    NO_BODY,
};
use crate::nav::cursor::BoundedCursor;
use crate::services::transport::{AuthPlan, OutgoingBody, OutgoingRequest};
use crate::widgets::field::FieldEditor;

/// Option list with a highlighted row that only becomes `selected` on confirm.
pub struct Selector {
    options: Vec<String>,
    cursor: BoundedCursor,
    selected: usize,
}

impl Selector {
    pub fn new<S: AsRef<str>>(options: &[S], selected: usize) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let mut cursor = BoundedCursor::new(options.len());
        cursor.set(selected);
        Self {
            selected: cursor.index(),
            options,
            cursor,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn highlighted(&self) -> usize {
        self.cursor.index()
    }

    pub fn label(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Start browsing from the current selection.
    pub fn open(&mut self) {
        self.cursor.set(self.selected);
    }

    pub fn step(&mut self, forward: bool) -> bool {
        if forward {
            self.cursor.down()
        } else {
            self.cursor.up()
        }
    }

    /// Returns the previous selection.
    pub fn confirm(&mut self) -> usize {
        std::mem::replace(&mut self.selected, self.cursor.index())
    }
}

/// Interleaved name/value editors; always ends with one empty pair.
pub struct PairList {
    kind: PairListKind,
    fields: Vec<FieldEditor>,
    cursor: BoundedCursor,
}

impl PairList {
    pub fn from_pairs(kind: PairListKind, pairs: &[NameValue]) -> Self {
        let mut me = Self {
            kind,
            fields: Vec::new(),
            cursor: BoundedCursor::with_step(0, 2),
        };
        me.rebuild(pairs);
        me
    }

    fn placeholders(&self) -> (&'static str, &'static str) {
        match self.kind {
            PairListKind::Query => ("name", "value"),
            PairListKind::Headers => ("header", "value"),
        }
    }

    fn rebuild(&mut self, pairs: &[NameValue]) {
        let (name_ph, value_ph) = self.placeholders();
        self.fields.clear();
        for p in pairs.iter().filter(|p| !p.is_blank()) {
            self.fields.push(FieldEditor::single(&p.name, name_ph));
            self.fields.push(FieldEditor::single(&p.value, value_ph));
        }
        self.fields.push(FieldEditor::single("", name_ph));
        self.fields.push(FieldEditor::single("", value_ph));
        self.cursor.resize(self.fields.len());
    }

    /// Pairs where name or value is non-empty, in order.
    pub fn pairs(&self) -> Vec<NameValue> {
        self.fields
            .chunks(2)
            .map(|c| NameValue::new(c[0].value(), c.get(1).map(|v| v.value()).unwrap_or_default()))
            .filter(|p| !p.is_blank())
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.fields.len() / 2
    }

    /// Drop blank pairs and restore the single trailing empty pair.
    pub fn normalize(&mut self) {
        let pairs = self.pairs();
        self.rebuild(&pairs);
    }

    pub fn cursor(&self) -> &BoundedCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut BoundedCursor {
        &mut self.cursor
    }

    /// Point the cursor at an empty trailing pair, adding one if the last pair has content.
    pub fn focus_new(&mut self) {
        let last_blank = self
            .fields
            .chunks(2)
            .last()
            .is_some_and(|c| c.iter().all(FieldEditor::is_empty));
        if !last_blank {
            let (name_ph, value_ph) = self.placeholders();
            self.fields.push(FieldEditor::single("", name_ph));
            self.fields.push(FieldEditor::single("", value_ph));
            self.cursor.resize(self.fields.len());
        }
        self.cursor.set(self.fields.len() - 2);
    }

    pub fn focused_mut(&mut self) -> Option<&mut FieldEditor> {
        self.fields.get_mut(self.cursor.index())
    }

    pub fn fields_mut(&mut self) -> &mut [FieldEditor] {
        &mut self.fields
    }
}

pub struct BodyDraft {
    pub kinds: Selector,
    buffers: Vec<String>,
    pub editor: FieldEditor,
}

impl BodyDraft {
    fn load(spec: &BodySpec) -> Self {
        let buffers: Vec<String> = (0..BODY_VARIANTS.len())
            .map(|i| spec.text(i).to_string())
            .collect();
        let kinds = Selector::new(&BODY_VARIANTS, spec.selected);
        let editor = FieldEditor::multiline(&buffers[kinds.selected()], "");
        Self {
            kinds,
            buffers,
            editor,
        }
    }

    pub fn has_content(&self) -> bool {
        self.kinds.selected() != NO_BODY
    }

    /// Live text for `variant`; the selected one reads from the editor.
    pub fn text(&self, variant: usize) -> String {
        if variant == self.kinds.selected() {
            self.editor.value()
        } else {
            self.buffers.get(variant).cloned().unwrap_or_default()
        }
    }

    /// Confirm the highlighted variant, parking the editor text under the old one.
    pub fn confirm_variant(&mut self) {
        let old = self.kinds.selected();
        if let Some(buf) = self.buffers.get_mut(old) {
            *buf = self.editor.value();
        }
        self.kinds.confirm();
        let text = self
            .buffers
            .get(self.kinds.selected())
            .cloned()
            .unwrap_or_default();
        self.editor.set_value(&text);
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self.kinds.selected() {
            1 => Some("application/json"),
            2 => Some("application/xml"),
            3 => Some("text/plain"),
            _ => None,
        }
    }
}

pub struct AuthDraft {
    pub kinds: Selector,
    fields: Vec<Vec<FieldEditor>>,
    cursors: Vec<BoundedCursor>,
}

impl AuthDraft {
    fn load(spec: &AuthSpec) -> Self {
        let labels: Vec<&str> = AuthKind::ALL.iter().map(|k| k.label()).collect();
        let mut fields = Vec::new();
        let mut cursors = Vec::new();
        for (vi, kind) in AuthKind::ALL.iter().enumerate() {
            let editors: Vec<FieldEditor> = kind
                .field_labels()
                .iter()
                .enumerate()
                .map(|(fi, label)| FieldEditor::single(spec.value(vi, fi), label))
                .collect();
            cursors.push(BoundedCursor::new(editors.len()));
            fields.push(editors);
        }
        Self {
            kinds: Selector::new(&labels[..], spec.selected),
            fields,
            cursors,
        }
    }

    pub fn kind(&self) -> AuthKind {
        AuthKind::from_index(self.kinds.selected())
    }

    pub fn has_content(&self) -> bool {
        self.kind() != AuthKind::None
    }

    pub fn cursor_mut(&mut self) -> Option<&mut BoundedCursor> {
        self.cursors.get_mut(self.kinds.selected())
    }

    pub fn field_index(&self) -> usize {
        self.cursors
            .get(self.kinds.selected())
            .map(BoundedCursor::index)
            .unwrap_or(0)
    }

    pub fn focused_mut(&mut self) -> Option<&mut FieldEditor> {
        let idx = self.field_index();
        self.fields
            .get_mut(self.kinds.selected())
            .and_then(|v| v.get_mut(idx))
    }

    pub fn active_fields_mut(&mut self) -> &mut [FieldEditor] {
        match self.fields.get_mut(self.kinds.selected()) {
            Some(v) => v.as_mut_slice(),
            None => &mut [],
        }
    }

    fn value(&self, variant: usize, field: usize) -> String {
        self.fields
            .get(variant)
            .and_then(|v| v.get(field))
            .map(FieldEditor::value)
            .unwrap_or_default()
    }

    fn spec(&self) -> AuthSpec {
        AuthSpec {
            variants: AuthKind::ALL
                .iter()
                .enumerate()
                .map(|(vi, kind)| AuthVariant {
                    kind: kind.label().to_string(),
                    fields: kind
                        .field_labels()
                        .iter()
                        .enumerate()
                        .map(|(fi, label)| NameValue::new(*label, self.value(vi, fi)))
                        .collect(),
                })
                .collect(),
            selected: self.kinds.selected(),
        }
    }

    fn plan(&self) -> AuthPlan {
        let v = self.kinds.selected();
        match self.kind() {
            AuthKind::None => AuthPlan::None,
            AuthKind::Basic => AuthPlan::Basic {
                username: self.value(v, 0),
                password: self.value(v, 1),
            },
            AuthKind::Digest => AuthPlan::Digest {
                username: self.value(v, 0),
                password: self.value(v, 1),
            },
            AuthKind::Bearer => {
                let prefix = self.value(v, 0);
                let token = self.value(v, 1);
                if prefix.trim().is_empty() {
                    AuthPlan::Header(token)
                } else {
                    AuthPlan::Header(format!("{} {}", prefix.trim(), token))
                }
            }
            AuthKind::Custom => AuthPlan::Header(self.value(v, 0)),
        }
    }
}

pub struct Draft {
    pub name: FieldEditor,
    pub method: Selector,
    pub url: FieldEditor,
    pub body: BodyDraft,
    pub auth: AuthDraft,
    pub query: PairList,
    pub headers: PairList,
}

impl Default for Draft {
    fn default() -> Self {
        Self::load(&RequestRecord::new(""))
    }
}

impl Draft {
    pub fn load(record: &RequestRecord) -> Self {
        Self {
            name: FieldEditor::single(&record.name, "name"),
            method: Selector::new(&METHODS, record.method_index()),
            url: FieldEditor::single(&record.url, "https..."),
            body: BodyDraft::load(&record.body),
            auth: AuthDraft::load(&record.auth),
            query: PairList::from_pairs(PairListKind::Query, &record.query),
            headers: PairList::from_pairs(PairListKind::Headers, &record.headers),
        }
    }

    pub fn pairs_mut(&mut self, kind: PairListKind) -> &mut PairList {
        match kind {
            PairListKind::Query => &mut self.query,
            PairListKind::Headers => &mut self.headers,
        }
    }

    pub fn normalize_pairs(&mut self) {
        self.query.normalize();
        self.headers.normalize();
    }

    /// Overwrite every editable field of `record`; id and response history are untouched.
    pub fn write_into(&self, record: &mut RequestRecord) {
        record.name = self.name.value();
        record.method = self.method.label().to_string();
        record.url = self.url.value();
        record.body = BodySpec {
            variants: BODY_VARIANTS
                .iter()
                .enumerate()
                .map(|(i, label)| NameValue::new(*label, self.body.text(i)))
                .collect(),
            selected: self.body.kinds.selected(),
        };
        record.auth = self.auth.spec();
        record.query = self.query.pairs();
        record.headers = self.headers.pairs();
    }

    pub fn outgoing(&self, request_id: i64) -> OutgoingRequest {
        let body = self.body.content_type().map(|content_type| OutgoingBody {
            content_type,
            text: self.body.editor.value(),
        });
        OutgoingRequest {
            request_id,
            method: self.method.label().to_string(),
            url: self.url.value(),
            query: self.query.pairs(),
            headers: self.headers.pairs(),
            auth: self.auth.plan(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Widget;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn type_into(ed: &mut FieldEditor, s: &str) {
        for ch in s.chars() {
            ed.on_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn sample() -> RequestRecord {
        let mut r = RequestRecord::new("sample");
        r.id = Some(7);
        r.method = "POST".into();
        r.url = "https://example.com".into();
        r.headers = vec![NameValue::new("Accept", "text/plain")];
        r.body.selected = 1;
        r.body.variants[1].value = "{}".into();
        r.body.variants[3].value = "plain text".into();
        r
    }

    #[test]
    fn load_then_write_is_identity() {
        let rec = sample();
        let draft = Draft::load(&rec);
        let mut out = rec.clone();
        out.name.clear();
        out.headers.clear();
        draft.write_into(&mut out);
        assert_eq!(out, rec);
    }

    #[test]
    fn body_with_trailing_newline_survives_load() {
        let mut rec = sample();
        rec.body.variants[1].value = "{}\n".into();
        let mut out = rec.clone();
        Draft::load(&rec).write_into(&mut out);
        assert_eq!(out.body.variants[1].value, "{}\n");
    }

    #[test]
    fn pair_list_keeps_a_trailing_empty_pair() {
        let list = PairList::from_pairs(PairListKind::Headers, &[NameValue::new("A", "1")]);
        assert_eq!(list.pair_count(), 2);
        assert_eq!(list.pairs(), vec![NameValue::new("A", "1")]);
        let empty = PairList::from_pairs(PairListKind::Query, &[]);
        assert_eq!(empty.pair_count(), 1);
        assert!(empty.pairs().is_empty());
    }

    #[test]
    fn normalize_drops_blank_pairs_and_retains_the_rest() {
        let mut list = PairList::from_pairs(
            PairListKind::Query,
            &[NameValue::new("a", "1"), NameValue::new("b", "2")],
        );
        list.fields_mut()[0].set_value("");
        list.fields_mut()[1].set_value("");
        list.cursor_mut().set(4);
        type_into(list.focused_mut().unwrap(), "c");
        list.normalize();
        assert_eq!(
            list.pairs(),
            vec![NameValue::new("b", "2"), NameValue::new("c", "")]
        );
        assert_eq!(list.pair_count(), 3);
        assert!(list.cursor().index() < 6);
    }

    #[test]
    fn focus_new_reuses_blank_trailer() {
        let mut list = PairList::from_pairs(PairListKind::Headers, &[NameValue::new("A", "1")]);
        list.focus_new();
        assert_eq!(list.pair_count(), 2);
        assert_eq!(list.cursor().index(), 2);
        type_into(list.focused_mut().unwrap(), "B");
        list.focus_new();
        assert_eq!(list.pair_count(), 3);
        assert_eq!(list.cursor().index(), 4);
    }

    #[test]
    fn body_variants_keep_their_own_buffers() {
        let mut draft = Draft::load(&sample());
        assert_eq!(draft.body.editor.value(), "{}");
        type_into(&mut draft.body.editor, "x");
        draft.body.kinds.open();
        draft.body.kinds.step(true);
        draft.body.kinds.step(true);
        draft.body.confirm_variant();
        assert_eq!(draft.body.kinds.label(), "Plain");
        assert_eq!(draft.body.editor.value(), "plain text");
        assert_eq!(draft.body.text(1), "{}x");
    }

    #[test]
    fn selector_highlight_is_not_selection_until_confirmed() {
        let mut s = Selector::new(&METHODS, 0);
        s.open();
        s.step(true);
        assert_eq!(s.selected(), 0);
        assert_eq!(s.highlighted(), 1);
        assert_eq!(s.confirm(), 0);
        assert_eq!(s.label(), "POST");
    }

    #[test]
    fn outgoing_uses_bearer_prefix_and_body_content_type() {
        let mut rec = sample();
        rec.auth.selected = 3;
        rec.auth.variants[3].fields[0].value = "Bearer".into();
        rec.auth.variants[3].fields[1].value = "t0k".into();
        let out = Draft::load(&rec).outgoing(7);
        assert_eq!(out.auth, AuthPlan::Header("Bearer t0k".into()));
        assert_eq!(out.body.unwrap().content_type, "application/json");
        assert_eq!(out.method, "POST");
    }

    #[test]
    fn no_body_sends_nothing() {
        let out = Draft::load(&RequestRecord::new("x")).outgoing(1);
        assert!(out.body.is_none());
        assert_eq!(out.auth, AuthPlan::None);
    }
}
