use crate::app::Effect;
use crate::ui::{AppState, ToastLevel};

/// Write the whole draft onto the current request and persist it.
///
/// Returns `false` when there is no current request or the store rejected the
/// write; the draft is left as it was in both cases and the in-memory record
/// only changes once the store has accepted it.
pub fn commit(state: &mut AppState, effects: &mut Vec<Effect>) -> bool {
    let idx = state.request_cursor.index();
    let Some(current) = state.requests.get(idx) else {
        return false;
    };
    state.draft.normalize_pairs();
    let mut record = current.clone();
    state.draft.write_into(&mut record);
    if let Some(store) = state.store.as_mut() {
        if let Err(e) = store.save(&mut record) {
            tracing::error!(error = %e, "saving request failed");
            effects.push(Effect::toast(
                state,
                ToastLevel::Error,
                format!("Save failed: {e}"),
            ));
            return false;
        }
        tracing::debug!(request_id = ?record.id, view = state.nav.view.label(), "committed draft");
    }
    state.requests[idx] = record;
    true
}
