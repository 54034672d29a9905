use std::collections::HashSet;

use super::AlternativeDraft;

/// What to do with one alternative of the submitted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeAction {
    /// Persisted alternative still present in the form.
    Update(i32),
    /// Alternative the question did not have before; inserted without an id.
    Insert,
}

/// Row-level changes needed to bring a question's alternatives in line with a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativePlan {
    /// Original ids missing from the form, in original order.
    pub to_delete: Vec<i32>,
    /// One action per form entry, in form order.
    pub actions: Vec<AlternativeAction>,
}

/// Diff the alternatives stored at edit start against the form entries.
///
/// An entry is updated only when its id belongs to the original set;
/// placeholder (non-positive) ids and unknown ids are inserted.
pub fn plan_alternatives(original_ids: &[i32], form_ids: &[i32]) -> AlternativePlan {
    let original: HashSet<i32> = original_ids.iter().copied().collect();
    let kept: HashSet<i32> = form_ids.iter().copied().filter(|id| *id > 0).collect();

    let to_delete = original_ids
        .iter()
        .copied()
        .filter(|id| *id > 0 && !kept.contains(id))
        .collect();

    let actions = form_ids
        .iter()
        .map(|&id| {
            if id > 0 && original.contains(&id) {
                AlternativeAction::Update(id)
            } else {
                AlternativeAction::Insert
            }
        })
        .collect();

    AlternativePlan { to_delete, actions }
}

/// Correct-alternative reference to persist with the question row.
///
/// Free-response and voided questions keep whatever was stored before.
/// Otherwise it is the persisted id of the entry flagged correct, or `None`
/// when that entry is new in this save.
pub fn resolve_correct_alternative(
    discursiva: bool,
    anulada: bool,
    stored: Option<i32>,
    alternatives: &[AlternativeDraft],
) -> Option<i32> {
    if discursiva || anulada {
        return stored;
    }
    alternatives
        .iter()
        .find(|alt| alt.correta)
        .map(|alt| alt.form_id)
        .filter(|id| *id > 0)
}
