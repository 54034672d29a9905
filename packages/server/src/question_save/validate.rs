use std::collections::HashSet;

use crate::error::FieldErrors;

use super::{ImageEdit, QuestionDraft, SaveTarget};

pub const MAX_ALTERNATIVES: usize = 10;

/// Check a draft before any remote call is made.
///
/// Every question needs a prompt. Objective questions (neither free-response
/// nor voided) need at least two alternatives, all with text, and exactly
/// one marked correct.
pub fn validate_draft(draft: &QuestionDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.fields.enunciado.trim().is_empty() {
        errors.insert("enunciado".into(), "Question prompt is required".into());
    }

    if draft.alternatives.len() > MAX_ALTERNATIVES {
        errors.insert(
            "alternativas".into(),
            format!("A question can have at most {MAX_ALTERNATIVES} alternatives"),
        );
    }

    let mut seen = HashSet::new();
    if let Some(dup) = draft
        .alternatives
        .iter()
        .map(|a| a.form_id)
        .find(|id| !seen.insert(*id))
    {
        errors.insert(
            "alternativas".into(),
            format!("Alternative id {dup} appears more than once"),
        );
    }

    if !draft.fields.discursiva && !draft.fields.anulada {
        let alternatives = &draft.alternatives;
        if alternatives.len() < 2 {
            errors.insert(
                "alternativas".into(),
                "Objective questions need at least two alternatives".into(),
            );
        }
        if alternatives
            .iter()
            .any(|a| a.alternativa_txt.trim().is_empty())
        {
            errors.insert(
                "alternativas".into(),
                "Every alternative must have text".into(),
            );
        }
        match alternatives.iter().filter(|a| a.correta).count() {
            0 => {
                errors.insert(
                    "correta".into(),
                    "Objective questions need one alternative marked correct".into(),
                );
            }
            1 => {}
            _ => {
                errors.insert(
                    "correta".into(),
                    "Only one alternative can be marked correct".into(),
                );
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Check that every kept or removed image URL is one the target already
/// stores. New questions and new alternatives have no stored images.
pub fn validate_image_edits(draft: &QuestionDraft, target: &SaveTarget) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(url) = foreign_url(&draft.prompt_images, &target.stored_prompt_images) {
        errors.insert(
            "imagens_enunciado".into(),
            format!("Image {url} does not belong to this question"),
        );
    }

    for alt in &draft.alternatives {
        if let Some(url) = foreign_url(&alt.images, target.stored_images_of(alt.form_id)) {
            errors.insert(
                "alternativas".into(),
                format!("Image {url} does not belong to alternative {}", alt.form_id),
            );
            break;
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn foreign_url<'a>(edit: &'a ImageEdit, stored: &[String]) -> Option<&'a str> {
    edit.kept
        .iter()
        .chain(&edit.removed)
        .find(|url| !stored.contains(*url))
        .map(String::as_str)
}
