//! Saving an edited question together with its alternatives and images.
//!
//! A save is a fixed sequence of single remote calls: prompt images,
//! question row, deleted alternatives (images, then rows), then each
//! remaining alternative in form order (images, then row). Each call is
//! awaited before the next is issued. The first failure stops the sequence
//! and nothing already done is rolled back.

mod images;
mod plan;
mod records;
mod validate;

use common::storage::{ObjectStore, StorageError};
use sea_orm::DbErr;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::error::{AppError, FieldErrors};

pub use images::{alternative_dir, prompt_dir, remove_image};
pub use plan::{AlternativeAction, AlternativePlan, plan_alternatives, resolve_correct_alternative};
pub use records::{AlternativeRow, DbQuestionRecords, QuestionRecords, QuestionRow};
pub use validate::{MAX_ALTERNATIVES, validate_draft, validate_image_edits};

/// Scalar question metadata as edited in the form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct QuestionFields {
    pub enunciado: String,
    pub comentario: Option<String>,
    pub numero: Option<i32>,
    pub discursiva: bool,
    pub anulada: bool,
    pub ano: Option<String>,
    pub dif_q: Option<String>,
    pub foco: Option<String>,
    pub categoria: Option<i32>,
    pub subcategoria: Option<i32>,
    pub assunto: Option<i32>,
    pub comentario_validado: bool,
}

impl QuestionFields {
    /// Trim text fields; blank optional text becomes `None`.
    pub fn normalized(self) -> Self {
        Self {
            enunciado: self.enunciado.trim().to_string(),
            comentario: blank_to_none(self.comentario),
            ano: blank_to_none(self.ano),
            dif_q: blank_to_none(self.dif_q),
            foco: blank_to_none(self.foco),
            ..self
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A file attached in the form, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Edit of one image list: URLs still shown, URLs the user removed, and
/// newly attached files. Both URL lists must come from the stored list;
/// stored URLs missing from both are removed too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageEdit {
    pub kept: Vec<String>,
    pub removed: Vec<String>,
    pub uploads: Vec<NewImage>,
}

/// One alternative entry of the form. `form_id` is the persisted id, or a
/// negative placeholder for entries added during this edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeDraft {
    pub form_id: i32,
    pub alternativa_txt: String,
    pub comentario: Option<String>,
    pub correta: bool,
    pub comentario_validado: bool,
    pub images: ImageEdit,
}

/// The edited question snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub fields: QuestionFields,
    pub prompt_images: ImageEdit,
    pub alternatives: Vec<AlternativeDraft>,
}

/// An alternative as stored when the edit started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalAlternative {
    pub id: i32,
    pub imagens: Vec<String>,
}

/// Where the draft is saved and what was stored before.
#[derive(Debug, Clone, Default)]
pub struct SaveTarget {
    /// `None` creates a new question.
    pub question_id: Option<i32>,
    pub prova: i32,
    pub instituicao: i32,
    /// Correct-alternative reference stored before this save.
    pub stored_correct: Option<i32>,
    /// Prompt image URLs stored before this save.
    pub stored_prompt_images: Vec<String>,
    pub original_alternatives: Vec<OriginalAlternative>,
}

impl SaveTarget {
    /// Stored image URLs of an original alternative; empty for unknown ids.
    pub fn stored_images_of(&self, alternative_id: i32) -> &[String] {
        self.original_alternatives
            .iter()
            .find(|a| a.id == alternative_id)
            .map(|a| a.imagens.as_slice())
            .unwrap_or(&[])
    }
}

/// Ids touched by a completed save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub question_id: i32,
    pub alternativa_correta: Option<i32>,
    pub deleted: Vec<i32>,
    pub updated: Vec<i32>,
    pub inserted: Vec<i32>,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Invalid question")]
    Invalid(FieldErrors),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },

    #[error("{context}: {source}")]
    Records {
        context: String,
        #[source]
        source: DbErr,
    },
}

impl SaveError {
    fn records(context: impl Into<String>) -> impl FnOnce(DbErr) -> Self {
        let context = context.into();
        move |source| SaveError::Records { context, source }
    }
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Invalid(fields) => AppError::InvalidFields(fields),
            e @ SaveError::Storage { .. } => AppError::Storage(e.to_string()),
            e @ SaveError::Records { .. } => AppError::Internal(e.to_string()),
        }
    }
}

/// Validate `draft` and write it to `records` and `store`.
#[instrument(skip_all, fields(question_id = ?target.question_id, prova = target.prova))]
pub async fn save_question<R>(
    records: &R,
    store: &dyn ObjectStore,
    target: SaveTarget,
    draft: QuestionDraft,
) -> Result<SaveOutcome, SaveError>
where
    R: QuestionRecords + ?Sized,
{
    let errors: FieldErrors = [validate_draft(&draft), validate_image_edits(&draft, &target)]
        .into_iter()
        .filter_map(Result::err)
        .flatten()
        .collect();
    if !errors.is_empty() {
        return Err(SaveError::Invalid(errors));
    }

    let QuestionDraft {
        fields,
        prompt_images,
        alternatives,
    } = draft;
    let fields = fields.normalized();

    let imagens_enunciado = images::reconcile_images(
        store,
        &prompt_dir(target.question_id),
        prompt_images,
        &target.stored_prompt_images,
        "the question prompt",
    )
    .await?;

    let alternativa_correta = resolve_correct_alternative(
        fields.discursiva,
        fields.anulada,
        target.stored_correct,
        &alternatives,
    );

    let row = QuestionRow {
        prova: target.prova,
        instituicao: target.instituicao,
        fields,
        imagens_enunciado,
        alternativa_correta,
    };
    let question_id = match target.question_id {
        Some(id) => {
            records
                .update_question(id, row)
                .await
                .map_err(SaveError::records("Failed to update question"))?;
            id
        }
        None => records
            .insert_question(row)
            .await
            .map_err(SaveError::records("Failed to create question"))?,
    };

    let original_ids: Vec<i32> = target
        .original_alternatives
        .iter()
        .map(|a| a.id)
        .collect();
    let form_ids: Vec<i32> = alternatives.iter().map(|a| a.form_id).collect();
    let plan = plan_alternatives(&original_ids, &form_ids);

    for id in &plan.to_delete {
        let owner = format!("alternative {id}");
        let urls = target
            .original_alternatives
            .iter()
            .filter(|a| a.id == *id)
            .flat_map(|a| a.imagens.iter());
        for url in urls {
            remove_image(store, url, &owner).await?;
        }
    }
    if !plan.to_delete.is_empty() {
        records
            .delete_alternatives(&plan.to_delete)
            .await
            .map_err(SaveError::records("Failed to delete alternatives"))?;
    }

    let mut outcome = SaveOutcome {
        question_id,
        alternativa_correta,
        deleted: plan.to_delete.clone(),
        ..Default::default()
    };

    for (position, (alt, action)) in alternatives.into_iter().zip(plan.actions).enumerate() {
        let (dir, owner, stored) = match action {
            AlternativeAction::Update(id) => (
                alternative_dir(question_id, Some(id)),
                format!("alternative {id}"),
                target.stored_images_of(id),
            ),
            AlternativeAction::Insert => (
                alternative_dir(question_id, None),
                format!("new alternative #{}", position + 1),
                &[][..],
            ),
        };
        let imagens = images::reconcile_images(store, &dir, alt.images, stored, &owner).await?;

        let row = AlternativeRow {
            questao: question_id,
            alternativa_txt: alt.alternativa_txt.trim().to_string(),
            comentario: blank_to_none(alt.comentario),
            correta: alt.correta,
            comentario_validado: alt.comentario_validado,
            imagens,
        };

        match action {
            AlternativeAction::Update(id) => {
                records
                    .update_alternative(id, row)
                    .await
                    .map_err(SaveError::records(format!("Failed to update {owner}")))?;
                outcome.updated.push(id);
            }
            AlternativeAction::Insert => {
                let id = records
                    .insert_alternative(row)
                    .await
                    .map_err(SaveError::records(format!("Failed to insert {owner}")))?;
                outcome.inserted.push(id);
            }
        }
    }

    info!(
        question_id,
        deleted = outcome.deleted.len(),
        updated = outcome.updated.len(),
        inserted = outcome.inserted.len(),
        "Question saved"
    );

    Ok(outcome)
}
