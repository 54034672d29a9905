use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{alternative, question};
use crate::error::AppError;
use crate::question_save::{AlternativeDraft, ImageEdit, NewImage, QuestionDraft, QuestionFields};

/// Name of the multipart part carrying the JSON payload.
pub const QUESTION_PART: &str = "question";
/// Name of the multipart parts carrying new prompt images.
pub const PROMPT_IMAGE_PART: &str = "enunciado";
/// Prefix of the multipart parts carrying new images of one alternative,
/// followed by the alternative's form id: `alternativa:-1`, `alternativa:42`.
pub const ALTERNATIVE_IMAGE_PART_PREFIX: &str = "alternativa:";

/// JSON payload of a question save (the `question` multipart part).
#[derive(Deserialize, utoipa::ToSchema)]
pub struct QuestionPayload {
    #[serde(flatten)]
    pub fields: QuestionFields,
    /// Prompt image URLs still shown in the form.
    #[serde(default)]
    pub imagens_enunciado: Vec<String>,
    /// Prompt image URLs the user removed.
    #[serde(default)]
    pub removed_imagens_enunciado: Vec<String>,
    /// Alternatives in display order.
    #[serde(default)]
    pub alternativas: Vec<AlternativePayload>,
}

/// One alternative of the form.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AlternativePayload {
    /// Persisted id, or a negative placeholder (-1, -2, ...) for a new entry.
    #[schema(example = json!(-1))]
    pub id: i32,
    #[serde(default)]
    pub alternativa_txt: String,
    pub comentario: Option<String>,
    #[serde(default)]
    pub correta: bool,
    #[serde(default)]
    pub comentario_validado: bool,
    #[serde(default)]
    pub imagens: Vec<String>,
    #[serde(default)]
    pub removed_imagens: Vec<String>,
}

/// Files received alongside the payload, grouped by target.
#[derive(Default)]
pub struct QuestionUploads {
    pub prompt: Vec<NewImage>,
    /// Keyed by alternative form id.
    pub alternatives: HashMap<i32, Vec<NewImage>>,
}

/// Parse the form id out of an `alternativa:{id}` part name.
pub fn alternative_part_id(name: &str) -> Option<Result<i32, AppError>> {
    let raw = name.strip_prefix(ALTERNATIVE_IMAGE_PART_PREFIX)?;
    Some(raw.parse::<i32>().map_err(|_| {
        AppError::Validation(format!("Invalid alternative id in part name '{name}'"))
    }))
}

impl QuestionPayload {
    /// Combine the payload with its uploaded files.
    pub fn into_draft(self, uploads: QuestionUploads) -> Result<QuestionDraft, AppError> {
        let QuestionUploads {
            prompt,
            alternatives: mut alternative_uploads,
        } = uploads;

        let alternatives: Vec<AlternativeDraft> = self
            .alternativas
            .into_iter()
            .map(|alt| AlternativeDraft {
                form_id: alt.id,
                images: ImageEdit {
                    kept: alt.imagens,
                    removed: alt.removed_imagens,
                    uploads: alternative_uploads.remove(&alt.id).unwrap_or_default(),
                },
                alternativa_txt: alt.alternativa_txt,
                comentario: alt.comentario,
                correta: alt.correta,
                comentario_validado: alt.comentario_validado,
            })
            .collect();

        if let Some(id) = alternative_uploads.keys().min() {
            return Err(AppError::Validation(format!(
                "Images were sent for alternative {id}, which is not in the form"
            )));
        }

        Ok(QuestionDraft {
            fields: self.fields,
            prompt_images: ImageEdit {
                kept: self.imagens_enunciado,
                removed: self.removed_imagens_enunciado,
                uploads: prompt,
            },
            alternatives,
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AlternativeResponse {
    pub id: i32,
    pub questao: i32,
    pub alternativa_txt: String,
    pub comentario: Option<String>,
    pub correta: bool,
    pub comentario_validado: bool,
    pub imagens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<alternative::Model> for AlternativeResponse {
    fn from(m: alternative::Model) -> Self {
        Self {
            id: m.id,
            questao: m.questao,
            alternativa_txt: m.alternativa_txt,
            comentario: m.comentario,
            correta: m.correta,
            comentario_validado: m.comentario_validado,
            imagens: m.imagens.0,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    pub id: i32,
    pub prova: i32,
    pub instituicao: i32,
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
    pub imagens_enunciado: Vec<String>,
    /// Id of the correct alternative.
    #[serde(rename = "alternativa_Correta")]
    pub alternativa_correta: Option<i32>,
    pub comentario_validado: bool,
    pub percentual_acertos: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by id.
    pub alternativas: Vec<AlternativeResponse>,
}

impl QuestionResponse {
    pub fn new(m: question::Model, alternatives: Vec<alternative::Model>) -> Self {
        Self {
            id: m.id,
            prova: m.prova,
            instituicao: m.instituicao,
            enunciado: m.enunciado,
            comentario: m.comentario,
            numero: m.numero,
            discursiva: m.discursiva,
            anulada: m.anulada,
            ano: m.ano,
            dif_q: m.dif_q,
            foco: m.foco,
            categoria: m.categoria,
            subcategoria: m.subcategoria,
            assunto: m.assunto,
            imagens_enunciado: m.imagens_enunciado.0,
            alternativa_correta: m.alternativa_correta,
            comentario_validado: m.comentario_validado,
            percentual_acertos: m.percentual_acertos,
            created_at: m.created_at,
            updated_at: m.updated_at,
            alternativas: alternatives.into_iter().map(Into::into).collect(),
        }
    }
}
