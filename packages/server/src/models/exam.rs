use chrono::{DateTime, Datelike, Utc};
use common::{ExamFocus, Uf};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{double_option, parse_focus, parse_uf};

/// Earliest exam year accepted.
pub const MIN_EXAM_YEAR: i32 = 2000;

/// Display name of an exam: `{institution} - {year} - ({focus})`.
pub fn derive_exam_name(institution: &str, ano: i32, focus: ExamFocus) -> String {
    format!("{institution} - {ano} - ({focus})")
}

/// Accepts years from [`MIN_EXAM_YEAR`] through next year.
pub fn validate_exam_year(ano: i32) -> Result<(), AppError> {
    let max = Utc::now().year() + 1;
    if !(MIN_EXAM_YEAR..=max).contains(&ano) {
        return Err(AppError::Validation(format!(
            "Year must be between {MIN_EXAM_YEAR} and {max}"
        )));
    }
    Ok(())
}

fn validate_question_count(qtd: Option<i32>) -> Result<(), AppError> {
    if let Some(n) = qtd
        && !(1..=1000).contains(&n)
    {
        return Err(AppError::Validation(
            "Question count must be 1-1000".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateExamRequest {
    #[schema(example = 2024)]
    pub ano: i32,
    #[schema(example = "R1")]
    pub tipo_de_foco: String,
    #[schema(example = "SP")]
    pub uf: String,
    /// Expected number of questions.
    pub qtd_questoes: Option<i32>,
    #[serde(default)]
    pub bloqueada: bool,
}

/// Parsed exam fields.
pub struct ExamValues {
    pub ano: i32,
    pub tipo_de_foco: ExamFocus,
    pub uf: Uf,
    pub qtd_questoes: Option<i32>,
    pub bloqueada: bool,
}

pub fn validate_create_exam(req: &CreateExamRequest) -> Result<ExamValues, AppError> {
    validate_exam_year(req.ano)?;
    validate_question_count(req.qtd_questoes)?;
    Ok(ExamValues {
        ano: req.ano,
        tipo_de_foco: parse_focus(&req.tipo_de_foco)?,
        uf: parse_uf(&req.uf)?,
        qtd_questoes: req.qtd_questoes,
        bloqueada: req.bloqueada,
    })
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateExamRequest {
    pub ano: Option<i32>,
    pub tipo_de_foco: Option<String>,
    pub uf: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub qtd_questoes: Option<Option<i32>>,
    pub bloqueada: Option<bool>,
}

pub struct ExamPatch {
    pub ano: Option<i32>,
    pub tipo_de_foco: Option<ExamFocus>,
    pub uf: Option<Uf>,
    pub qtd_questoes: Option<Option<i32>>,
    pub bloqueada: Option<bool>,
}

pub fn validate_update_exam(req: &UpdateExamRequest) -> Result<ExamPatch, AppError> {
    if let Some(ano) = req.ano {
        validate_exam_year(ano)?;
    }
    if let Some(qtd) = req.qtd_questoes {
        validate_question_count(qtd)?;
    }
    Ok(ExamPatch {
        ano: req.ano,
        tipo_de_foco: req.tipo_de_foco.as_deref().map(parse_focus).transpose()?,
        uf: req.uf.as_deref().map(parse_uf).transpose()?,
        qtd_questoes: req.qtd_questoes,
        bloqueada: req.bloqueada,
    })
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExamResponse {
    pub id: i32,
    #[schema(example = "Universidade de São Paulo - 2024 - (R1)")]
    pub nome: String,
    pub ano: i32,
    pub tipo_de_foco: ExamFocus,
    pub uf: Uf,
    pub bloqueada: bool,
    pub qtd_questoes: Option<i32>,
    pub instituicao: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::exam::Model> for ExamResponse {
    fn from(m: crate::entity::exam::Model) -> Self {
        Self {
            id: m.id,
            nome: m.nome,
            ano: m.ano,
            tipo_de_foco: m.tipo_de_foco,
            uf: m.uf,
            bloqueada: m.bloqueada,
            qtd_questoes: m.qtd_questoes,
            instituicao: m.instituicao,
            created_at: m.created_at,
        }
    }
}
