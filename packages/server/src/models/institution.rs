use chrono::{DateTime, Utc};
use common::Uf;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::{DEFAULT_PAGE_SIZE, Pagination, escape_like};
use super::shared::{parse_uf, required_text};

const MAX_NAME: usize = 256;
const MAX_SHORT_NAME: usize = 64;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateInstitutionRequest {
    /// Display name.
    #[schema(example = "Universidade de São Paulo")]
    pub nome: String,
    /// Short/general name.
    #[schema(example = "USP")]
    pub nome_g: String,
    /// Region code, e.g. `SP` or `BRASIL`.
    #[schema(example = "SP")]
    pub uf: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateInstitutionRequest {
    pub nome: Option<String>,
    pub nome_g: Option<String>,
    pub uf: Option<String>,
}

/// Trimmed and parsed institution fields.
pub struct InstitutionValues {
    pub nome: String,
    pub nome_g: String,
    pub uf: Uf,
}

pub fn validate_create_institution(
    req: &CreateInstitutionRequest,
) -> Result<InstitutionValues, AppError> {
    Ok(InstitutionValues {
        nome: required_text(&req.nome, "Name", MAX_NAME)?,
        nome_g: required_text(&req.nome_g, "Short name", MAX_SHORT_NAME)?,
        uf: parse_uf(&req.uf)?,
    })
}

/// Partial institution fields; `None` leaves the column unchanged.
pub struct InstitutionPatch {
    pub nome: Option<String>,
    pub nome_g: Option<String>,
    pub uf: Option<Uf>,
}

pub fn validate_update_institution(
    req: &UpdateInstitutionRequest,
) -> Result<InstitutionPatch, AppError> {
    Ok(InstitutionPatch {
        nome: req
            .nome
            .as_deref()
            .map(|v| required_text(v, "Name", MAX_NAME))
            .transpose()?,
        nome_g: req
            .nome_g
            .as_deref()
            .map(|v| required_text(v, "Short name", MAX_SHORT_NAME))
            .transpose()?,
        uf: req.uf.as_deref().map(parse_uf).transpose()?,
    })
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InstitutionResponse {
    pub id: i32,
    pub nome: String,
    pub nome_g: String,
    pub uf: Uf,
    pub desabilitada: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::institution::Model> for InstitutionResponse {
    fn from(m: crate::entity::institution::Model) -> Self {
        Self {
            id: m.id,
            nome: m.nome,
            nome_g: m.nome_g,
            uf: m.uf,
            desabilitada: m.desabilitada,
            created_at: m.created_at,
        }
    }
}

/// Institution row with the number of exams that reference it.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct InstitutionListItem {
    pub id: i32,
    pub nome: String,
    pub nome_g: String,
    pub uf: Uf,
    pub desabilitada: bool,
    pub created_at: DateTime<Utc>,
    #[schema(example = 4)]
    pub provas_count: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InstitutionListResponse {
    pub data: Vec<InstitutionListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstitutionListQuery {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<u64>,
    /// Items per page (1-100). Defaults to 10.
    pub per_page: Option<u64>,
    /// Case-insensitive substring matched against name and short name.
    pub search: Option<String>,
    /// Only institutions of this region.
    pub uf: Option<String>,
}
