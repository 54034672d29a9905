use serde::{Deserialize, Serialize};

use crate::entity::{category, subcategory, subject};

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    #[schema(example = "Clínica Médica")]
    pub nome: String,
    #[schema(example = "CM")]
    pub abrev: Option<String>,
    #[schema(example = "#2563eb")]
    pub cor_background: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            nome: m.nome,
            abrev: m.abrev,
            cor_background: m.cor_background,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubcategoryResponse {
    pub id: i32,
    #[schema(example = "Cardiologia")]
    pub nome: String,
    pub categoria: i32,
}

impl From<subcategory::Model> for SubcategoryResponse {
    fn from(m: subcategory::Model) -> Self {
        Self {
            id: m.id,
            nome: m.nome,
            categoria: m.categoria,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    #[schema(example = "Insuficiência cardíaca")]
    pub nome: String,
    pub categoria: i32,
    pub subcategoria: i32,
    /// Lecture time in minutes.
    pub tempo_de_aula: Option<i32>,
}

impl From<subject::Model> for SubjectResponse {
    fn from(m: subject::Model) -> Self {
        Self {
            id: m.id,
            nome: m.nome,
            categoria: m.categoria,
            subcategoria: m.subcategoria,
            tempo_de_aula: m.tempo_de_aula,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubcategoryQuery {
    /// Only subcategories of this category.
    pub categoria: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubjectQuery {
    /// Only subjects of this subcategory.
    pub subcategoria: Option<i32>,
}
