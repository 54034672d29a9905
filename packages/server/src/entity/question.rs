use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Public image URLs, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageUrls(pub Vec<String>);

impl From<Vec<String>> for ImageUrls {
    fn from(urls: Vec<String>) -> Self {
        Self(urls)
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questoes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub enunciado: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comentario: Option<String>,
    pub numero: Option<i32>,
    /// Free-response question: no alternatives are required.
    pub discursiva: bool,
    /// Voided question.
    pub anulada: bool,
    pub ano: Option<String>,
    pub dif_q: Option<String>,
    pub foco: Option<String>,
    pub categoria: Option<i32>,
    pub subcategoria: Option<i32>,
    pub assunto: Option<i32>,
    #[sea_orm(column_type = "JsonBinary")]
    pub imagens_enunciado: ImageUrls,
    /// Id of the correct alternative. Not a foreign key: alternatives are
    /// written after the question row.
    #[sea_orm(column_name = "alternativa_Correta")]
    pub alternativa_correta: Option<i32>,
    pub comentario_validado: bool,
    /// Share of correct answers, maintained outside this service.
    pub percentual_acertos: Option<f64>,

    pub prova: i32,
    #[sea_orm(belongs_to, from = "prova", to = "id")]
    pub exam: HasOne<super::exam::Entity>,

    pub instituicao: i32,
    #[sea_orm(belongs_to, from = "instituicao", to = "id")]
    pub institution: HasOne<super::institution::Entity>,

    #[sea_orm(has_many)]
    pub alternatives: HasMany<super::alternative::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
