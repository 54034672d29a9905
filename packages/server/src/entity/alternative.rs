use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::ImageUrls;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alternativas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub alternativa_txt: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comentario: Option<String>,
    pub correta: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub imagens: ImageUrls,
    pub comentario_validado: bool,

    pub questao: i32,
    #[sea_orm(belongs_to, from = "questao", to = "id")]
    pub question: HasOne<super::question::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
