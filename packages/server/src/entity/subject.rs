use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assunto")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nome: String,
    /// Lecture time in minutes.
    pub tempo_de_aula: Option<i32>,

    pub categoria: i32,
    #[sea_orm(belongs_to, from = "categoria", to = "id")]
    pub category: HasOne<super::category::Entity>,

    pub subcategoria: i32,
    #[sea_orm(belongs_to, from = "subcategoria", to = "id")]
    pub subcategory: HasOne<super::subcategory::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
