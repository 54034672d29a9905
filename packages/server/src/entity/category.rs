use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categoria")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nome: String,
    pub abrev: Option<String>,
    /// CSS color used as the category badge background.
    pub cor_background: Option<String>,

    #[sea_orm(has_many)]
    pub subcategories: HasMany<super::subcategory::Entity>,

    #[sea_orm(has_many)]
    pub subjects: HasMany<super::subject::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
