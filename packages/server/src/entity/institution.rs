use common::Uf;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instituicoes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name.
    pub nome: String,
    /// Short/general name, e.g. an acronym.
    pub nome_g: String,
    pub uf: Uf,
    /// Soft-disable flag. Only disabled institutions may be hard-deleted.
    pub desabilitada: bool,

    #[sea_orm(has_many)]
    pub exams: HasMany<super::exam::Entity>,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::question::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
