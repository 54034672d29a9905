use common::{ExamFocus, Uf};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Always `{institution nome} - {ano} - ({tipo_de_foco})`.
    pub nome: String,
    pub ano: i32,
    pub tipo_de_foco: ExamFocus,
    pub uf: Uf,
    /// Only locked exams may be deleted.
    pub bloqueada: bool,
    pub qtd_questoes: Option<i32>,

    pub instituicao: i32,
    #[sea_orm(belongs_to, from = "instituicao", to = "id")]
    pub institution: HasOne<super::institution::Entity>,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::question::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
