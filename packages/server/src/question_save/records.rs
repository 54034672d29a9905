use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

use super::QuestionFields;
use crate::entity::{alternative, question};

/// Column values written for a question row.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub prova: i32,
    pub instituicao: i32,
    pub fields: QuestionFields,
    pub imagens_enunciado: Vec<String>,
    pub alternativa_correta: Option<i32>,
}

/// Column values written for an alternative row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeRow {
    pub questao: i32,
    pub alternativa_txt: String,
    pub comentario: Option<String>,
    pub correta: bool,
    pub comentario_validado: bool,
    pub imagens: Vec<String>,
}

/// Row operations the save procedure needs from the relational store.
#[async_trait]
pub trait QuestionRecords: Send + Sync {
    /// Insert a question and return its id.
    async fn insert_question(&self, row: QuestionRow) -> Result<i32, DbErr>;

    async fn update_question(&self, id: i32, row: QuestionRow) -> Result<(), DbErr>;

    /// Delete alternatives by id in one statement.
    async fn delete_alternatives(&self, ids: &[i32]) -> Result<u64, DbErr>;

    /// Insert an alternative and return its id.
    async fn insert_alternative(&self, row: AlternativeRow) -> Result<i32, DbErr>;

    async fn update_alternative(&self, id: i32, row: AlternativeRow) -> Result<(), DbErr>;
}

/// [`QuestionRecords`] backed by a SeaORM connection. Each call is its own
/// statement; nothing is wrapped in a transaction.
pub struct DbQuestionRecords<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> DbQuestionRecords<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

fn question_columns(active: &mut question::ActiveModel, row: QuestionRow) {
    let f = row.fields;
    active.prova = Set(row.prova);
    active.instituicao = Set(row.instituicao);
    active.enunciado = Set(f.enunciado);
    active.comentario = Set(f.comentario);
    active.numero = Set(f.numero);
    active.discursiva = Set(f.discursiva);
    active.anulada = Set(f.anulada);
    active.ano = Set(f.ano);
    active.dif_q = Set(f.dif_q);
    active.foco = Set(f.foco);
    active.categoria = Set(f.categoria);
    active.subcategoria = Set(f.subcategoria);
    active.assunto = Set(f.assunto);
    active.comentario_validado = Set(f.comentario_validado);
    active.imagens_enunciado = Set(row.imagens_enunciado.into());
    active.alternativa_correta = Set(row.alternativa_correta);
    active.updated_at = Set(Utc::now());
}

fn alternative_columns(active: &mut alternative::ActiveModel, row: AlternativeRow) {
    active.questao = Set(row.questao);
    active.alternativa_txt = Set(row.alternativa_txt);
    active.comentario = Set(row.comentario);
    active.correta = Set(row.correta);
    active.comentario_validado = Set(row.comentario_validado);
    active.imagens = Set(row.imagens.into());
}

#[async_trait]
impl<C: ConnectionTrait + Send + Sync> QuestionRecords for DbQuestionRecords<'_, C> {
    async fn insert_question(&self, row: QuestionRow) -> Result<i32, DbErr> {
        let mut active = question::ActiveModel {
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        question_columns(&mut active, row);
        let model = active.insert(self.db).await?;
        Ok(model.id)
    }

    async fn update_question(&self, id: i32, row: QuestionRow) -> Result<(), DbErr> {
        let mut active = question::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        question_columns(&mut active, row);
        active.update(self.db).await?;
        Ok(())
    }

    async fn delete_alternatives(&self, ids: &[i32]) -> Result<u64, DbErr> {
        let res = alternative::Entity::delete_many()
            .filter(alternative::Column::Id.is_in(ids.iter().copied()))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn insert_alternative(&self, row: AlternativeRow) -> Result<i32, DbErr> {
        let mut active = alternative::ActiveModel {
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        alternative_columns(&mut active, row);
        let model = active.insert(self.db).await?;
        Ok(model.id)
    }

    async fn update_alternative(&self, id: i32, row: AlternativeRow) -> Result<(), DbErr> {
        let mut active = alternative::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        alternative_columns(&mut active, row);
        active.update(self.db).await?;
        Ok(())
    }
}
