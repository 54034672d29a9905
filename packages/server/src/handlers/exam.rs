use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::{instrument, warn};

use crate::entity::{alternative, exam, question};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::institution::find_institution;
use crate::models::exam::*;
use crate::question_save::remove_image;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/exams",
    tag = "Exams",
    operation_id = "listInstitutionExams",
    summary = "List the exams of an institution",
    description = "Exams ordered by year (newest first), then by name.",
    params(("id" = i32, Path, description = "Institution ID")),
    responses(
        (status = 200, description = "Exams", body = Vec<ExamResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(institution_id))]
pub async fn list_exams(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(institution_id): Path<i32>,
) -> Result<Json<Vec<ExamResponse>>, AppError> {
    find_institution(&state.db, institution_id).await?;

    let exams = exam::Entity::find()
        .filter(exam::Column::Instituicao.eq(institution_id))
        .order_by_desc(exam::Column::Ano)
        .order_by_asc(exam::Column::Nome)
        .all(&state.db)
        .await?;

    Ok(Json(exams.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/exams",
    tag = "Exams",
    operation_id = "createExam",
    summary = "Create an exam for an institution",
    description = "The exam name is derived from the institution name, year and focus.",
    params(("id" = i32, Path, description = "Institution ID")),
    request_body = CreateExamRequest,
    responses(
        (status = 201, description = "Exam created", body = ExamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(institution_id, ano = payload.ano))]
pub async fn create_exam(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(institution_id): Path<i32>,
    AppJson(payload): AppJson<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let values = validate_create_exam(&payload)?;
    let inst = find_institution(&state.db, institution_id).await?;

    let model = exam::ActiveModel {
        nome: Set(derive_exam_name(&inst.nome, values.ano, values.tipo_de_foco)),
        ano: Set(values.ano),
        tipo_de_foco: Set(values.tipo_de_foco),
        uf: Set(values.uf),
        bloqueada: Set(values.bloqueada),
        qtd_questoes: Set(values.qtd_questoes),
        instituicao: Set(inst.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ExamResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Exams",
    operation_id = "getExam",
    summary = "Get an exam by ID",
    params(("id" = i32, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam", body = ExamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Exam not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_exam(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ExamResponse>, AppError> {
    let model = find_exam(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Exams",
    operation_id = "updateExam",
    summary = "Update an exam",
    description = "Partially updates an exam; the name is derived again from the institution name, year and focus. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Exam ID")),
    request_body = UpdateExamRequest,
    responses(
        (status = 200, description = "Exam updated", body = ExamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Exam not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(id))]
pub async fn update_exam(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateExamRequest>,
) -> Result<Json<ExamResponse>, AppError> {
    let patch = validate_update_exam(&payload)?;

    if payload == UpdateExamRequest::default() {
        let existing = find_exam(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_exam_for_update(&txn, id).await?;
    let inst = find_institution(&txn, existing.instituicao).await?;

    let ano = patch.ano.unwrap_or(existing.ano);
    let focus = patch.tipo_de_foco.unwrap_or(existing.tipo_de_foco);
    let mut active: exam::ActiveModel = existing.into();

    active.ano = Set(ano);
    active.tipo_de_foco = Set(focus);
    active.nome = Set(derive_exam_name(&inst.nome, ano, focus));
    if let Some(uf) = patch.uf {
        active.uf = Set(uf);
    }
    if let Some(qtd) = patch.qtd_questoes {
        active.qtd_questoes = Set(qtd);
    }
    if let Some(bloqueada) = patch.bloqueada {
        active.bloqueada = Set(bloqueada);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/toggle-lock",
    tag = "Exams",
    operation_id = "toggleExamLock",
    summary = "Lock or unlock an exam",
    params(("id" = i32, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Lock flag flipped", body = ExamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Exam not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn toggle_exam_lock(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ExamResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_exam_for_update(&txn, id).await?;
    let locked = !existing.bloqueada;
    let mut active: exam::ActiveModel = existing.into();
    active.bloqueada = Set(locked);
    let model = active.update(&txn).await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Exams",
    operation_id = "deleteExam",
    summary = "Delete a locked exam",
    description = "Permanently deletes a locked exam with its questions and alternatives. Their images are removed from storage afterwards.",
    params(("id" = i32, Path, description = "Exam ID")),
    responses(
        (status = 204, description = "Exam deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Exam not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Exam is not locked (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn delete_exam(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_exam_for_update(&txn, id).await?;
    if !existing.bloqueada {
        return Err(AppError::Conflict(
            "Only locked exams can be deleted".into(),
        ));
    }

    let questions = question::Entity::find()
        .filter(question::Column::Prova.eq(id))
        .all(&txn)
        .await?;
    let question_ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
    let alternatives = alternative::Entity::find()
        .filter(alternative::Column::Questao.is_in(question_ids))
        .all(&txn)
        .await?;

    let mut image_urls: Vec<String> = questions
        .into_iter()
        .flat_map(|q| q.imagens_enunciado.0)
        .collect();
    image_urls.extend(alternatives.into_iter().flat_map(|a| a.imagens.0));

    alternative::Entity::delete_many()
        .filter(
            alternative::Column::Questao.in_subquery(
                SeaQuery::select()
                    .column(question::Column::Id)
                    .from(question::Entity)
                    .and_where(question::Column::Prova.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;
    question::Entity::delete_many()
        .filter(question::Column::Prova.eq(id))
        .exec(&txn)
        .await?;
    exam::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    let owner = format!("exam {id}");
    for url in &image_urls {
        if let Err(e) = remove_image(state.store.as_ref(), url, &owner).await {
            warn!(error = %e, "Failed to remove image of deleted exam");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_exam<C: ConnectionTrait>(db: &C, id: i32) -> Result<exam::Model, AppError> {
    exam::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Exam not found".into()))
}

async fn find_exam_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<exam::Model, AppError> {
    use sea_orm::sea_query::LockType;
    exam::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Exam not found".into()))
}
