use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{exam, institution};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::exam::derive_exam_name;
use crate::models::institution::*;
use crate::models::shared::parse_uf;
use crate::state::AppState;

/// Number of exams of the institution in the current row.
const PROVAS_COUNT_SQL: &str =
    "(SELECT COUNT(*) FROM provas WHERE provas.instituicao = instituicoes.id)";

#[utoipa::path(
    get,
    path = "/",
    tag = "Institutions",
    operation_id = "listInstitutions",
    summary = "List institutions with pagination and search",
    description = "Returns institutions sorted by name with the number of exams of each. `search` matches name or short name, case-insensitively.",
    params(InstitutionListQuery),
    responses(
        (status = 200, description = "List of institutions", body = InstitutionListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_institutions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<InstitutionListQuery>,
) -> Result<Json<InstitutionListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let mut select = institution::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(institution::Column::Nome)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(institution::Column::NomeG)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    if let Some(ref uf) = query.uf
        && !uf.trim().is_empty()
    {
        select = select.filter(institution::Column::Uf.eq(parse_uf(uf)?));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    // Pages past the end are empty; also keeps the offset within bigint range.
    let offset = (page - 1).saturating_mul(per_page);
    if offset >= total {
        return Ok(Json(InstitutionListResponse {
            data: Vec::new(),
            pagination: Pagination {
                page,
                per_page,
                total,
                total_pages,
            },
        }));
    }

    let data = select
        .select_only()
        .column(institution::Column::Id)
        .column(institution::Column::Nome)
        .column(institution::Column::NomeG)
        .column(institution::Column::Uf)
        .column(institution::Column::Desabilitada)
        .column(institution::Column::CreatedAt)
        .column_as(Expr::cust(PROVAS_COUNT_SQL), "provas_count")
        .order_by_asc(institution::Column::Nome)
        .order_by_asc(institution::Column::Id)
        .offset(Some(offset))
        .limit(Some(per_page))
        .into_model::<InstitutionListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(InstitutionListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Institutions",
    operation_id = "createInstitution",
    summary = "Create an institution",
    request_body = CreateInstitutionRequest,
    responses(
        (status = 201, description = "Institution created", body = InstitutionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(nome = %payload.nome))]
pub async fn create_institution(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateInstitutionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let values = validate_create_institution(&payload)?;

    let model = institution::ActiveModel {
        nome: Set(values.nome),
        nome_g: Set(values.nome_g),
        uf: Set(values.uf),
        desabilitada: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(InstitutionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Institutions",
    operation_id = "getInstitution",
    summary = "Get an institution by ID",
    params(("id" = i32, Path, description = "Institution ID")),
    responses(
        (status = 200, description = "Institution", body = InstitutionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_institution(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let model = find_institution(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Institutions",
    operation_id = "updateInstitution",
    summary = "Update an institution",
    description = "Partially updates an institution. Renaming it also renames its exams, whose names embed the institution name. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Institution ID")),
    request_body = UpdateInstitutionRequest,
    responses(
        (status = 200, description = "Institution updated", body = InstitutionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(id))]
pub async fn update_institution(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateInstitutionRequest>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let patch = validate_update_institution(&payload)?;

    if payload == UpdateInstitutionRequest::default() {
        let existing = find_institution(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_institution_for_update(&txn, id).await?;
    let renamed = patch
        .nome
        .as_ref()
        .filter(|nome| **nome != existing.nome)
        .cloned();
    let mut active: institution::ActiveModel = existing.into();

    if let Some(nome) = patch.nome {
        active.nome = Set(nome);
    }
    if let Some(nome_g) = patch.nome_g {
        active.nome_g = Set(nome_g);
    }
    if let Some(uf) = patch.uf {
        active.uf = Set(uf);
    }

    let model = active.update(&txn).await?;

    if let Some(nome) = renamed {
        let exams = exam::Entity::find()
            .filter(exam::Column::Instituicao.eq(id))
            .all(&txn)
            .await?;
        let count = exams.len();
        for e in exams {
            let name = derive_exam_name(&nome, e.ano, e.tipo_de_foco);
            let mut active: exam::ActiveModel = e.into();
            active.nome = Set(name);
            active.update(&txn).await?;
        }
        info!(exams = count, "Renamed exams of institution");
    }

    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/disable",
    tag = "Institutions",
    operation_id = "disableInstitution",
    summary = "Disable an institution",
    description = "Sets `desabilitada`. The row is kept; disabling an already disabled institution is a no-op.",
    params(("id" = i32, Path, description = "Institution ID")),
    responses(
        (status = 200, description = "Institution disabled", body = InstitutionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn disable_institution(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let existing = find_institution(&state.db, id).await?;
    if existing.desabilitada {
        return Ok(Json(existing.into()));
    }

    let mut active: institution::ActiveModel = existing.into();
    active.desabilitada = Set(true);
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Institutions",
    operation_id = "deleteInstitution",
    summary = "Delete a disabled institution",
    description = "Permanently deletes an institution. Only disabled institutions without exams can be deleted.",
    params(("id" = i32, Path, description = "Institution ID")),
    responses(
        (status = 204, description = "Institution deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Institution is enabled or still has exams (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn delete_institution(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_institution_for_update(&txn, id).await?;
    if !existing.desabilitada {
        return Err(AppError::Conflict(
            "Only disabled institutions can be deleted".into(),
        ));
    }

    let exam_count = exam::Entity::find()
        .filter(exam::Column::Instituicao.eq(id))
        .count(&txn)
        .await?;
    if exam_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete an institution that still has exams".into(),
        ));
    }

    institution::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_institution<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<institution::Model, AppError> {
    institution::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Institution not found".into()))
}

async fn find_institution_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<institution::Model, AppError> {
    use sea_orm::sea_query::LockType;
    institution::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Institution not found".into()))
}
