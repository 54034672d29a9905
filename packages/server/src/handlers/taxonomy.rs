use axum::Json;
use axum::extract::{Query, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{category, subcategory, subject};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::taxonomy::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Taxonomy",
    operation_id = "listCategories",
    summary = "List categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<CategoryResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_categories(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let rows = category::Entity::find()
        .order_by_asc(category::Column::Nome)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/subcategories",
    tag = "Taxonomy",
    operation_id = "listSubcategories",
    summary = "List subcategories",
    description = "All subcategories, or only those of `categoria` when given.",
    params(SubcategoryQuery),
    responses(
        (status = 200, description = "Subcategories ordered by name", body = Vec<SubcategoryResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_subcategories(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubcategoryQuery>,
) -> Result<Json<Vec<SubcategoryResponse>>, AppError> {
    let mut select = subcategory::Entity::find();
    if let Some(categoria) = query.categoria {
        select = select.filter(subcategory::Column::Categoria.eq(categoria));
    }
    let rows = select
        .order_by_asc(subcategory::Column::Nome)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/subjects",
    tag = "Taxonomy",
    operation_id = "listSubjects",
    summary = "List subjects",
    description = "All subjects, or only those of `subcategoria` when given.",
    params(SubjectQuery),
    responses(
        (status = 200, description = "Subjects ordered by name", body = Vec<SubjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_subjects(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    let mut select = subject::Entity::find();
    if let Some(subcategoria) = query.subcategoria {
        select = select.filter(subject::Column::Subcategoria.eq(subcategoria));
    }
    let rows = select
        .order_by_asc(subject::Column::Nome)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
