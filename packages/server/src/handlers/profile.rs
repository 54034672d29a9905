use axum::{Json, extract::State};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::profile;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::profile::{ProfileResponse, UpdateProfileRequest, validate_update_profile};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/profile",
    tag = "Account",
    operation_id = "getProfile",
    summary = "Get the caller's profile",
    description = "Returns empty fields when the profile has never been saved.",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profile::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?;

    Ok(Json(match profile {
        Some(p) => p.into(),
        None => ProfileResponse::empty(auth_user.user_id),
    }))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "Account",
    operation_id = "updateProfile",
    summary = "Create or replace the caller's profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = ProfileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Username already taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let values = validate_update_profile(payload)?;

    let model = profile::ActiveModel {
        id: Set(auth_user.user_id),
        username: Set(values.username),
        website: Set(values.website),
        avatar_url: Set(values.avatar_url),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    profile::Entity::insert(model)
        .on_conflict(
            OnConflict::column(profile::Column::Id)
                .update_columns([
                    profile::Column::Username,
                    profile::Column::Website,
                    profile::Column::AvatarUrl,
                    profile::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Username is already taken".into())
            }
            _ => AppError::from(e),
        })?;

    let saved = profile::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Profile missing after upsert".into()))?;

    Ok(Json(saved.into()))
}
