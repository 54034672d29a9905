mod v1;

use axum::Router;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;

use crate::handlers::storage::download_object;
use crate::state::AppState;

/// Documented JSON API, mounted under `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}

/// Public object downloads. Stored image URLs point here; no token required.
pub fn storage_routes() -> Router<AppState> {
    Router::new().route("/storage/{bucket}/{*path}", get(download_object))
}
