use axum::routing::get;
use axum::Router;

use crate::handlers::production_group;
use crate::state::AppState;

/// Routes mounted at `/production-groups`.
///
/// ```text
/// GET  /                -> list
/// POST /                -> create
/// GET  /{id}/settings   -> list_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(production_group::list).post(production_group::create))
        .route("/{id}/settings", get(production_group::list_settings))
}
