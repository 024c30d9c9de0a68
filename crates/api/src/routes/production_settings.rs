use axum::routing::{get, post};
use axum::Router;

use crate::handlers::production_setting;
use crate::state::AppState;

/// Routes mounted at `/production-settings`.
///
/// ```text
/// POST   /             -> create
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> deactivate
/// POST   /{id}/quote   -> quote
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(production_setting::create))
        .route(
            "/{id}",
            get(production_setting::get_by_id)
                .put(production_setting::update)
                .delete(production_setting::deactivate),
        )
        .route("/{id}/quote", post(production_setting::quote))
}
