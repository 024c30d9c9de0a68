use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::rounding;
use crate::state::AppState;

/// Routes mounted at `/rounding`.
///
/// ```text
/// GET  /              -> list
/// PUT  /{category}    -> replace
/// POST /preview       -> preview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rounding::list))
        .route("/{category}", put(rounding::replace))
        .route("/preview", post(rounding::preview))
}
