use axum::routing::{get, post};
use axum::Router;

use crate::handlers::specification;
use crate::state::AppState;

/// Routes mounted at `/specifications`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> deactivate
/// POST   /{id}/pair               -> link_pair
/// POST   /maintenance/auto-link   -> auto_link
/// POST   /maintenance/normalize   -> normalize
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(specification::list).post(specification::create))
        .route(
            "/{id}",
            get(specification::get_by_id)
                .put(specification::update)
                .delete(specification::deactivate),
        )
        .route("/{id}/pair", post(specification::link_pair))
        .route("/maintenance/auto-link", post(specification::auto_link))
        .route("/maintenance/normalize", post(specification::normalize))
}
