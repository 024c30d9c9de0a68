pub mod health;
pub mod production_groups;
pub mod production_settings;
pub mod rounding;
pub mod specifications;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /specifications                            list, create
/// /specifications/{id}                       get, update, deactivate
/// /specifications/{id}/pair                  link rotated partner (POST)
/// /specifications/maintenance/auto-link      auto-link pass (POST)
/// /specifications/maintenance/normalize      area + name normalization (POST)
///
/// /production-groups                         list, create
/// /production-groups/{id}/settings           settings of a group
///
/// /production-settings                       create
/// /production-settings/{id}                  get, update, deactivate
/// /production-settings/{id}/quote            price an order line (POST)
///
/// /rounding                                  all tier lists
/// /rounding/{category}                       replace a tier list (PUT)
/// /rounding/preview                          round a single price (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/specifications", specifications::router())
        .nest("/production-groups", production_groups::router())
        .nest("/production-settings", production_settings::router())
        .nest("/rounding", rounding::router())
}
