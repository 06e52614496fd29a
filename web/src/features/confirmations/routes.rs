use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    admit_walk_in, award_points, confirm, list_confirmations, replace, substitute_solo,
    substitute_team,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:slug/confirmations", get(list_confirmations))
        .route("/:slug/confirmations", post(confirm))
        .route("/:slug/confirmations/walk-in", post(admit_walk_in))
        .route("/:slug/confirmations/replace", post(replace))
        .route("/:slug/substitutions/solo", post(substitute_solo))
        .route("/:slug/substitutions/team", post(substitute_team))
        .route("/:slug/points", post(award_points))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
