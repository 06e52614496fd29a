use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{
    create_participant, delete_participant, get_participant, list_participants, verify_participant,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/verify", post(verify_participant))
        .route("/:id", delete(delete_participant))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_participants))
        .route("/", post(create_participant))
        .route("/:id", get(get_participant))
        .merge(protected)
}
