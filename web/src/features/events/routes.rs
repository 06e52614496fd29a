use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use super::handlers::{
    create_event, delete_event, get_event, list_events, update_event, update_event_status,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_event))
        .route("/:slug", put(update_event))
        .route("/:slug/status", put(update_event_status))
        .route("/:slug", delete(delete_event))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_events))
        .route("/:slug", get(get_event))
        .merge(protected)
}
