use axum::{Router, routing::post};

use super::handlers::{register_solo, register_team};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:slug/registrations/solo", post(register_solo))
        .route("/:slug/registrations/team", post(register_team))
}
