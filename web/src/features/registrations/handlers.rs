use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::registration::{
    RegisterSoloRequest, RegisterTeamRequest, RegistrationResponse,
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/events/{slug}/registrations/solo",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = RegisterSoloRequest,
    responses(
        (status = 201, description = "Registration created", body = RegistrationResponse),
        (status = 400, description = "Validation error or registration closed"),
        (status = 403, description = "Entrant kind not permitted"),
        (status = 404, description = "Event or participant not found")
    ),
    tag = "registrations"
)]
pub async fn register_solo(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<RegisterSoloRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let registration = services::register_solo(state.db.pool(), &slug, &req).await?;

    Ok((StatusCode::CREATED, Json(registration)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/registrations/team",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = RegisterTeamRequest,
    responses(
        (status = 201, description = "Team registration created", body = RegistrationResponse),
        (status = 400, description = "Validation error or registration closed"),
        (status = 403, description = "Entrant kind not permitted"),
        (status = 404, description = "Event or participant not found")
    ),
    tag = "registrations"
)]
pub async fn register_team(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<RegisterTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let registration = services::register_team(state.db.pool(), &slug, &req).await?;

    Ok((StatusCode::CREATED, Json(registration)).into_response())
}
