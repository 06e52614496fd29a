use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::confirmation::{
    AwardPointsRequest, AwardResponse, ConfirmRequest, ConfirmationListResponse,
    ConfirmationResponse, ReplaceRequest, ReplacementResponse, SubstituteSoloRequest,
    SubstituteTeamRequest, SubstitutionResponse, TeamSubstitutionResponse, WalkInRequest,
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events/{slug}/confirmations",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Per-bucket pending and confirmed entrants", body = ConfirmationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "confirmations"
)]
pub async fn list_confirmations(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let listing = services::listing(&state, &slug).await?;

    Ok(Json(listing).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/confirmations",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = ConfirmRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participant confirmed", body = ConfirmationResponse),
        (status = 400, description = "Not registered or invalid bucket"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event or participant not found"),
        (status = 409, description = "No free slots or already confirmed")
    ),
    tag = "confirmations"
)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let confirmation = services::confirm(&state, &slug, &req).await?;

    Ok(Json(confirmation).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/confirmations/walk-in",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = WalkInRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Walk-in admitted", body = ConfirmationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "No free slots or already admitted")
    ),
    tag = "confirmations"
)]
pub async fn admit_walk_in(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<WalkInRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let admission = services::walk_in(&state, &slug, &req).await?;

    Ok(Json(admission).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/confirmations/replace",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = ReplaceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Replacement completed", body = ReplacementResponse),
        (status = 400, description = "Departing participant not confirmed or self-replacement"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event or participant not found"),
        (status = 409, description = "Arriving participant already confirmed")
    ),
    tag = "confirmations"
)]
pub async fn replace(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<ReplaceRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let replacement = services::replace(&state, &slug, &req).await?;

    Ok(Json(replacement).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/substitutions/solo",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = SubstituteSoloRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Substitution applied", body = SubstitutionResponse),
        (status = 400, description = "Missing departing identity or documents"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a sponsored account"),
        (status = 404, description = "No matching placeholder or sub-participant")
    ),
    tag = "substitutions"
)]
pub async fn substitute_solo(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SubstituteSoloRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let substitution = services::substitute_solo(&state, &slug, &req).await?;

    Ok(Json(substitution).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/substitutions/team",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = SubstituteTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team substitution applied", body = TeamSubstitutionResponse),
        (status = 400, description = "No placeholder positions were substituted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a sponsored account"),
        (status = 404, description = "Event not found")
    ),
    tag = "substitutions"
)]
pub async fn substitute_team(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SubstituteTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let substitution = services::substitute_team(&state, &slug, &req).await?;

    Ok(Json(substitution).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/points",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    request_body = AwardPointsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Points adjusted", body = AwardResponse),
        (status = 400, description = "Participant not confirmed for this event"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Participant has no points ledger"),
        (status = 404, description = "Event or participant not found")
    ),
    tag = "confirmations"
)]
pub async fn award_points(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<AwardPointsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let award = services::award(&state, &slug, &req).await?;

    Ok(Json(award).into_response())
}
