use storage::{
    dto::confirmation::{
        AwardPointsRequest, AwardResponse, ConfirmRequest, ConfirmationListResponse,
        ConfirmationResponse, ReplaceRequest, ReplacementResponse, SubstituteSoloRequest,
        SubstituteTeamRequest, SubstitutionResponse, TeamSubstitutionResponse, WalkInRequest,
    },
    error::Result,
    repository::event::EventRepository,
    services::{allocation, listing, points, replacement, substitution},
};
use uuid::Uuid;

use crate::state::AppState;

async fn resolve_event(state: &AppState, slug: &str) -> Result<Uuid> {
    let event = EventRepository::new(state.db.pool()).find_by_slug(slug).await?;
    Ok(event.event_id)
}

/// Confirm a registered participant into a slot
pub async fn confirm(
    state: &AppState,
    slug: &str,
    request: &ConfirmRequest,
) -> Result<ConfirmationResponse> {
    let event_id = resolve_event(state, slug).await?;
    allocation::confirm_registration(
        state.db.pool(),
        &state.notifier,
        &request.external_id,
        event_id,
        request.bucket.as_deref(),
    )
    .await
}

/// Admit an on-the-spot participant into the confirmed set
pub async fn walk_in(
    state: &AppState,
    slug: &str,
    request: &WalkInRequest,
) -> Result<ConfirmationResponse> {
    let event_id = resolve_event(state, slug).await?;
    allocation::admit_walk_in(state.db.pool(), event_id, request).await
}

/// Replace a confirmed participant with another
pub async fn replace(
    state: &AppState,
    slug: &str,
    request: &ReplaceRequest,
) -> Result<ReplacementResponse> {
    let event_id = resolve_event(state, slug).await?;
    replacement::replace_confirmed(
        state.db.pool(),
        &state.notifier,
        state.replacement_mode,
        event_id,
        request,
    )
    .await
}

/// Resolve a solo placeholder or swap a sub-participant identity
pub async fn substitute_solo(
    state: &AppState,
    slug: &str,
    request: &SubstituteSoloRequest,
) -> Result<SubstitutionResponse> {
    let event_id = resolve_event(state, slug).await?;
    substitution::substitute_solo(state.db.pool(), event_id, request).await
}

/// Fill a team's placeholder positions with real identities
pub async fn substitute_team(
    state: &AppState,
    slug: &str,
    request: &SubstituteTeamRequest,
) -> Result<TeamSubstitutionResponse> {
    let event_id = resolve_event(state, slug).await?;
    substitution::substitute_team(state.db.pool(), event_id, request).await
}

/// Per-bucket pending/confirmed projection of an event
pub async fn listing(state: &AppState, slug: &str) -> Result<ConfirmationListResponse> {
    let event_id = resolve_event(state, slug).await?;
    listing::confirmation_listing(state.db.pool(), event_id).await
}

/// Award points to a confirmed participant
pub async fn award(
    state: &AppState,
    slug: &str,
    request: &AwardPointsRequest,
) -> Result<AwardResponse> {
    let event_id = resolve_event(state, slug).await?;
    points::award_points(state.db.pool(), event_id, request).await
}
