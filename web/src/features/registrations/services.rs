use sqlx::PgPool;
use storage::{
    dto::registration::{RegisterSoloRequest, RegisterTeamRequest, RegistrationResponse},
    error::Result,
    repository::event::EventRepository,
    services::registration,
};

/// Register an entrant for a solo event
pub async fn register_solo(
    pool: &PgPool,
    slug: &str,
    request: &RegisterSoloRequest,
) -> Result<RegistrationResponse> {
    let event = EventRepository::new(pool).find_by_slug(slug).await?;
    registration::register_solo(pool, event.event_id, request).await
}

/// Register a team for a team event
pub async fn register_team(
    pool: &PgPool,
    slug: &str,
    request: &RegisterTeamRequest,
) -> Result<RegistrationResponse> {
    let event = EventRepository::new(pool).find_by_slug(slug).await?;
    registration::register_team(pool, event.event_id, request).await
}
