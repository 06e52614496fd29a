use sqlx::PgPool;
use storage::{
    dto::participant::{CreateParticipantRequest, ParticipantResponse, VerifyParticipantRequest},
    error::Result,
    models::Participant,
    repository::participant::ParticipantRepository,
    services::verification,
};
use uuid::Uuid;

/// List all participants
pub async fn list_participants(pool: &PgPool) -> Result<Vec<Participant>> {
    let repo = ParticipantRepository::new(pool);
    repo.list().await
}

/// Get a participant by internal ID
pub async fn get_participant(pool: &PgPool, id: Uuid) -> Result<Participant> {
    let repo = ParticipantRepository::new(pool);
    repo.find_by_id(id).await
}

/// Create a new cc/ncp account
pub async fn create_participant(
    pool: &PgPool,
    request: &CreateParticipantRequest,
) -> Result<Participant> {
    let repo = ParticipantRepository::new(pool);
    repo.create(request).await
}

/// Apply a verification decision under the admin lock
pub async fn verify_participant(
    pool: &PgPool,
    id: Uuid,
    request: &VerifyParticipantRequest,
) -> Result<ParticipantResponse> {
    verification::decide_verification(pool, id, request).await
}

/// Soft-delete a participant
pub async fn delete_participant(pool: &PgPool, id: Uuid) -> Result<()> {
    let repo = ParticipantRepository::new(pool);
    repo.soft_delete(id).await
}
