use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::confirmation::{AwardKind, AwardPointsRequest, AwardResponse};
use crate::error::{Result, StorageError};
use crate::repository::participant::{ParticipantRepository, adjust_points};
use crate::repository::roster::RosterRepository;

/// Award podium/qualification points or charge the non-qualification
/// penalty. A plain ledger write, guarded by actual membership of the
/// event's confirmed set.
pub async fn award_points(
    pool: &PgPool,
    event_id: Uuid,
    req: &AwardPointsRequest,
) -> Result<AwardResponse> {
    let participants = ParticipantRepository::new(pool);
    let participant = participants.resolve_external_id(&req.external_id).await?;
    if !participant.has_ledger() {
        return Err(StorageError::Forbidden);
    }

    let mut tx = pool.begin().await?;
    let delta = {
        let mut repo = RosterRepository::new(&mut tx);
        let roster = repo.load_for_update(event_id).await?;
        if roster.event.deleted {
            return Err(StorageError::NotFound);
        }
        if !roster.is_confirmed_anywhere(participant.participant_id) {
            return Err(StorageError::NotConfirmed);
        }

        let points = roster.event.points();
        match req.award {
            AwardKind::First => points.first,
            AwardKind::Second => points.second,
            AwardKind::Third => points.third,
            AwardKind::Qualification => points.qualification,
            AwardKind::NpqPenalty => -points.npq,
        }
    };

    adjust_points(&mut tx, participant.participant_id, delta).await?;
    tx.commit().await?;

    let updated = participants.find_by_id(participant.participant_id).await?;

    tracing::info!(
        participant = %updated.display_id(),
        %event_id,
        delta,
        "Points adjusted"
    );

    Ok(AwardResponse {
        participant_id: updated.participant_id,
        delta,
        points: updated.points,
    })
}
