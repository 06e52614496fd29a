use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::participant::{ParticipantResponse, VerificationDecision, VerifyParticipantRequest};
use crate::error::Result;
use crate::models::VerificationStatus;
use crate::repository::participant::ParticipantRepository;

/// Apply an identity-verification decision under the per-participant
/// admin lock.
///
/// The lock is taken with a single conditional update, so a second admin
/// gets `Locked` instead of silently racing the first. The decision and
/// the unlock land in one statement; if applying the decision fails the
/// lock is still dropped.
pub async fn decide_verification(
    pool: &PgPool,
    participant_id: Uuid,
    req: &VerifyParticipantRequest,
) -> Result<ParticipantResponse> {
    let participants = ParticipantRepository::new(pool);
    participants.try_lock(participant_id).await?;

    let status = match req.decision {
        VerificationDecision::Verified => VerificationStatus::Verified,
        VerificationDecision::Rejected => VerificationStatus::Rejected,
    };

    match participants.finish_verification(participant_id, status).await {
        Ok(participant) => {
            tracing::info!(
                participant = %participant.display_id(),
                decision = status.as_str(),
                "Verification decision applied"
            );
            Ok(ParticipantResponse::from(participant))
        }
        Err(e) => {
            if let Err(unlock_err) = participants.unlock(participant_id).await {
                tracing::error!(
                    %participant_id,
                    error = %unlock_err,
                    "Failed to release verification lock"
                );
            }
            Err(e)
        }
    }
}
