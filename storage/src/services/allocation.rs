use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::confirmation::{ConfirmationResponse, WalkInRequest};
use crate::error::Result;
use crate::models::EventKind;
use crate::repository::participant::{ParticipantRepository, adjust_points};
use crate::repository::roster::RosterRepository;
use crate::services::notifier::{Notifier, notify_best_effort};

/// Confirm a registered participant into an event slot.
///
/// The registration flag, the confirmed set, the slot count and the point
/// credit all commit in one transaction under the event row lock. The
/// confirmation email goes out after the commit and never unwinds it.
pub async fn confirm_registration<N: Notifier>(
    pool: &PgPool,
    notifier: &N,
    external_id: &str,
    event_id: Uuid,
    bucket: Option<&str>,
) -> Result<ConfirmationResponse> {
    let participant = ParticipantRepository::new(pool)
        .resolve_external_id(external_id)
        .await?;

    let mut tx = pool.begin().await?;

    let (confirmation, event_name, event_kind, remaining) = {
        let mut repo = RosterRepository::new(&mut tx);
        let mut roster = repo.load_for_update(event_id).await?;
        let confirmation = roster.confirm(participant.participant_id, bucket)?;

        if let Some(registration_id) = confirmation.registration_id {
            match roster.event.kind()? {
                EventKind::Solo => repo.set_solo_confirmed(registration_id, true).await?,
                EventKind::Team => repo.set_team_confirmed(registration_id, true).await?,
            }
        }
        repo.insert_confirmed_entry(&confirmation.entry).await?;
        let remaining = roster.pool.remaining(bucket)?;
        repo.save_slot(event_id, bucket, remaining).await?;

        (
            confirmation,
            roster.event.name.clone(),
            roster.event.kind()?,
            remaining,
        )
    };

    let credited = if participant.has_ledger() && confirmation.registration_points != 0 {
        adjust_points(
            &mut tx,
            participant.participant_id,
            confirmation.registration_points,
        )
        .await?;
        confirmation.registration_points
    } else {
        0
    };

    tx.commit().await?;

    tracing::info!(
        participant = %participant.display_id(),
        event = %event_name,
        ?bucket,
        kind = event_kind.as_str(),
        "Registration confirmed"
    );

    if let Some(email) = &participant.email {
        notify_best_effort(
            notifier,
            email,
            "Registration confirmed",
            &format!(
                "Hi {}, your registration for {} has been confirmed.",
                participant.first_name, event_name
            ),
        )
        .await;
    }

    Ok(ConfirmationResponse {
        event_id,
        participant_id: participant.participant_id,
        external_id: participant.external_id.clone(),
        bucket: bucket.map(str::to_owned),
        remaining,
        points_credited: credited,
    })
}

/// Admit an on-the-spot participant straight into the confirmed set.
/// Skips the registration precondition and the point credit; capacity and
/// duplicate checks still apply.
pub async fn admit_walk_in(
    pool: &PgPool,
    event_id: Uuid,
    req: &WalkInRequest,
) -> Result<ConfirmationResponse> {
    let participant = ParticipantRepository::new(pool)
        .find_or_create_walk_in(&req.otse_id, &req.identity)
        .await?;
    let bucket = req.bucket.as_deref();

    let mut tx = pool.begin().await?;

    let remaining = {
        let mut repo = RosterRepository::new(&mut tx);
        let mut roster = repo.load_for_update(event_id).await?;
        let admission = roster.admit_walk_in(participant.participant_id, bucket)?;

        repo.insert_confirmed_entry(&admission.entry).await?;
        let remaining = roster.pool.remaining(bucket)?;
        repo.save_slot(event_id, bucket, remaining).await?;
        remaining
    };

    tx.commit().await?;

    tracing::info!(
        participant = %participant.display_id(),
        %event_id,
        ?bucket,
        "Walk-in admitted"
    );

    Ok(ConfirmationResponse {
        event_id,
        participant_id: participant.participant_id,
        external_id: participant.external_id.clone(),
        bucket: req.bucket.clone(),
        remaining,
        points_credited: 0,
    })
}
