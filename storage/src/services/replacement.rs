use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::confirmation::{ReplaceRequest, ReplacementResponse};
use crate::error::{Result, StorageError};
use crate::models::{Confirmation, EventKind, Release};
use crate::repository::participant::{ParticipantRepository, adjust_points};
use crate::repository::roster::RosterRepository;
use crate::services::notifier::{Notifier, notify_best_effort};

/// What happens to the manufactured slot when the arriving confirmation
/// fails mid-replacement.
///
/// The original system left the extra slot in place on most failure paths
/// and admins corrected counts by hand; whether that was intent or a bug
/// was never settled. `Strict` aborts the transaction so no slot leaks;
/// `Lenient` reproduces the historical behavior and commits the inflated
/// pool alongside the error. The `NotRegistered` failure is compensated
/// in both modes, as the original did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementMode {
    Strict,
    Lenient,
}

impl ReplacementMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ReplacementMode::Strict),
            "lenient" => Ok(ReplacementMode::Lenient),
            other => Err(StorageError::invalid(format!(
                "unknown replacement mode: {other}"
            ))),
        }
    }
}

/// Swap a confirmed participant for another in the same slot.
///
/// There is no combined swap primitive: capacity is inflated by one so the
/// arriving confirm passes the normal capacity check, the departing
/// entrant is then released, and the manufactured slot is deflated again.
/// Net slot count is unchanged on success; the arriving side is credited
/// registration points and the departing side debited the npr penalty.
pub async fn replace_confirmed<N: Notifier>(
    pool: &PgPool,
    notifier: &N,
    mode: ReplacementMode,
    event_id: Uuid,
    req: &ReplaceRequest,
) -> Result<ReplacementResponse> {
    let participants = ParticipantRepository::new(pool);
    let departing = participants
        .resolve_external_id(&req.departing_external_id)
        .await?;
    let arriving = participants
        .resolve_external_id(&req.arriving_external_id)
        .await?;
    if departing.participant_id == arriving.participant_id {
        return Err(StorageError::invalid(
            "Cannot replace a participant with themselves",
        ));
    }
    let bucket = req.bucket.as_deref();

    let mut tx = pool.begin().await?;

    let outcome: Result<(Confirmation, Release, String, u32)> = {
        let mut repo = RosterRepository::new(&mut tx);
        let mut roster = repo.load_for_update(event_id).await?;

        if !roster.is_confirmed(departing.participant_id, bucket) {
            return Err(StorageError::NotConfirmed);
        }

        // Manufacture the free slot before the arriving confirm.
        roster.pool.inflate(bucket)?;
        repo.save_slot(event_id, bucket, roster.pool.remaining(bucket)?)
            .await?;

        match roster.confirm(arriving.participant_id, bucket) {
            Ok(confirmation) => {
                if let Some(registration_id) = confirmation.registration_id {
                    match roster.event.kind()? {
                        EventKind::Solo => repo.set_solo_confirmed(registration_id, true).await?,
                        EventKind::Team => repo.set_team_confirmed(registration_id, true).await?,
                    }
                }
                repo.insert_confirmed_entry(&confirmation.entry).await?;

                let release = roster.release(departing.participant_id, bucket)?;
                repo.delete_confirmed_entry(release.entry_id).await?;
                if let Some(registration_id) = release.registration_id {
                    match roster.event.kind()? {
                        EventKind::Solo => repo.set_solo_confirmed(registration_id, false).await?,
                        EventKind::Team => repo.set_team_confirmed(registration_id, false).await?,
                    }
                }

                // Undo the temporary inflation now that the departing slot
                // has been refunded.
                roster.pool.deflate(bucket)?;
                let remaining = roster.pool.remaining(bucket)?;
                repo.save_slot(event_id, bucket, remaining).await?;

                Ok((confirmation, release, roster.event.name.clone(), remaining))
            }
            Err(e) => {
                // The one compensated failure: an unregistered arrival
                // rolls the manufactured slot back immediately.
                if matches!(e, StorageError::NotRegistered) {
                    roster.pool.deflate(bucket)?;
                    repo.save_slot(event_id, bucket, roster.pool.remaining(bucket)?)
                        .await?;
                }
                Err(e)
            }
        }
    };

    match outcome {
        Ok((confirmation, release, event_name, remaining)) => {
            let credited = if arriving.has_ledger() && confirmation.registration_points != 0 {
                adjust_points(
                    &mut tx,
                    arriving.participant_id,
                    confirmation.registration_points,
                )
                .await?;
                confirmation.registration_points
            } else {
                0
            };
            let debited = if departing.has_ledger() && release.npr_penalty != 0 {
                adjust_points(&mut tx, departing.participant_id, -release.npr_penalty).await?;
                release.npr_penalty
            } else {
                0
            };

            tx.commit().await?;

            tracing::info!(
                departing = %departing.display_id(),
                arriving = %arriving.display_id(),
                %event_id,
                ?bucket,
                "Replacement completed"
            );

            if let Some(email) = &arriving.email {
                notify_best_effort(
                    notifier,
                    email,
                    "Registration confirmed",
                    &format!(
                        "Hi {}, your registration for {} has been confirmed.",
                        arriving.first_name, event_name
                    ),
                )
                .await;
            }

            Ok(ReplacementResponse {
                event_id,
                bucket: req.bucket.clone(),
                departing_id: departing.participant_id,
                arriving_id: arriving.participant_id,
                npr_debited: debited,
                registration_credited: credited,
                remaining,
            })
        }
        Err(e) => {
            match mode {
                // Dropping the transaction rolls the inflation back.
                ReplacementMode::Strict => Err(e),
                // Keep whatever slot state the failure path wrote, leak
                // included, and still report the failure.
                ReplacementMode::Lenient => {
                    tx.commit().await?;
                    tracing::warn!(
                        %event_id,
                        ?bucket,
                        error = %e,
                        "Replacement failed after capacity inflation; lenient mode kept the slot state"
                    );
                    Err(e)
                }
            }
        }
    }
}
