use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::confirmation::{BucketListing, ConfirmationListResponse, EntrantLabel};
use crate::error::{Result, StorageError};
use crate::models::{EventKind, EventRoster, ParticipantRef};
use crate::repository::participant::ParticipantRepository;
use crate::repository::roster::RosterRepository;

const PLACEHOLDER_LABEL: &str = "dummy";

/// Project one event's registrations into per-bucket pending/confirmed
/// lists. Placeholder refs collapse to a display label; resolved refs are
/// labelled by their owning participant's external ID. Pure read, no
/// state change.
pub async fn confirmation_listing(pool: &PgPool, event_id: Uuid) -> Result<ConfirmationListResponse> {
    let mut conn = pool.acquire().await?;
    let roster = RosterRepository::new(&mut conn).load_for_update(event_id).await?;
    drop(conn);

    if roster.event.deleted {
        return Err(StorageError::NotFound);
    }

    let labels = label_map(pool, &roster).await?;
    let label_of = |re: &ParticipantRef| match re {
        ParticipantRef::Placeholder { .. } => EntrantLabel {
            label: PLACEHOLDER_LABEL.to_string(),
            placeholder: true,
        },
        ParticipantRef::Resolved { id } => EntrantLabel {
            label: labels
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            placeholder: false,
        },
    };

    let kind = roster.event.kind()?;
    let mut buckets = Vec::new();
    for bucket in roster.pool.bucket_names() {
        let slots = roster.pool.bucket(bucket.as_deref())?;

        let mut pending: Vec<EntrantLabel> = Vec::new();
        match kind {
            EventKind::Solo => {
                pending.extend(
                    roster
                        .solo
                        .iter()
                        .filter(|r| r.bucket == bucket && !r.confirmed)
                        .map(|r| label_of(&r.entrant())),
                );
            }
            EventKind::Team => {
                pending.extend(
                    roster
                        .teams
                        .iter()
                        .filter(|r| !r.confirmed)
                        .map(|r| label_of(&ParticipantRef::resolved(r.registered_by))),
                );
            }
        }

        let confirmed = roster
            .confirmed
            .iter()
            .filter(|e| e.bucket == bucket)
            .map(|e| label_of(&e.entrant))
            .collect();

        buckets.push(BucketListing {
            bucket,
            capacity: slots.capacity,
            remaining: slots.remaining,
            pending,
            confirmed,
        });
    }

    Ok(ConfirmationListResponse {
        event_id: roster.event.event_id,
        name: roster.event.name.clone(),
        slug: roster.event.slug.clone(),
        kind: roster.event.kind.clone(),
        buckets,
    })
}

async fn label_map(pool: &PgPool, roster: &EventRoster) -> Result<HashMap<Uuid, String>> {
    let mut ids: Vec<Uuid> = Vec::new();
    ids.extend(roster.solo.iter().filter_map(|r| r.entrant_id));
    ids.extend(roster.teams.iter().map(|r| r.registered_by));
    ids.extend(roster.confirmed.iter().filter_map(|e| e.entrant.participant_id()));
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let participants = ParticipantRepository::new(pool).find_by_ids(&ids).await?;
    Ok(participants
        .into_iter()
        .map(|p| (p.participant_id, p.display_id()))
        .collect())
}
