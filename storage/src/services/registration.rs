use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::registration::{
    EntrantSpec, RegisterSoloRequest, RegisterTeamRequest, RegistrationResponse, TeamMemberSpec,
};
use crate::error::{Result, StorageError};
use crate::models::{EventKind, EventStatus, Participant, ParticipantKind, ParticipantRef};
use crate::repository::event::EventRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::registration::RegistrationRepository;
use crate::services::substitution::find_or_create_sub;

async fn open_event(pool: &PgPool, event_id: Uuid, kind: EventKind) -> Result<()> {
    let events = EventRepository::new(pool);
    let event = events.find_by_id(event_id).await?;
    if event.kind()? != kind {
        return Err(StorageError::invalid(format!(
            "Event is not a {} event",
            kind.as_str()
        )));
    }
    if event.status()? != EventStatus::Upcoming {
        return Err(StorageError::invalid("Registration is closed for this event"));
    }
    Ok(())
}

fn ensure_not_rejected(registrant: &Participant) -> Result<()> {
    if registrant.verified == "rejected" {
        return Err(StorageError::Forbidden);
    }
    Ok(())
}

async fn resolve_members(
    participants: &ParticipantRepository<'_>,
    registrant: &Participant,
    specs: &[TeamMemberSpec],
    next_ordinal: &mut i32,
) -> Result<Vec<ParticipantRef>> {
    let mut refs = Vec::with_capacity(specs.len());
    for spec in specs {
        match spec {
            TeamMemberSpec::Sub { identity } => {
                let sub =
                    find_or_create_sub(participants, registrant.participant_id, identity).await?;
                refs.push(ParticipantRef::resolved(sub.participant_id));
            }
            TeamMemberSpec::Placeholder => {
                if registrant.kind()? != ParticipantKind::Cc {
                    return Err(StorageError::Forbidden);
                }
                refs.push(ParticipantRef::placeholder(
                    registrant.participant_id,
                    *next_ordinal,
                ));
                *next_ordinal += 1;
            }
        }
    }
    Ok(refs)
}

/// Register an entrant for a solo event: the account itself, a named
/// sub-participant of a sponsored account, or a placeholder to be
/// substituted later. Creates the waitlist entry only; slots move at
/// confirmation time.
pub async fn register_solo(
    pool: &PgPool,
    event_id: Uuid,
    req: &RegisterSoloRequest,
) -> Result<RegistrationResponse> {
    open_event(pool, event_id, EventKind::Solo).await?;

    let events = EventRepository::new(pool);
    let slots = events.load_slots(event_id).await?;
    let bucket = req.bucket.as_deref();
    slots.bucket(bucket)?;

    let participants = ParticipantRepository::new(pool);
    let registrant = participants.resolve_external_id(&req.external_id).await?;
    ensure_not_rejected(&registrant)?;

    let registrations = RegistrationRepository::new(pool);
    let entrant = match &req.entrant {
        EntrantSpec::Myself => ParticipantRef::resolved(registrant.participant_id),
        EntrantSpec::Sub { identity } => {
            if registrant.kind()? != ParticipantKind::Cc {
                return Err(StorageError::Forbidden);
            }
            let sub = find_or_create_sub(&participants, registrant.participant_id, identity).await?;
            ParticipantRef::resolved(sub.participant_id)
        }
        EntrantSpec::Placeholder => {
            if registrant.kind()? != ParticipantKind::Cc {
                return Err(StorageError::Forbidden);
            }
            let ordinal = registrations
                .next_placeholder_ordinal(event_id, registrant.participant_id)
                .await?;
            ParticipantRef::placeholder(registrant.participant_id, ordinal)
        }
    };

    if registrations.solo_exists(event_id, &entrant, bucket).await? {
        return Err(StorageError::invalid("Already registered for this event"));
    }

    let registration = registrations
        .insert_solo(event_id, registrant.participant_id, &entrant, bucket)
        .await?;

    tracing::info!(
        registrant = %registrant.display_id(),
        %event_id,
        ?bucket,
        "Solo registration created"
    );

    Ok(RegistrationResponse {
        registration_id: registration.registration_id,
        event_id,
        registered_by: registrant.participant_id,
        bucket: registration.bucket,
        confirmed: registration.confirmed,
    })
}

/// Register a team with its member and NPA rosters. Placeholder positions
/// are reserved for sponsored accounts, which resolve them later through
/// substitution.
pub async fn register_team(
    pool: &PgPool,
    event_id: Uuid,
    req: &RegisterTeamRequest,
) -> Result<RegistrationResponse> {
    open_event(pool, event_id, EventKind::Team).await?;

    let participants = ParticipantRepository::new(pool);
    let registrant = participants.resolve_external_id(&req.external_id).await?;
    ensure_not_rejected(&registrant)?;

    let registrations = RegistrationRepository::new(pool);
    if registrations.team_name_exists(event_id, &req.team_name).await? {
        return Err(StorageError::invalid("Team name already taken for this event"));
    }

    let mut next_ordinal = registrations
        .next_placeholder_ordinal(event_id, registrant.participant_id)
        .await?;
    let team_members =
        resolve_members(&participants, &registrant, &req.team_members, &mut next_ordinal).await?;
    let npa_members =
        resolve_members(&participants, &registrant, &req.npa_members, &mut next_ordinal).await?;
    RegistrationRepository::ensure_nonempty_roster(&team_members)?;

    let registration = registrations
        .insert_team(
            event_id,
            registrant.participant_id,
            &req.team_name,
            &team_members,
            &npa_members,
        )
        .await?;

    tracing::info!(
        registrant = %registrant.display_id(),
        %event_id,
        team = %req.team_name,
        "Team registration created"
    );

    Ok(RegistrationResponse {
        registration_id: registration.registration_id,
        event_id,
        registered_by: registrant.participant_id,
        bucket: None,
        confirmed: registration.confirmed,
    })
}
