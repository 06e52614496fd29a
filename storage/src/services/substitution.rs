use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::confirmation::{
    SubstituteSoloRequest, SubstituteTeamRequest, SubstitutionResponse, TeamSubstitutionResponse,
};
use crate::dto::participant::MemberIdentity;
use crate::error::{Result, StorageError};
use crate::models::{Participant, ParticipantKind, ParticipantRef, TeamRosterKind};
use crate::repository::participant::ParticipantRepository;
use crate::repository::roster::RosterRepository;

/// Sub-participants are matched by (owner, first name, last name, phone).
/// First creation requires the identity-document reference produced by
/// the upload collaborator.
pub(crate) async fn find_or_create_sub(
    participants: &ParticipantRepository<'_>,
    owner_id: Uuid,
    identity: &MemberIdentity,
) -> Result<Participant> {
    if let Some(existing) = participants.find_sub_by_identity(owner_id, identity).await? {
        return Ok(existing);
    }
    let document_ref = identity.document_ref.as_deref().ok_or_else(|| {
        StorageError::invalid("Identity documents are required for a new sub-participant")
    })?;
    participants.create_sub(owner_id, identity, document_ref).await
}

async fn resolve_owner(participants: &ParticipantRepository<'_>, cc_id: &str) -> Result<Participant> {
    let owner = participants.resolve_external_id(cc_id).await?;
    if owner.kind()? != ParticipantKind::Cc {
        return Err(StorageError::Forbidden);
    }
    Ok(owner)
}

/// Resolve one solo entrant of a sponsored account to a new identity.
///
/// The placeholder path fills the owner's first outstanding placeholder;
/// the real-identity path swaps out the sub-participant named by the
/// departing identity. Both rewrite the registration row and the
/// confirmed set to the same resolved ID; slot counts and points are
/// untouched.
pub async fn substitute_solo(
    pool: &PgPool,
    event_id: Uuid,
    req: &SubstituteSoloRequest,
) -> Result<SubstitutionResponse> {
    let participants = ParticipantRepository::new(pool);
    let owner = resolve_owner(&participants, &req.cc_id).await?;

    let departing_ref = if req.is_dummy {
        None
    } else {
        let departing_identity = req.departing_identity.as_ref().ok_or_else(|| {
            StorageError::invalid("departing_identity is required when is_dummy is false")
        })?;
        let departing = participants
            .find_sub_by_identity(owner.participant_id, departing_identity)
            .await?
            .ok_or(StorageError::NotFound)?;
        Some(ParticipantRef::resolved(departing.participant_id))
    };

    let sub = find_or_create_sub(&participants, owner.participant_id, &req.new_identity).await?;

    let mut tx = pool.begin().await?;
    let substituted = {
        let mut repo = RosterRepository::new(&mut tx);
        let mut roster = repo.load_for_update(event_id).await?;

        let from = match departing_ref {
            Some(re) => re,
            None => roster
                .first_solo_placeholder(owner.participant_id)
                .ok_or(StorageError::NotFound)?,
        };

        let substituted =
            roster.substitute_solo(owner.participant_id, &from, sub.participant_id)?;
        repo.rewrite_solo_entrant(event_id, owner.participant_id, &from, sub.participant_id)
            .await?;
        repo.rewrite_confirmed_entrant(event_id, &from, sub.participant_id)
            .await?;
        substituted
    };
    tx.commit().await?;

    tracing::info!(
        owner = %owner.display_id(),
        %event_id,
        sub = %sub.participant_id,
        substituted,
        "Solo substitution applied"
    );

    Ok(SubstitutionResponse {
        event_id,
        sub_participant_id: sub.participant_id,
        substituted: substituted as u32,
    })
}

/// Fill a team's outstanding placeholder positions with real identities,
/// independently across the member and NPA rosters. Fails when there was
/// nothing to substitute.
pub async fn substitute_team(
    pool: &PgPool,
    event_id: Uuid,
    req: &SubstituteTeamRequest,
) -> Result<TeamSubstitutionResponse> {
    let participants = ParticipantRepository::new(pool);
    let owner = resolve_owner(&participants, &req.cc_id).await?;

    let mut tx = pool.begin().await?;
    let substituted = {
        let mut repo = RosterRepository::new(&mut tx);
        let mut roster = repo.load_for_update(event_id).await?;
        let mut substituted = 0u32;

        for (roster_kind, identities) in [
            (TeamRosterKind::Team, &req.team_members),
            (TeamRosterKind::Npa, &req.npa_members),
        ] {
            for identity in identities {
                let Some((registration_id, position)) =
                    roster.first_team_placeholder(owner.participant_id, roster_kind)
                else {
                    // This roster list has no placeholders left; surplus
                    // identities are ignored rather than misplaced.
                    break;
                };
                let sub =
                    find_or_create_sub(&participants, owner.participant_id, identity).await?;
                roster.fill_team_position(
                    registration_id,
                    roster_kind,
                    position,
                    sub.participant_id,
                )?;
                repo.fill_team_member(registration_id, roster_kind, position, sub.participant_id)
                    .await?;
                substituted += 1;
            }
        }

        if substituted == 0 {
            return Err(StorageError::invalid(
                "No placeholder positions were substituted",
            ));
        }
        substituted
    };
    tx.commit().await?;

    tracing::info!(
        owner = %owner.display_id(),
        %event_id,
        substituted,
        "Team substitution applied"
    );

    Ok(TeamSubstitutionResponse {
        event_id,
        substituted,
    })
}
