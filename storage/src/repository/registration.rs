use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{ParticipantRef, SoloRegistration, TeamRegistration, TeamRosterKind};

/// Repository for registration intake. Allocation-time mutations of these
/// rows go through `RosterRepository` instead.
pub struct RegistrationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Next free placeholder ordinal for an owner within an event, across
    /// both solo entries and team rosters.
    pub async fn next_placeholder_ordinal(&self, event_id: Uuid, owner: Uuid) -> Result<i32> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(ordinal) + 1, 0) FROM ( \
                 SELECT placeholder_ordinal AS ordinal FROM solo_registrations \
                 WHERE event_id = $1 AND registered_by = $2 AND placeholder_ordinal IS NOT NULL \
                 UNION ALL \
                 SELECT tm.placeholder_ordinal FROM team_members tm \
                 JOIN team_registrations tr ON tr.registration_id = tm.registration_id \
                 WHERE tr.event_id = $1 AND tr.registered_by = $2 \
                   AND tm.placeholder_ordinal IS NOT NULL \
             ) AS ordinals",
        )
        .bind(event_id)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(next)
    }

    pub async fn solo_exists(
        &self,
        event_id: Uuid,
        entrant: &ParticipantRef,
        bucket: Option<&str>,
    ) -> Result<bool> {
        let exists: Option<(Uuid,)> = match entrant {
            ParticipantRef::Resolved { id } => {
                sqlx::query_as(
                    "SELECT registration_id FROM solo_registrations \
                     WHERE event_id = $1 AND entrant_id = $2 \
                       AND COALESCE(bucket, '') = COALESCE($3, '')",
                )
                .bind(event_id)
                .bind(id)
                .bind(bucket)
                .fetch_optional(self.pool)
                .await?
            }
            ParticipantRef::Placeholder { .. } => None,
        };
        Ok(exists.is_some())
    }

    pub async fn insert_solo(
        &self,
        event_id: Uuid,
        registered_by: Uuid,
        entrant: &ParticipantRef,
        bucket: Option<&str>,
    ) -> Result<SoloRegistration> {
        let (entrant_id, placeholder_ordinal) = match entrant {
            ParticipantRef::Resolved { id } => (Some(*id), None),
            ParticipantRef::Placeholder { ordinal, .. } => (None, Some(*ordinal)),
        };

        let registration = sqlx::query_as::<_, SoloRegistration>(
            "INSERT INTO solo_registrations \
                 (event_id, registered_by, entrant_id, placeholder_ordinal, bucket) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING registration_id, event_id, registered_by, entrant_id, \
                       placeholder_ordinal, bucket, confirmed, created_at",
        )
        .bind(event_id)
        .bind(registered_by)
        .bind(entrant_id)
        .bind(placeholder_ordinal)
        .bind(bucket)
        .fetch_one(self.pool)
        .await?;

        Ok(registration)
    }

    /// Insert a team registration and its member rows in one transaction.
    pub async fn insert_team(
        &self,
        event_id: Uuid,
        registered_by: Uuid,
        team_name: &str,
        team_members: &[ParticipantRef],
        npa_members: &[ParticipantRef],
    ) -> Result<TeamRegistration> {
        let mut tx = self.pool.begin().await?;

        let registration = sqlx::query_as::<_, TeamRegistration>(
            "INSERT INTO team_registrations (event_id, registered_by, team_name) \
             VALUES ($1, $2, $3) \
             RETURNING registration_id, event_id, registered_by, team_name, confirmed, created_at",
        )
        .bind(event_id)
        .bind(registered_by)
        .bind(team_name)
        .fetch_one(&mut *tx)
        .await?;

        for (roster, members) in [
            (TeamRosterKind::Team, team_members),
            (TeamRosterKind::Npa, npa_members),
        ] {
            for (position, member) in members.iter().enumerate() {
                let (member_id, placeholder_ordinal) = match member {
                    ParticipantRef::Resolved { id } => (Some(*id), None),
                    ParticipantRef::Placeholder { ordinal, .. } => (None, Some(*ordinal)),
                };
                sqlx::query(
                    "INSERT INTO team_members \
                         (registration_id, roster, position, member_id, placeholder_ordinal) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(registration.registration_id)
                .bind(roster.as_str())
                .bind(position as i32)
                .bind(member_id)
                .bind(placeholder_ordinal)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(registration)
    }

    pub async fn team_name_exists(&self, event_id: Uuid, team_name: &str) -> Result<bool> {
        let exists: Option<(Uuid,)> = sqlx::query_as(
            "SELECT registration_id FROM team_registrations \
             WHERE event_id = $1 AND team_name = $2",
        )
        .bind(event_id)
        .bind(team_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(exists.is_some())
    }

    pub fn ensure_nonempty_roster(team_members: &[ParticipantRef]) -> Result<()> {
        if team_members.is_empty() {
            return Err(StorageError::invalid("Team needs at least one member"));
        }
        Ok(())
    }
}
