use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    ConfirmedEntry, Event, EventRoster, ParticipantRef, SoloRegistration, TeamMember,
    TeamRegistration, TeamRosterKind,
};
use crate::repository::event::{EVENT_COLUMNS, slot_pool_from_rows};

#[derive(Debug, FromRow)]
struct ConfirmedRow {
    entry_id: Uuid,
    event_id: Uuid,
    bucket: Option<String>,
    registration_id: Option<Uuid>,
    participant_id: Option<Uuid>,
    placeholder_owner: Option<Uuid>,
    placeholder_ordinal: Option<i32>,
}

impl ConfirmedRow {
    fn into_entry(self) -> Result<ConfirmedEntry> {
        let entrant = match (self.participant_id, self.placeholder_owner) {
            (Some(id), _) => ParticipantRef::resolved(id),
            (None, Some(owner)) => {
                ParticipantRef::placeholder(owner, self.placeholder_ordinal.unwrap_or_default())
            }
            (None, None) => {
                return Err(StorageError::ConstraintViolation(
                    "Confirmed entry without entrant".to_string(),
                ));
            }
        };
        Ok(ConfirmedEntry {
            entry_id: self.entry_id,
            event_id: self.event_id,
            bucket: self.bucket,
            registration_id: self.registration_id,
            entrant,
        })
    }
}

/// Transaction-scoped access to one event's allocation state.
///
/// `load_for_update` takes a row lock on the event, making it the
/// single-writer gate for that event's slot pool and confirmed set; every
/// slot or confirmed-set mutation must go through the same transaction.
pub struct RosterRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> RosterRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn load_for_update(&mut self, event_id: Uuid) -> Result<EventRoster> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        let slot_rows = sqlx::query_as::<_, (Option<String>, i32, i32)>(
            "SELECT bucket, capacity, remaining FROM event_slots \
             WHERE event_id = $1 ORDER BY bucket",
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let solo = sqlx::query_as::<_, SoloRegistration>(
            "SELECT registration_id, event_id, registered_by, entrant_id, \
                    placeholder_ordinal, bucket, confirmed, created_at \
             FROM solo_registrations WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let teams = sqlx::query_as::<_, TeamRegistration>(
            "SELECT registration_id, event_id, registered_by, team_name, confirmed, created_at \
             FROM team_registrations WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let team_members = sqlx::query_as::<_, TeamMember>(
            "SELECT registration_id, roster, position, member_id, placeholder_ordinal \
             FROM team_members \
             WHERE registration_id IN \
                 (SELECT registration_id FROM team_registrations WHERE event_id = $1) \
             ORDER BY registration_id, roster, position",
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let confirmed = sqlx::query_as::<_, ConfirmedRow>(
            "SELECT entry_id, event_id, bucket, registration_id, participant_id, \
                    placeholder_owner, placeholder_ordinal \
             FROM confirmed_entries WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?
        .into_iter()
        .map(ConfirmedRow::into_entry)
        .collect::<Result<Vec<_>>>()?;

        Ok(EventRoster {
            event,
            pool: slot_pool_from_rows(slot_rows)?,
            solo,
            teams,
            team_members,
            confirmed,
        })
    }

    pub async fn save_slot(
        &mut self,
        event_id: Uuid,
        bucket: Option<&str>,
        remaining: u32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE event_slots SET remaining = $3 \
             WHERE event_id = $1 AND COALESCE(bucket, '') = COALESCE($2, '')",
        )
        .bind(event_id)
        .bind(bucket)
        .bind(remaining as i32)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    pub async fn set_solo_confirmed(&mut self, registration_id: Uuid, confirmed: bool) -> Result<()> {
        sqlx::query("UPDATE solo_registrations SET confirmed = $2 WHERE registration_id = $1")
            .bind(registration_id)
            .bind(confirmed)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_team_confirmed(&mut self, registration_id: Uuid, confirmed: bool) -> Result<()> {
        sqlx::query("UPDATE team_registrations SET confirmed = $2 WHERE registration_id = $1")
            .bind(registration_id)
            .bind(confirmed)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    pub async fn insert_confirmed_entry(&mut self, entry: &ConfirmedEntry) -> Result<()> {
        let (participant_id, placeholder_owner, placeholder_ordinal) = match entry.entrant {
            ParticipantRef::Resolved { id } => (Some(id), None, None),
            ParticipantRef::Placeholder { owner, ordinal } => (None, Some(owner), Some(ordinal)),
        };

        sqlx::query(
            "INSERT INTO confirmed_entries \
                 (entry_id, event_id, bucket, registration_id, participant_id, \
                  placeholder_owner, placeholder_ordinal) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.entry_id)
        .bind(entry.event_id)
        .bind(&entry.bucket)
        .bind(entry.registration_id)
        .bind(participant_id)
        .bind(placeholder_owner)
        .bind(placeholder_ordinal)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete_confirmed_entry(&mut self, entry_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM confirmed_entries WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    /// Rewrite every solo-registration occurrence of `from` held by the
    /// owner to a resolved participant. Returns the number of rows touched.
    pub async fn rewrite_solo_entrant(
        &mut self,
        event_id: Uuid,
        owner: Uuid,
        from: &ParticipantRef,
        to: Uuid,
    ) -> Result<u64> {
        let result = match from {
            ParticipantRef::Placeholder { ordinal, .. } => {
                sqlx::query(
                    "UPDATE solo_registrations \
                     SET entrant_id = $4, placeholder_ordinal = NULL \
                     WHERE event_id = $1 AND registered_by = $2 \
                       AND entrant_id IS NULL AND placeholder_ordinal = $3",
                )
                .bind(event_id)
                .bind(owner)
                .bind(ordinal)
                .bind(to)
                .execute(&mut *self.conn)
                .await?
            }
            ParticipantRef::Resolved { id } => {
                sqlx::query(
                    "UPDATE solo_registrations SET entrant_id = $4 \
                     WHERE event_id = $1 AND registered_by = $2 AND entrant_id = $3",
                )
                .bind(event_id)
                .bind(owner)
                .bind(id)
                .bind(to)
                .execute(&mut *self.conn)
                .await?
            }
        };
        Ok(result.rows_affected())
    }

    /// Keep the confirmed set in step with a registration rewrite.
    pub async fn rewrite_confirmed_entrant(
        &mut self,
        event_id: Uuid,
        from: &ParticipantRef,
        to: Uuid,
    ) -> Result<u64> {
        let result = match from {
            ParticipantRef::Placeholder { owner, ordinal } => {
                sqlx::query(
                    "UPDATE confirmed_entries \
                     SET participant_id = $4, placeholder_owner = NULL, placeholder_ordinal = NULL \
                     WHERE event_id = $1 AND participant_id IS NULL \
                       AND placeholder_owner = $2 AND placeholder_ordinal = $3",
                )
                .bind(event_id)
                .bind(owner)
                .bind(ordinal)
                .bind(to)
                .execute(&mut *self.conn)
                .await?
            }
            ParticipantRef::Resolved { id } => {
                sqlx::query(
                    "UPDATE confirmed_entries SET participant_id = $3 \
                     WHERE event_id = $1 AND participant_id = $2",
                )
                .bind(event_id)
                .bind(id)
                .bind(to)
                .execute(&mut *self.conn)
                .await?
            }
        };
        Ok(result.rows_affected())
    }

    pub async fn fill_team_member(
        &mut self,
        registration_id: Uuid,
        roster: TeamRosterKind,
        position: i32,
        to: Uuid,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE team_members SET member_id = $4, placeholder_ordinal = NULL \
             WHERE registration_id = $1 AND roster = $2 AND position = $3",
        )
        .bind(registration_id)
        .bind(roster.as_str())
        .bind(position)
        .bind(to)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
