use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::participant::{CreateParticipantRequest, MemberIdentity};
use crate::error::{Result, StorageError};
use crate::models::{Participant, ParticipantKind, VerificationStatus};

const PARTICIPANT_COLUMNS: &str = "participant_id, kind, external_id, owner_id, first_name, \
     last_name, email, phone_number, document_ref, points, verified, locked, deleted, created_at";

/// Repository for participant directory operations
pub struct ParticipantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE NOT deleted ORDER BY created_at"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Participant> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE participant_id = $1 AND NOT deleted"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_external_id(
        &self,
        kind: ParticipantKind,
        external_id: &str,
    ) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE kind = $1 AND external_id = $2 AND NOT deleted"
        ))
        .bind(kind.as_str())
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(participant)
    }

    /// Resolve an admin-supplied external ID: direct (ncp) lookup first,
    /// then sponsored (cc).
    pub async fn resolve_external_id(&self, external_id: &str) -> Result<Participant> {
        if let Some(p) = self
            .find_by_external_id(ParticipantKind::Ncp, external_id)
            .await?
        {
            return Ok(p);
        }
        self.find_by_external_id(ParticipantKind::Cc, external_id)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Fetch several participants at once, for listing projections.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE participant_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn create(&self, req: &CreateParticipantRequest) -> Result<Participant> {
        sqlx::query_as::<_, Participant>(&format!(
            "INSERT INTO participants (kind, external_id, first_name, last_name, email, phone_number) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(req.kind.as_str())
        .bind(&req.external_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.email)
        .bind(&req.phone_number)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::ConstraintViolation("External ID already exists".to_string())
            } else {
                err
            }
        })
    }

    /// Create-or-find an on-the-spot participant by its otseId.
    pub async fn find_or_create_walk_in(
        &self,
        external_id: &str,
        identity: &MemberIdentity,
    ) -> Result<Participant> {
        if let Some(p) = self
            .find_by_external_id(ParticipantKind::Otse, external_id)
            .await?
        {
            return Ok(p);
        }

        let participant = sqlx::query_as::<_, Participant>(&format!(
            "INSERT INTO participants (kind, external_id, first_name, last_name, email, phone_number) \
             VALUES ('otse', $1, $2, $3, $4, $5) \
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(external_id)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.email)
        .bind(&identity.phone_number)
        .fetch_one(self.pool)
        .await?;

        Ok(participant)
    }

    /// Sub-participants are matched by the (owner, first name, last name,
    /// phone number) quadruple.
    pub async fn find_sub_by_identity(
        &self,
        owner_id: Uuid,
        identity: &MemberIdentity,
    ) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE kind = 'through_cc' AND owner_id = $1 \
               AND first_name = $2 AND last_name = $3 AND phone_number = $4 \
               AND NOT deleted"
        ))
        .bind(owner_id)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.phone_number)
        .fetch_optional(self.pool)
        .await?;

        Ok(participant)
    }

    pub async fn create_sub(
        &self,
        owner_id: Uuid,
        identity: &MemberIdentity,
        document_ref: &str,
    ) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "INSERT INTO participants \
                 (kind, owner_id, first_name, last_name, email, phone_number, document_ref) \
             VALUES ('through_cc', $1, $2, $3, $4, $5, $6) \
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.email)
        .bind(&identity.phone_number)
        .bind(document_ref)
        .fetch_one(self.pool)
        .await?;

        Ok(participant)
    }

    /// Acquire the verification lock with a single conditional update, so
    /// two admins can never both hold it.
    pub async fn try_lock(&self, id: Uuid) -> Result<Participant> {
        let locked = sqlx::query_as::<_, Participant>(&format!(
            "UPDATE participants SET locked = TRUE \
             WHERE participant_id = $1 AND NOT locked AND NOT deleted \
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match locked {
            Some(p) => Ok(p),
            None => {
                // Distinguish a held lock from a missing record.
                self.find_by_id(id).await?;
                Err(StorageError::Locked)
            }
        }
    }

    pub async fn unlock(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE participants SET locked = FALSE WHERE participant_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Apply the verification decision and drop the lock in one statement.
    pub async fn finish_verification(
        &self,
        id: Uuid,
        decision: VerificationStatus,
    ) -> Result<Participant> {
        sqlx::query_as::<_, Participant>(&format!(
            "UPDATE participants SET verified = $2, locked = FALSE \
             WHERE participant_id = $1 \
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(id)
        .bind(decision.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE participants SET deleted = TRUE WHERE participant_id = $1 AND NOT deleted",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

/// Ledger write, transaction-scoped: allocation and point awards always
/// adjust points inside the same transaction as the state they pay for.
pub async fn adjust_points(conn: &mut PgConnection, participant_id: Uuid, delta: i32) -> Result<()> {
    sqlx::query("UPDATE participants SET points = points + $2 WHERE participant_id = $1")
        .bind(participant_id)
        .bind(delta)
        .execute(conn)
        .await?;
    Ok(())
}
