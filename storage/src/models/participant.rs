use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// The four participant kinds. `Cc` accounts belong to a sponsoring college
/// contingent and may register further sub-participants (`ThroughCc`);
/// `Ncp` accounts register directly; `Otse` accounts are on-the-spot
/// walk-ins admitted straight into the confirmed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Cc,
    Ncp,
    Otse,
    ThroughCc,
}

impl ParticipantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantKind::Cc => "cc",
            ParticipantKind::Ncp => "ncp",
            ParticipantKind::Otse => "otse",
            ParticipantKind::ThroughCc => "through_cc",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "cc" => Ok(ParticipantKind::Cc),
            "ncp" => Ok(ParticipantKind::Ncp),
            "otse" => Ok(ParticipantKind::Otse),
            "through_cc" => Ok(ParticipantKind::ThroughCc),
            other => Err(StorageError::invalid(format!(
                "unknown participant kind: {other}"
            ))),
        }
    }

    /// Only sponsored and direct participants own a points ledger.
    pub fn has_ledger(&self) -> bool {
        matches!(self, ParticipantKind::Cc | ParticipantKind::Ncp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(StorageError::invalid(format!(
                "unknown verification status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub participant_id: Uuid,
    pub kind: String,
    /// Kind-scoped human-readable ID (ccId/ncpId/otseId). Sub-participants
    /// are addressed by their internal ID and carry no external one.
    pub external_id: Option<String>,
    /// Owning sponsored participant, set for `through_cc` records only.
    pub owner_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub document_ref: Option<String>,
    pub points: i32,
    pub verified: String,
    pub locked: bool,
    pub deleted: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl Participant {
    pub fn kind(&self) -> Result<ParticipantKind> {
        ParticipantKind::parse(&self.kind)
    }

    pub fn verification(&self) -> Result<VerificationStatus> {
        VerificationStatus::parse(&self.verified)
    }

    pub fn has_ledger(&self) -> bool {
        self.kind().map(|k| k.has_ledger()).unwrap_or(false)
    }

    /// Label shown in listings: external ID when present, internal ID
    /// otherwise (sub-participants).
    pub fn display_id(&self) -> String {
        self.external_id
            .clone()
            .unwrap_or_else(|| self.participant_id.to_string())
    }
}
