use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Participant, ParticipantKind};

/// Request payload for creating a sponsored (cc) or direct (ncp) account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateParticipantRequest {
    #[serde(default = "default_kind")]
    pub kind: ParticipantKind,

    #[validate(length(
        min = 1,
        max = 64,
        message = "External ID must be between 1 and 64 characters"
    ))]
    pub external_id: String,

    #[validate(length(min = 1, max = 255))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255))]
    pub last_name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub phone_number: Option<String>,
}

fn default_kind() -> ParticipantKind {
    ParticipantKind::Ncp
}

impl CreateParticipantRequest {
    /// Intake only creates account kinds; walk-ins and sub-participants
    /// come in through their own flows.
    pub fn validate_kind(&self) -> Result<(), &'static str> {
        match self.kind {
            ParticipantKind::Cc | ParticipantKind::Ncp => Ok(()),
            _ => Err("Only cc and ncp accounts can be created directly"),
        }
    }
}

/// Identity payload used for sub-participants, walk-ins and substitution
/// targets.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MemberIdentity {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255))]
    pub last_name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub phone_number: Option<String>,

    /// Opaque reference returned by the document-upload collaborator.
    #[validate(length(min = 1, max = 512))]
    pub document_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationDecision {
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyParticipantRequest {
    pub decision: VerificationDecision,
}

/// Response containing participant details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub participant_id: Uuid,
    pub kind: String,
    pub external_id: Option<String>,
    pub owner_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub points: i32,
    pub verified: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            participant_id: p.participant_id,
            kind: p.kind,
            external_id: p.external_id,
            owner_id: p.owner_id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone_number: p.phone_number,
            points: p.points,
            verified: p.verified,
            created_at: p.created_at,
        }
    }
}
