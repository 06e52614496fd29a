use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::participant::MemberIdentity;

/// Admin request to confirm a registered participant into a slot.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConfirmRequest {
    #[validate(length(min = 1, max = 64))]
    pub external_id: String,

    /// Required for categorical events, absent for scalar ones.
    #[validate(length(min = 1, max = 64))]
    pub bucket: Option<String>,
}

/// Admin request to admit an on-the-spot participant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct WalkInRequest {
    #[validate(length(min = 1, max = 64))]
    pub otse_id: String,

    #[validate(nested)]
    pub identity: MemberIdentity,

    #[validate(length(min = 1, max = 64))]
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReplaceRequest {
    #[validate(length(min = 1, max = 64))]
    pub departing_external_id: String,

    #[validate(length(min = 1, max = 64))]
    pub arriving_external_id: String,

    #[validate(length(min = 1, max = 64))]
    pub bucket: Option<String>,
}

/// Substitution of one solo entrant of a sponsored account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubstituteSoloRequest {
    #[validate(length(min = 1, max = 64))]
    pub cc_id: String,

    /// True to resolve a placeholder, false to swap out a real
    /// sub-participant named by `departing_identity`.
    pub is_dummy: bool,

    #[validate(nested)]
    pub new_identity: MemberIdentity,

    #[validate(nested)]
    pub departing_identity: Option<MemberIdentity>,
}

/// Per-member substitution across a team's two roster lists.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubstituteTeamRequest {
    #[validate(length(min = 1, max = 64))]
    pub cc_id: String,

    #[serde(default)]
    pub team_members: Vec<MemberIdentity>,

    #[serde(default)]
    pub npa_members: Vec<MemberIdentity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    First,
    Second,
    Third,
    Qualification,
    NpqPenalty,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AwardPointsRequest {
    #[validate(length(min = 1, max = 64))]
    pub external_id: String,

    pub award: AwardKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationResponse {
    pub event_id: Uuid,
    pub participant_id: Uuid,
    pub external_id: Option<String>,
    pub bucket: Option<String>,
    pub remaining: u32,
    pub points_credited: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplacementResponse {
    pub event_id: Uuid,
    pub bucket: Option<String>,
    pub departing_id: Uuid,
    pub arriving_id: Uuid,
    pub npr_debited: i32,
    pub registration_credited: i32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubstitutionResponse {
    pub event_id: Uuid,
    pub sub_participant_id: Uuid,
    pub substituted: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamSubstitutionResponse {
    pub event_id: Uuid,
    pub substituted: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AwardResponse {
    pub participant_id: Uuid,
    pub delta: i32,
    pub points: i32,
}

/// A single entry in the confirmation listing, with placeholder refs
/// collapsed to a display label.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntrantLabel {
    pub label: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BucketListing {
    pub bucket: Option<String>,
    pub capacity: u32,
    pub remaining: u32,
    pub pending: Vec<EntrantLabel>,
    pub confirmed: Vec<EntrantLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationListResponse {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub buckets: Vec<BucketListing>,
}
