use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::participant::MemberIdentity;

/// Who a solo registration is for: the registering account itself, a named
/// sub-participant of a sponsored account, or a placeholder to be
/// substituted later.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntrantSpec {
    Myself,
    Sub { identity: MemberIdentity },
    Placeholder,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterSoloRequest {
    #[validate(length(min = 1, max = 64))]
    pub external_id: String,

    pub entrant: EntrantSpec,

    #[validate(length(min = 1, max = 64))]
    pub bucket: Option<String>,
}

/// A team roster position: a named identity or a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeamMemberSpec {
    Sub { identity: MemberIdentity },
    Placeholder,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterTeamRequest {
    #[validate(length(min = 1, max = 64))]
    pub external_id: String,

    #[validate(length(min = 1, max = 255))]
    pub team_name: String,

    pub team_members: Vec<TeamMemberSpec>,

    #[serde(default)]
    pub npa_members: Vec<TeamMemberSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub registered_by: Uuid,
    pub bucket: Option<String>,
    pub confirmed: bool,
}
