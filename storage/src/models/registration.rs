use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ParticipantRef;

/// A solo-event registration entry. Rows are created at registration time
/// and never deleted; the allocator only flips `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SoloRegistration {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub registered_by: Uuid,
    pub entrant_id: Option<Uuid>,
    pub placeholder_ordinal: Option<i32>,
    pub bucket: Option<String>,
    pub confirmed: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl SoloRegistration {
    pub fn entrant(&self) -> ParticipantRef {
        match self.entrant_id {
            Some(id) => ParticipantRef::resolved(id),
            None => ParticipantRef::placeholder(
                self.registered_by,
                self.placeholder_ordinal.unwrap_or_default(),
            ),
        }
    }

    pub fn set_entrant(&mut self, re: ParticipantRef) {
        match re {
            ParticipantRef::Resolved { id } => {
                self.entrant_id = Some(id);
                self.placeholder_ordinal = None;
            }
            ParticipantRef::Placeholder { ordinal, .. } => {
                self.entrant_id = None;
                self.placeholder_ordinal = Some(ordinal);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamRegistration {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub registered_by: Uuid,
    pub team_name: String,
    pub confirmed: bool,
    pub created_at: chrono::NaiveDateTime,
}

/// Which of a team's two member lists a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamRosterKind {
    Team,
    Npa,
}

impl TeamRosterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRosterKind::Team => "team",
            TeamRosterKind::Npa => "npa",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMember {
    pub registration_id: Uuid,
    pub roster: String,
    pub position: i32,
    pub member_id: Option<Uuid>,
    pub placeholder_ordinal: Option<i32>,
}

impl TeamMember {
    pub fn member_ref(&self, owner: Uuid) -> ParticipantRef {
        match self.member_id {
            Some(id) => ParticipantRef::resolved(id),
            None => ParticipantRef::placeholder(owner, self.placeholder_ordinal.unwrap_or_default()),
        }
    }

    pub fn set_member(&mut self, re: ParticipantRef) {
        match re {
            ParticipantRef::Resolved { id } => {
                self.member_id = Some(id);
                self.placeholder_ordinal = None;
            }
            ParticipantRef::Placeholder { ordinal, .. } => {
                self.member_id = None;
                self.placeholder_ordinal = Some(ordinal);
            }
        }
    }
}
