use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A reference to an entrant in a registration or confirmed set.
///
/// A `Placeholder` stands in for a participant whose real identity is not
/// yet known. It occupies a slot and a registration-list position like any
/// other entrant, but carries no verifiable identity until substitution
/// rewrites it to a `Resolved` reference. The `ordinal` distinguishes
/// several placeholders held by the same owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantRef {
    Resolved { id: Uuid },
    Placeholder { owner: Uuid, ordinal: i32 },
}

impl ParticipantRef {
    pub fn resolved(id: Uuid) -> Self {
        ParticipantRef::Resolved { id }
    }

    pub fn placeholder(owner: Uuid, ordinal: i32) -> Self {
        ParticipantRef::Placeholder { owner, ordinal }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ParticipantRef::Placeholder { .. })
    }

    /// The internal participant ID, when the reference is resolved.
    pub fn participant_id(&self) -> Option<Uuid> {
        match self {
            ParticipantRef::Resolved { id } => Some(*id),
            ParticipantRef::Placeholder { .. } => None,
        }
    }

    /// True when the reference is a placeholder held by `owner`.
    pub fn is_placeholder_of(&self, owner: Uuid) -> bool {
        matches!(self, ParticipantRef::Placeholder { owner: o, .. } if *o == owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_ref_exposes_participant_id() {
        let id = Uuid::new_v4();
        let re = ParticipantRef::resolved(id);
        assert_eq!(re.participant_id(), Some(id));
        assert!(!re.is_placeholder());
    }

    #[test]
    fn placeholder_ref_has_no_participant_id() {
        let owner = Uuid::new_v4();
        let re = ParticipantRef::placeholder(owner, 0);
        assert_eq!(re.participant_id(), None);
        assert!(re.is_placeholder());
        assert!(re.is_placeholder_of(owner));
        assert!(!re.is_placeholder_of(Uuid::new_v4()));
    }

    #[test]
    fn placeholders_with_distinct_ordinals_differ() {
        let owner = Uuid::new_v4();
        assert_ne!(
            ParticipantRef::placeholder(owner, 0),
            ParticipantRef::placeholder(owner, 1)
        );
    }
}
