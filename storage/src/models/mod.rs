pub mod event;
pub mod participant;
pub mod participant_ref;
pub mod registration;
pub mod roster;
pub mod slot_pool;

pub use event::{Event, EventKind, EventStatus, PointsSchedule};
pub use participant::{Participant, ParticipantKind, VerificationStatus};
pub use participant_ref::ParticipantRef;
pub use registration::{SoloRegistration, TeamMember, TeamRegistration, TeamRosterKind};
pub use roster::{Confirmation, ConfirmedEntry, EventRoster, Release};
pub use slot_pool::{SlotBucket, SlotPool};
