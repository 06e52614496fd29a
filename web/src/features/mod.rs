pub mod confirmations;
pub mod events;
pub mod participants;
pub mod registrations;
