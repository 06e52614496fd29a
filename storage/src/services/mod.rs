pub mod allocation;
pub mod listing;
pub mod notifier;
pub mod points;
pub mod registration;
pub mod replacement;
pub mod substitution;
pub mod verification;
