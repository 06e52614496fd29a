use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Solo,
    Team,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Solo => "solo",
            EventKind::Team => "team",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "solo" => Ok(EventKind::Solo),
            "team" => Ok(EventKind::Team),
            other => Err(StorageError::invalid(format!("unknown event kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            other => Err(StorageError::invalid(format!(
                "unknown event status: {other}"
            ))),
        }
    }

    /// Statuses advance in one direction only.
    pub fn next(&self) -> Option<EventStatus> {
        match self {
            EventStatus::Upcoming => Some(EventStatus::Ongoing),
            EventStatus::Ongoing => Some(EventStatus::Completed),
            EventStatus::Completed => None,
        }
    }
}

/// Per-event point schedule. `npr` is the replaced/no-show penalty charged
/// to a departing entrant; `npq` the non-qualification penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PointsSchedule {
    pub registration: i32,
    pub first: i32,
    pub second: i32,
    pub third: i32,
    pub qualification: i32,
    pub npr: i32,
    pub npq: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub status: String,
    pub deleted: bool,
    pub registration_points: i32,
    pub first_points: i32,
    pub second_points: i32,
    pub third_points: i32,
    pub qualification_points: i32,
    pub npr_points: i32,
    pub npq_points: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Event {
    pub fn kind(&self) -> Result<EventKind> {
        EventKind::parse(&self.kind)
    }

    pub fn status(&self) -> Result<EventStatus> {
        EventStatus::parse(&self.status)
    }

    pub fn points(&self) -> PointsSchedule {
        PointsSchedule {
            registration: self.registration_points,
            first: self.first_points,
            second: self.second_points,
            third: self.third_points,
            qualification: self.qualification_points,
            npr: self.npr_points,
            npq: self.npq_points,
        }
    }
}
