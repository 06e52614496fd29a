use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Event, EventKind, PointsSchedule, SlotPool};

/// Slot shape of a new event, fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SlotSpec {
    Scalar { capacity: u32 },
    Categorical { buckets: BTreeMap<String, u32> },
}

impl SlotSpec {
    pub fn validate_shape(&self) -> Result<(), &'static str> {
        match self {
            SlotSpec::Scalar { .. } => Ok(()),
            SlotSpec::Categorical { buckets } => {
                if buckets.is_empty() {
                    return Err("Categorical events need at least one bucket");
                }
                if buckets.keys().any(|k| k.is_empty() || k.len() > 64) {
                    return Err("Bucket names must be between 1 and 64 characters");
                }
                Ok(())
            }
        }
    }

    pub fn into_pool(self) -> SlotPool {
        match self {
            SlotSpec::Scalar { capacity } => SlotPool::scalar(capacity),
            SlotSpec::Categorical { buckets } => SlotPool::categorical(buckets),
        }
    }
}

fn default_points() -> PointsSchedule {
    PointsSchedule {
        registration: 0,
        first: 0,
        second: 0,
        third: 0,
        qualification: 0,
        npr: 0,
        npq: 0,
    }
}

/// Request payload for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Slug must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    pub kind: EventKind,

    pub slots: SlotSpec,

    #[serde(default = "default_points")]
    pub points: PointsSchedule,
}

/// Request payload for updating an event while it is still upcoming
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub points: Option<PointsSchedule>,
}

/// Request payload for advancing an event's status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventStatusRequest {
    pub status: crate::models::EventStatus,
}

/// Response containing event details and the current slot pool
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub status: String,
    pub points: PointsSchedule,
    pub slots: SlotPool,
    pub created_at: chrono::NaiveDateTime,
}

impl EventResponse {
    pub fn from_parts(event: Event, slots: SlotPool) -> Self {
        Self {
            event_id: event.event_id,
            name: event.name.clone(),
            slug: event.slug.clone(),
            kind: event.kind.clone(),
            status: event.status.clone(),
            points: event.points(),
            slots,
            created_at: event.created_at,
        }
    }
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    let is_valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--");

    if is_valid {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_slug"))
    }
}
