use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::event::CreateEventRequest;
use crate::error::{Result, StorageError};
use crate::models::{Event, EventStatus, PointsSchedule, SlotPool};

pub const EVENT_COLUMNS: &str = "event_id, name, slug, kind, status, deleted, \
     registration_points, first_points, second_points, third_points, \
     qualification_points, npr_points, npq_points, created_at";

/// Repository for event catalog operations
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE NOT deleted ORDER BY created_at"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1 AND NOT deleted"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1 AND NOT deleted"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Create the event row and its slot rows in one transaction.
    pub async fn create(&self, req: &CreateEventRequest, pool_shape: &SlotPool) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, slug, kind, registration_points, first_points, \
                 second_points, third_points, qualification_points, npr_points, npq_points) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.slug)
        .bind(req.kind.as_str())
        .bind(req.points.registration)
        .bind(req.points.first)
        .bind(req.points.second)
        .bind(req.points.third)
        .bind(req.points.qualification)
        .bind(req.points.npr)
        .bind(req.points.npq)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::ConstraintViolation("Slug already exists".to_string())
            } else {
                err
            }
        })?;

        match pool_shape {
            SlotPool::Scalar { slots } => {
                sqlx::query(
                    "INSERT INTO event_slots (event_id, bucket, capacity, remaining) \
                     VALUES ($1, NULL, $2, $3)",
                )
                .bind(event.event_id)
                .bind(slots.capacity as i32)
                .bind(slots.remaining as i32)
                .execute(&mut *tx)
                .await?;
            }
            SlotPool::Categorical { buckets } => {
                for (name, slots) in buckets {
                    sqlx::query(
                        "INSERT INTO event_slots (event_id, bucket, capacity, remaining) \
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(event.event_id)
                    .bind(name)
                    .bind(slots.capacity as i32)
                    .bind(slots.remaining as i32)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(event)
    }

    pub async fn load_slots(&self, event_id: Uuid) -> Result<SlotPool> {
        let rows = sqlx::query_as::<_, (Option<String>, i32, i32)>(
            "SELECT bucket, capacity, remaining FROM event_slots \
             WHERE event_id = $1 ORDER BY bucket",
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        slot_pool_from_rows(rows)
    }

    pub async fn update(&self, id: Uuid, name: &str, points: &PointsSchedule) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET name = $2, registration_points = $3, first_points = $4, \
                 second_points = $5, third_points = $6, qualification_points = $7, \
                 npr_points = $8, npq_points = $9 \
             WHERE event_id = $1 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(points.registration)
        .bind(points.first)
        .bind(points.second)
        .bind(points.third)
        .bind(points.qualification)
        .bind(points.npr)
        .bind(points.npq)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn set_status(&self, id: Uuid, status: EventStatus) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET status = $2 WHERE event_id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let result =
            sqlx::query("UPDATE events SET deleted = TRUE WHERE event_id = $1 AND NOT deleted")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

/// Rebuild the typed pool from slot rows: a single unnamed row is a scalar
/// pool, named rows form the categorical buckets.
pub fn slot_pool_from_rows(rows: Vec<(Option<String>, i32, i32)>) -> Result<SlotPool> {
    use crate::models::SlotBucket;
    use std::collections::BTreeMap;

    if rows.is_empty() {
        return Err(StorageError::ConstraintViolation(
            "Event has no slot pool".to_string(),
        ));
    }

    if rows.len() == 1 && rows[0].0.is_none() {
        let (_, capacity, remaining) = rows[0];
        return Ok(SlotPool::Scalar {
            slots: SlotBucket {
                capacity: capacity as u32,
                remaining: remaining as u32,
            },
        });
    }

    let mut buckets = BTreeMap::new();
    for (bucket, capacity, remaining) in rows {
        let name = bucket.ok_or_else(|| {
            StorageError::ConstraintViolation("Mixed scalar and categorical slot rows".to_string())
        })?;
        buckets.insert(
            name,
            SlotBucket {
                capacity: capacity as u32,
                remaining: remaining as u32,
            },
        );
    }
    Ok(SlotPool::Categorical { buckets })
}
