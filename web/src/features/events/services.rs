use sqlx::PgPool;
use storage::{
    dto::event::{CreateEventRequest, EventResponse, UpdateEventRequest},
    error::{Result, StorageError},
    models::EventStatus,
    repository::event::EventRepository,
};

/// List all events with their slot pools
pub async fn list_events(pool: &PgPool) -> Result<Vec<EventResponse>> {
    let repo = EventRepository::new(pool);
    let events = repo.list().await?;

    let mut response = Vec::with_capacity(events.len());
    for event in events {
        let slots = repo.load_slots(event.event_id).await?;
        response.push(EventResponse::from_parts(event, slots));
    }
    Ok(response)
}

/// Get an event by slug
pub async fn get_event(pool: &PgPool, slug: &str) -> Result<EventResponse> {
    let repo = EventRepository::new(pool);
    let event = repo.find_by_slug(slug).await?;
    let slots = repo.load_slots(event.event_id).await?;
    Ok(EventResponse::from_parts(event, slots))
}

/// Create a new event with its slot pool
pub async fn create_event(pool: &PgPool, request: &CreateEventRequest) -> Result<EventResponse> {
    let repo = EventRepository::new(pool);
    let pool_shape = request.slots.clone().into_pool();
    let event = repo.create(request, &pool_shape).await?;
    Ok(EventResponse::from_parts(event, pool_shape))
}

/// Update an event's name and point schedule. Only permitted while the
/// event is still upcoming.
pub async fn update_event(
    pool: &PgPool,
    slug: &str,
    request: &UpdateEventRequest,
) -> Result<EventResponse> {
    let repo = EventRepository::new(pool);
    let existing = repo.find_by_slug(slug).await?;
    if existing.status()? != EventStatus::Upcoming {
        return Err(StorageError::invalid(
            "Event can only be edited while upcoming",
        ));
    }

    let name = request.name.clone().unwrap_or_else(|| existing.name.clone());
    let points = request.points.unwrap_or_else(|| existing.points());
    let updated = repo.update(existing.event_id, &name, &points).await?;
    let slots = repo.load_slots(updated.event_id).await?;
    Ok(EventResponse::from_parts(updated, slots))
}

/// Advance an event's status by one step
pub async fn advance_status(
    pool: &PgPool,
    slug: &str,
    requested: EventStatus,
) -> Result<EventResponse> {
    let repo = EventRepository::new(pool);
    let existing = repo.find_by_slug(slug).await?;
    let current = existing.status()?;

    match current.next() {
        Some(next) if next == requested => {
            let updated = repo.set_status(existing.event_id, next).await?;
            let slots = repo.load_slots(updated.event_id).await?;
            Ok(EventResponse::from_parts(updated, slots))
        }
        _ => Err(StorageError::invalid(format!(
            "Cannot move event from {} to {}",
            current.as_str(),
            requested.as_str()
        ))),
    }
}

/// Soft-delete an event
pub async fn delete_event(pool: &PgPool, slug: &str) -> Result<()> {
    let repo = EventRepository::new(pool);
    let event = repo.find_by_slug(slug).await?;
    repo.soft_delete(event.event_id).await
}
