use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::participants::handlers::list_participants,
        features::participants::handlers::get_participant,
        features::participants::handlers::create_participant,
        features::participants::handlers::verify_participant,
        features::participants::handlers::delete_participant,
        features::events::handlers::list_events,
        features::events::handlers::get_event,
        features::events::handlers::create_event,
        features::events::handlers::update_event,
        features::events::handlers::update_event_status,
        features::events::handlers::delete_event,
        features::registrations::handlers::register_solo,
        features::registrations::handlers::register_team,
        features::confirmations::handlers::list_confirmations,
        features::confirmations::handlers::confirm,
        features::confirmations::handlers::admit_walk_in,
        features::confirmations::handlers::replace,
        features::confirmations::handlers::substitute_solo,
        features::confirmations::handlers::substitute_team,
        features::confirmations::handlers::award_points,
    ),
    components(
        schemas(
            storage::dto::participant::CreateParticipantRequest,
            storage::dto::participant::VerifyParticipantRequest,
            storage::dto::participant::VerificationDecision,
            storage::dto::participant::ParticipantResponse,
            storage::dto::participant::MemberIdentity,
            storage::dto::event::CreateEventRequest,
            storage::dto::event::UpdateEventRequest,
            storage::dto::event::UpdateEventStatusRequest,
            storage::dto::event::EventResponse,
            storage::dto::event::SlotSpec,
            storage::dto::registration::RegisterSoloRequest,
            storage::dto::registration::RegisterTeamRequest,
            storage::dto::registration::RegistrationResponse,
            storage::dto::registration::EntrantSpec,
            storage::dto::registration::TeamMemberSpec,
            storage::dto::confirmation::ConfirmRequest,
            storage::dto::confirmation::WalkInRequest,
            storage::dto::confirmation::ReplaceRequest,
            storage::dto::confirmation::SubstituteSoloRequest,
            storage::dto::confirmation::SubstituteTeamRequest,
            storage::dto::confirmation::AwardPointsRequest,
            storage::dto::confirmation::AwardKind,
            storage::dto::confirmation::ConfirmationResponse,
            storage::dto::confirmation::ReplacementResponse,
            storage::dto::confirmation::SubstitutionResponse,
            storage::dto::confirmation::TeamSubstitutionResponse,
            storage::dto::confirmation::AwardResponse,
            storage::dto::confirmation::ConfirmationListResponse,
            storage::dto::confirmation::BucketListing,
            storage::dto::confirmation::EntrantLabel,
            storage::models::Participant,
            storage::models::ParticipantKind,
            storage::models::VerificationStatus,
            storage::models::ParticipantRef,
            storage::models::Event,
            storage::models::EventKind,
            storage::models::EventStatus,
            storage::models::PointsSchedule,
            storage::models::SlotPool,
            storage::models::SlotBucket,
        )
    ),
    tags(
        (name = "participants", description = "Participant directory endpoints"),
        (name = "events", description = "Event catalog endpoints"),
        (name = "registrations", description = "Registration intake endpoints"),
        (name = "confirmations", description = "Admin confirmation and allocation endpoints"),
        (name = "substitutions", description = "Placeholder and identity substitution endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting festival registration API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let notifier = config
        .mail_notifier()
        .context("Failed to configure mail notifier")?;
    tracing::info!(
        mode = ?config.replacement_mode,
        mail = config.smtp.is_some(),
        "Allocation services configured"
    );

    let state = AppState {
        db,
        notifier,
        replacement_mode: config.replacement_mode,
    };
    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    let openapi = ApiDoc::openapi();

    let event_routes = features::events::routes::routes(api_keys.clone())
        .merge(features::registrations::routes::routes())
        .merge(features::confirmations::routes::routes(api_keys.clone()));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .nest(
            "/api/participants",
            features::participants::routes::routes(api_keys),
        )
        .nest("/api/events", event_routes)
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app).await?;

    Ok(())
}
