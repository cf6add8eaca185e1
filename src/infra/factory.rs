use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::volunteer::VolunteerRoster;
use crate::domain::ports::{DocumentStore, EmailService, VerificationGate};
use crate::domain::services::{
    auth_service::AuthService, booking_service::BookingService, calendar::PeriodConfig,
    notification_service::NotificationService, origin_gate::OriginGate, youth_service::YouthService,
};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::verification::recaptcha_verifier::RecaptchaVerifier;
use crate::infra::rate_limiter::RateLimiter;
use crate::infra::repositories::{
    document_booking_repo::DocumentBookingRepo, document_youth_repo::DocumentYouthRepo,
    postgres_document_store::PostgresDocumentStore, sqlite_document_store::SqliteDocumentStore,
};

/// Collaborators that differ between production and tests.
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub roster: VolunteerRoster,
    pub verifier: Arc<dyn VerificationGate>,
    pub email_service: Arc<dyn EmailService>,
    pub templates: Arc<Tera>,
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let store = connect_store(&config.database_url).await?;

    let roster_json = tokio::fs::read_to_string(&config.roster_path).await
        .map_err(|e| AppError::InternalWithMsg(format!("Cannot read roster {}: {}", config.roster_path, e)))?;
    let roster = VolunteerRoster::from_json(&roster_json)?;
    info!(volunteers = roster.volunteers.len(), path = %config.roster_path, "Volunteer roster loaded");

    let mut tera = Tera::default();
    tera.add_raw_template("confirmation.html", include_str!("../../templates/confirmation.html"))
        .map_err(|e| AppError::InternalWithMsg(format!("Confirmation template: {:?}", e)))?;
    tera.add_raw_template("reminder.html", include_str!("../../templates/reminder.html"))
        .map_err(|e| AppError::InternalWithMsg(format!("Reminder template: {:?}", e)))?;

    let collaborators = Collaborators {
        store,
        roster,
        verifier: Arc::new(RecaptchaVerifier::new(
            config.recaptcha_secret.clone(),
            config.recaptcha_v3_secret.clone(),
        )),
        email_service: Arc::new(HttpEmailService::new(
            config.mail_service_url.clone(),
            config.mail_service_token.clone(),
        )),
        templates: Arc::new(tera),
    };

    build_state(config, collaborators)
}

/// Wires services on top of the given collaborators.
pub fn build_state(config: &Config, collaborators: Collaborators) -> Result<AppState, AppError> {
    let period = PeriodConfig::new(config.period_start, config.capacity_cutover, config.period_end)?;
    let roster = Arc::new(collaborators.roster);

    let booking_repo = Arc::new(DocumentBookingRepo::new(collaborators.store.clone()));
    let youth_repo = Arc::new(DocumentYouthRepo::new(collaborators.store.clone()));

    let origin_gate = OriginGate::new(config.allowed_origins.clone());
    if !origin_gate.is_enabled() {
        warn!("ALLOWED_ORIGINS is empty; origin checks are disabled");
    }

    Ok(AppState {
        config: config.clone(),
        booking_service: Arc::new(BookingService::new(booking_repo, youth_repo.clone(), roster, period)),
        youth_service: Arc::new(YouthService::new(youth_repo, period)),
        auth_service: Arc::new(AuthService::new(config)),
        notification_service: Arc::new(NotificationService::new(
            collaborators.email_service,
            collaborators.templates,
            config.timezone,
        )),
        verifier: collaborators.verifier,
        origin_gate: Arc::new(origin_gate),
        rate_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
    })
}

pub async fn connect_store(database_url: &str) -> Result<Arc<dyn DocumentStore>, AppError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts = PgConnectOptions::from_str(database_url)?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;
        Ok(Arc::new(PostgresDocumentStore::new(pool)))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;
        Ok(Arc::new(SqliteDocumentStore::new(pool)))
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Postgres migrations failed: {}", e)))
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("SQLite migrations failed: {}", e)))
}
