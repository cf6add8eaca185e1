use outreach_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::{build_state, run_sqlite_migrations, Collaborators},
    infra::repositories::sqlite_document_store::SqliteDocumentStore,
    domain::models::auth::Role,
    domain::models::volunteer::VolunteerRoster,
    domain::ports::{EmailService, VerificationGate},
    error::AppError,
};
use argon2::{password_hash::{PasswordHasher, SaltString}, Argon2};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::NaiveDate;
use std::str::FromStr;
use async_trait::async_trait;
use tera::Tera;
use tower::ServiceExt;
use serde_json::Value;

pub const ROSTER_JSON: &str = include_str!("fixtures/roster.json");
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const ALLOWED_ORIGIN: &str = "https://outreach.example";
/// Captcha token the mock verifier accepts.
pub const GOOD_CAPTCHA: &str = "captcha-ok";

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: Option<String>,
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment_name: attachment_name.map(str::to_string),
        });
        Ok(())
    }
}

/// Accepts `GOOD_CAPTCHA`; the scored check returns whatever `score` holds.
pub struct MockVerifier {
    pub score: Mutex<Option<f64>>,
}

#[async_trait]
impl VerificationGate for MockVerifier {
    async fn verify(&self, token: &str) -> Result<bool, AppError> {
        Ok(token == GOOD_CAPTCHA)
    }

    async fn verify_scored(&self, token: &str) -> Result<Option<f64>, AppError> {
        let score = *self.score.lock().unwrap();
        Ok(score.map(|s| if token.is_empty() { 0.0 } else { s }))
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<MockEmailService>,
    pub verifier: Arc<MockVerifier>,
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn test_config(db_url: &str) -> Config {
    let salt = SaltString::encode_b64(b"outreach-test-salt").unwrap();
    let admin_hash = Argon2::default()
        .hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
        .unwrap()
        .to_string();

    Config {
        database_url: db_url.to_string(),
        port: 0,
        period_start: date("2026-01-26"),
        capacity_cutover: date("2026-02-09"),
        period_end: date("2026-02-13"),
        timezone: chrono_tz::America::New_York,
        roster_path: "tests/fixtures/roster.json".to_string(),
        jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
        auth_issuer: "test-issuer".to_string(),
        admin_password_hash: Some(admin_hash),
        allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
        recaptcha_secret: "unused".to_string(),
        recaptcha_v3_secret: None,
        recaptcha_min_score: 0.5,
        mail_service_url: "http://localhost".to_string(),
        mail_service_token: "token".to_string(),
        rate_limit_per_minute: 10,
        reminder_lead_hours: 24,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut tera = Tera::default();
        tera.add_raw_template("confirmation.html", "<html>Booked for {{ user_name }} with {{ volunteer_name }}</html>").unwrap();
        tera.add_raw_template("reminder.html", "<html>Reminder for {{ user_name }} at {{ time }}</html>").unwrap();

        let mut config = test_config(&db_url);
        tweak(&mut config);

        let email = Arc::new(MockEmailService::default());
        let verifier = Arc::new(MockVerifier { score: Mutex::new(None) });

        let state = build_state(&config, Collaborators {
            store: Arc::new(SqliteDocumentStore::new(pool.clone())),
            roster: VolunteerRoster::from_json(ROSTER_JSON).unwrap(),
            verifier: verifier.clone(),
            email_service: email.clone(),
            templates: Arc::new(tera),
        }).expect("Failed to build state");

        let state = Arc::new(state);
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            email,
            verifier,
        }
    }

    /// Mints a token the way the companion sign-in service would.
    pub fn token_for(&self, id: &str, name: &str, role: Role) -> AuthHeaders {
        let issued = self.state.auth_service.issue_token(id, name, role).unwrap();
        AuthHeaders {
            access_token: issued.access_token,
            csrf_token: issued.csrf_token,
        }
    }

    pub async fn login(&self, password: &str) -> Result<AuthHeaders, StatusCode> {
        let payload = serde_json::json!({ "password": password });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            return Err(response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start+end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        Ok(AuthHeaders {
            access_token,
            csrf_token
        })
    }

    /// Sends a JSON request with a bearer token, if any. Returns the status
    /// and the parsed body (`Null` when empty).
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>, auth: Option<&AuthHeaders>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", auth.access_token));
        }

        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        read(response).await
    }

    /// Public booking with an allowed origin and a good captcha.
    pub async fn book(&self, client: &str, payload: Value) -> (StatusCode, Value) {
        let mut payload = payload;
        if payload.get("captchaToken").is_none() {
            payload["captchaToken"] = Value::String(GOOD_CAPTCHA.to_string());
        }

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/bookings")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .header("X-Forwarded-For", client)
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();
        read(response).await
    }
}

pub async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
