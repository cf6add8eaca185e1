use std::env;
use chrono::NaiveDate;
use chrono_tz::Tz;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub period_start: NaiveDate,
    pub capacity_cutover: NaiveDate,
    pub period_end: NaiveDate,
    pub timezone: Tz,
    pub roster_path: String,
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub admin_password_hash: Option<String>, // argon2 PHC string
    pub allowed_origins: Vec<String>,
    pub recaptcha_secret: String,
    pub recaptcha_v3_secret: Option<String>,
    pub recaptcha_min_score: f64,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub rate_limit_per_minute: u32,
    pub reminder_lead_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://outreach.db".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            period_start: date_var("PERIOD_START", "2026-01-26"),
            capacity_cutover: date_var("CAPACITY_CUTOVER", "2026-02-09"),
            period_end: date_var("PERIOD_END", "2026-02-13"),
            timezone: env::var("TIMEZONE").unwrap_or_else(|_| "America/New_York".to_string())
                .parse().expect("TIMEZONE must be an IANA zone name"),
            roster_path: env::var("ROSTER_PATH").unwrap_or_else(|_| "./config/roster.json".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.outreach.local".to_string()),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok().filter(|h| !h.is_empty()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            recaptcha_secret: env::var("RECAPTCHA_SECRET").expect("RECAPTCHA_SECRET must be set"),
            recaptcha_v3_secret: env::var("RECAPTCHA_V3_SECRET").ok().filter(|s| !s.is_empty()),
            recaptcha_min_score: env::var("RECAPTCHA_MIN_SCORE").unwrap_or_else(|_| "0.5".to_string())
                .parse().expect("RECAPTCHA_MIN_SCORE must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE").unwrap_or_else(|_| "10".to_string())
                .parse().expect("RATE_LIMIT_PER_MINUTE must be a number"),
            reminder_lead_hours: env::var("REMINDER_LEAD_HOURS").unwrap_or_else(|_| "24".to_string())
                .parse().expect("REMINDER_LEAD_HOURS must be a number"),
        }
    }
}

fn date_var(name: &str, default: &str) -> NaiveDate {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .unwrap_or_else(|_| panic!("{} must be a YYYY-MM-DD date", name))
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
