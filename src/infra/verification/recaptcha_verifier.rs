use std::time::Duration;
use crate::domain::ports::VerificationGate;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, warn};

pub const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// reCAPTCHA siteverify client: a checkbox secret for the primary check and
/// an optional score-based secret for the secondary one.
pub struct RecaptchaVerifier {
    client: Client,
    verify_url: String,
    secret: String,
    scored_secret: Option<String>,
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl RecaptchaVerifier {
    pub fn new(secret: String, scored_secret: Option<String>) -> Self {
        Self::with_url(SITEVERIFY_URL.to_string(), secret, scored_secret)
    }

    pub fn with_url(verify_url: String, secret: String, scored_secret: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, verify_url, secret, scored_secret }
    }

    async fn siteverify(&self, secret: &str, token: &str) -> Result<SiteverifyResponse, AppError> {
        let res = self.client.post(&self.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                error!("Captcha verification unreachable: {}", e);
                AppError::InternalWithMsg(format!("Captcha verification unreachable: {}", e))
            })?;

        res.json::<SiteverifyResponse>()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("Captcha verification returned garbage: {}", e)))
    }
}

#[async_trait]
impl VerificationGate for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, AppError> {
        let body = self.siteverify(&self.secret, token).await?;
        if !body.success {
            warn!(errors = ?body.error_codes, "Captcha rejected");
        }
        Ok(body.success)
    }

    async fn verify_scored(&self, token: &str) -> Result<Option<f64>, AppError> {
        let Some(secret) = self.scored_secret.as_deref() else {
            return Ok(None);
        };

        if token.is_empty() {
            warn!("Scored captcha token missing");
            return Ok(Some(0.0));
        }

        // Secondary check: an unreachable scorer does not block bookings.
        let body = match self.siteverify(secret, token).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Scored captcha skipped: {}", e);
                return Ok(None);
            }
        };
        if !body.success {
            warn!(errors = ?body.error_codes, "Scored captcha rejected");
            return Ok(Some(0.0));
        }
        Ok(Some(body.score.unwrap_or(0.0)))
    }
}
