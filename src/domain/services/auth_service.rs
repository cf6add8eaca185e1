use crate::domain::models::auth::{Claims, Principal, Role};
use crate::error::AppError;
use crate::config::Config;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};

pub const TOKEN_AUDIENCE: &str = "outreach-frontend";
const TOKEN_TTL_MINUTES: i64 = 60;

/// Issues and checks the HS256 access tokens shared with the companion
/// volunteer sign-in service.
pub struct AuthService {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

pub struct IssuedToken {
    pub access_token: String,
    pub csrf_token: String,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            issuer: config.auth_issuer.clone(),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub fn issue_token(&self, subject: &str, name: &str, role: Role) -> Result<IssuedToken, AppError> {
        let csrf_token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();
        let now = Utc::now();

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp: (now + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            role,
            name: name.to_string(),
            csrf: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        Ok(IssuedToken { access_token, csrf_token })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }

    pub fn principal(claims: &Claims) -> Principal {
        Principal {
            id: claims.sub.clone(),
            name: claims.name.clone(),
            role: claims.role,
        }
    }
}
