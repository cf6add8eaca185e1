use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::LoginRequest;
use crate::api::extractors::auth::ACCESS_COOKIE;
use crate::domain::models::auth::{AuthResponse, Role, UserProfile};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use argon2::{PasswordHash, Argon2, PasswordVerifier};
use tracing::{info, warn};

pub const ADMIN_SUBJECT: &str = "admin";

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(stored_hash) = state.config.admin_password_hash.as_deref() else {
        warn!("Admin login attempted but ADMIN_PASSWORD_HASH is not set");
        return Err(AppError::Unauthorized);
    };

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::InternalWithMsg("ADMIN_PASSWORD_HASH is not a valid PHC string".into()))?;

    Argon2::default().verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)?;

    let issued = state.auth_service.issue_token(ADMIN_SUBJECT, "Administrator", Role::Admin)?;

    set_access_cookie(&cookies, &issued.access_token);

    info!("Admin logged in");

    Ok(Json(AuthResponse {
        csrf_token: issued.csrf_token,
        user: UserProfile {
            id: ADMIN_SUBJECT.to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
        },
    }))
}

pub async fn logout(cookies: Cookies) -> Result<impl IntoResponse, AppError> {
    cookies.remove(Cookie::build((ACCESS_COOKIE, "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

fn set_access_cookie(cookies: &Cookies, access: &str) {
    let mut access_c = Cookie::new(ACCESS_COOKIE, access.to_string());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(60));
    cookies.add(access_c);
}
