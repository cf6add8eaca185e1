use axum::{
    extract::{State, Path},
    http::{header::{ORIGIN, REFERER}, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthUser, client_addr::ClientAddr};
use crate::api::dtos::requests::CreateBookingRequest;
use crate::api::dtos::responses::BookingConfirmedResponse;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

/// Public booking form. Cheap checks run first; the store is only touched
/// once the request is known to be well-formed and verified.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ClientAddr(client): ClientAddr,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    let referer = headers.get(REFERER).and_then(|v| v.to_str().ok());
    if !state.origin_gate.is_allowed_origin(origin, referer) {
        warn!(?origin, ?referer, "Booking rejected by origin check");
        return Err(AppError::Forbidden("Origin not allowed".into()));
    }

    if !state.rate_limiter.check(&client) {
        warn!(%client, "Booking rate limited");
        return Err(AppError::RateLimited);
    }

    let request = state.booking_service.validate(payload.booking_request())?;

    if payload.captcha_token.trim().is_empty() || !state.verifier.verify(&payload.captcha_token).await? {
        return Err(AppError::VerificationFailed);
    }

    let score_token = payload.captcha_score_token.as_deref().unwrap_or_default().trim();
    if let Some(score) = state.verifier.verify_scored(score_token).await?
        && score < state.config.recaptcha_min_score
    {
        warn!(score, threshold = state.config.recaptcha_min_score, "Booking rejected by score check");
        return Err(AppError::VerificationFailed);
    }

    let booking = state.booking_service.book(request).await?;
    state.notification_service.dispatch_confirmation(booking.clone());

    info!(booking_id = %booking.id, "Public booking created");
    Ok((StatusCode::CREATED, Json(BookingConfirmedResponse::from(&booking))))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.complete(&booking_id, &principal).await?;
    Ok(Json(booking))
}
