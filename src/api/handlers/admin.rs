use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::requests::{ManualBookingRequest, RemoveBySlotQuery, ReplaceBookingsRequest};
use crate::api::dtos::responses::{RemovedResponse, ReplacedResponse};
use crate::api::handlers::slots::parse_date;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_service.list().await?;
    Ok(Json(bookings))
}

pub async fn replace_bookings(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<ReplaceBookingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let count = state.booking_service.replace_all(payload.bookings).await?;
    info!(admin = %admin.id, count, "Admin replaced booking list");
    Ok(Json(ReplacedResponse { count }))
}

pub async fn clear_bookings(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.booking_service.clear_all().await?;
    info!(admin = %admin.id, removed, "Admin cleared all bookings");
    Ok(Json(RemovedResponse { removed }))
}

pub async fn add_manual_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<ManualBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (request, forced) = payload.into_parts();
    let request = state.booking_service.validate(request)?;
    let booking = state.booking_service.add_manual(request, forced).await?;

    info!(admin = %admin.id, booking_id = %booking.id, "Admin added booking");
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn remove_by_slot(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(slot): Path<String>,
    Query(query): Query<RemoveBySlotQuery>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.booking_service.remove_by_slot(&slot, query.volunteer_id.as_deref()).await?;
    Ok(Json(removed))
}

pub async fn clear_date(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.booking_service.clear_date(parse_date(&date)?).await?;
    Ok(Json(RemovedResponse { removed }))
}

pub async fn remove_by_id(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.booking_service.remove_by_id(&booking_id).await?;
    Ok(Json(removed))
}

pub async fn list_youth(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let members = state.youth_service.list().await?;
    Ok(Json(members))
}

pub async fn delete_youth(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(youth_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.youth_service.remove(&youth_id).await?;
    info!(admin = %admin.id, %youth_id, "Admin removed youth volunteer");
    Ok(StatusCode::NO_CONTENT)
}
