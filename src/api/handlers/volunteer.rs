use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::VolunteerUser;
use crate::error::AppError;
use std::sync::Arc;

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    VolunteerUser(volunteer): VolunteerUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_service.assignments_for(&volunteer.id).await?;
    Ok(Json(bookings))
}
