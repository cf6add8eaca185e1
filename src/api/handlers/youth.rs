use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::YouthUser;
use crate::api::dtos::requests::AvailabilityRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    YouthUser(youth): YouthUser,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.youth_service.get_or_create(&youth.id, &youth.name).await?;
    Ok(Json(entry))
}

pub async fn add_availability(
    State(state): State<Arc<AppState>>,
    YouthUser(youth): YouthUser,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.youth_service.add_availability(&youth.id, &youth.name, &payload.slots).await?;
    Ok(Json(entry))
}

pub async fn remove_availability(
    State(state): State<Arc<AppState>>,
    YouthUser(youth): YouthUser,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.youth_service.remove_availability(&youth.id, &youth.name, &payload.slots).await?;
    Ok(Json(entry))
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    YouthUser(youth): YouthUser,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.youth_service.set_availability(&youth.id, &youth.name, &payload.slots).await?;
    Ok(Json(entry))
}
