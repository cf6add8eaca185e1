use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, slots, booking, auth, volunteer, youth, admin};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Public booking flow
        .route("/api/v1/slots", get(slots::list_slots))
        .route("/api/v1/bookings", post(booking::create_booking))

        // Volunteers
        .route("/api/v1/volunteer/bookings", get(volunteer::my_bookings))
        .route("/api/v1/bookings/{booking_id}/complete", post(booking::complete_booking))

        // Youth self-service
        .route("/api/v1/youth/me", get(youth::get_me))
        .route("/api/v1/youth/me/availability",
            post(youth::add_availability).delete(youth::remove_availability).put(youth::set_availability))

        // Admin
        .route("/api/v1/admin/bookings",
            get(admin::list_bookings).put(admin::replace_bookings).delete(admin::clear_bookings))
        .route("/api/v1/admin/bookings/manual", post(admin::add_manual_booking))
        .route("/api/v1/admin/bookings/slot/{slot}", delete(admin::remove_by_slot))
        .route("/api/v1/admin/bookings/date/{date}", delete(admin::clear_date))
        .route("/api/v1/admin/bookings/{booking_id}", delete(admin::remove_by_id))
        .route("/api/v1/admin/youth", get(admin::list_youth))
        .route("/api/v1/admin/youth/{youth_id}", delete(admin::delete_youth))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        volunteer_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
