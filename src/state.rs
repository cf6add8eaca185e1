use std::sync::Arc;
use crate::domain::ports::VerificationGate;
use crate::domain::services::{
    auth_service::AuthService, booking_service::BookingService,
    notification_service::NotificationService, origin_gate::OriginGate,
    youth_service::YouthService,
};
use crate::infra::rate_limiter::RateLimiter;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_service: Arc<BookingService>,
    pub youth_service: Arc<YouthService>,
    pub auth_service: Arc<AuthService>,
    pub notification_service: Arc<NotificationService>,
    pub verifier: Arc<dyn VerificationGate>,
    pub origin_gate: Arc<OriginGate>,
    pub rate_limiter: Arc<RateLimiter>,
}
