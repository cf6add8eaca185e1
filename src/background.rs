use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, warn, info_span, Instrument};
use crate::state::AppState;
use crate::domain::services::notification_service::NoticeKind;
use crate::error::AppError;

pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background worker...");

    loop {
        let span = info_span!("background_tick");
        async {
            state.rate_limiter.evict_idle();

            match send_due_reminders(&state).await {
                Ok(0) => {}
                Ok(sent) => info!(sent, "Reminders sent"),
                Err(e) => error!("Reminder pass failed: {:?}", e),
            }
        }
            .instrument(span)
            .await;

        sleep(TICK_INTERVAL).await;
    }
}

/// Sends reminders for bookings starting within the configured lead time and
/// stamps the ones that went out. Returns how many were stamped.
pub async fn send_due_reminders(state: &AppState) -> Result<usize, AppError> {
    let lead = chrono::Duration::hours(state.config.reminder_lead_hours);
    let due = state.booking_service
        .due_reminders(Utc::now(), lead, state.config.timezone)
        .await?;

    let mut sent = Vec::new();
    for booking in &due {
        match state.notification_service.send(booking, NoticeKind::Reminder).await {
            Ok(true) => sent.push(booking.id.clone()),
            Ok(false) => {}
            Err(e) => warn!(booking_id = %booking.id, "Reminder failed: {:?}", e),
        }
    }

    state.booking_service.mark_reminded(&sent).await
}
