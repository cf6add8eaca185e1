use std::sync::Arc;
use chrono_tz::Tz;
use tera::{Context, Tera};
use tracing::{error, info, info_span, Instrument};
use crate::domain::models::booking::Booking;
use crate::domain::models::slot::ContactMethod;
use crate::domain::ports::EmailService;
use crate::domain::services::calendar::generate_ics;
use crate::error::AppError;

pub const CONFIRMATION_SUBJECT: &str = "Your outreach call is booked";
pub const REMINDER_SUBJECT: &str = "Reminder: your outreach call is coming up";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Confirmation,
    Reminder,
}

impl NoticeKind {
    fn template(&self) -> &'static str {
        match self {
            NoticeKind::Confirmation => "confirmation.html",
            NoticeKind::Reminder => "reminder.html",
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            NoticeKind::Confirmation => CONFIRMATION_SUBJECT,
            NoticeKind::Reminder => REMINDER_SUBJECT,
        }
    }
}

/// Sends human-readable booking emails. Delivery is best-effort: callers log
/// failures, they never fail a booking over them.
pub struct NotificationService {
    email_service: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    tz: Tz,
}

impl NotificationService {
    pub fn new(email_service: Arc<dyn EmailService>, templates: Arc<Tera>, tz: Tz) -> Self {
        Self { email_service, templates, tz }
    }

    /// Returns `Ok(false)` when the booking has no address to write to.
    pub async fn send(&self, booking: &Booking, kind: NoticeKind) -> Result<bool, AppError> {
        let Some(recipient) = booking.notification_email() else {
            return Ok(false);
        };

        let html = self.templates
            .render(kind.template(), &self.context(booking))
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;

        let ics = match kind {
            NoticeKind::Confirmation => generate_ics(booking, self.tz),
            NoticeKind::Reminder => None,
        };
        let attachment_name = ics.as_ref().map(|_| "outreach-call.ics");

        self.email_service
            .send(recipient, kind.subject(), &html, attachment_name, ics.as_deref().map(str::as_bytes))
            .await?;

        info!(booking_id = %booking.id, ?kind, "Notification sent");
        Ok(true)
    }

    /// Fires a confirmation in the background and only logs the outcome.
    pub fn dispatch_confirmation(self: &Arc<Self>, booking: Booking) {
        let service = self.clone();
        let span = info_span!("notification", booking_id = %booking.id);
        tokio::spawn(
            async move {
                if let Err(e) = service.send(&booking, NoticeKind::Confirmation).await {
                    error!("Confirmation email failed: {:?}", e);
                }
            }
            .instrument(span),
        );
    }

    fn context(&self, booking: &Booking) -> Context {
        let mut context = Context::new();
        context.insert("user_name", &booking.name);
        context.insert("volunteer_name", &booking.volunteer_name);
        context.insert("date", &booking.slot.date().format("%A, %B %-d, %Y").to_string());
        context.insert("time", &booking.slot.time().format("%-I:%M %p").to_string());
        context.insert("timezone", self.tz.name());
        context.insert("method", booking.contact_method.label());
        context.insert("contact", &booking.contact);
        context.insert("how", match booking.contact_method {
            ContactMethod::Phone => "We will call you at the number you gave us.",
            ContactMethod::Video => "A video link will be sent to your email before the call.",
            ContactMethod::Chat => "A volunteer will message your chat username at the start time.",
        });
        context
    }
}
