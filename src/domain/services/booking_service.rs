use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};
use crate::domain::models::auth::Principal;
use crate::domain::models::booking::{Booking, BookingSnapshot, NewBookingParams};
use crate::domain::models::slot::{ContactMethod, SlotId};
use crate::domain::models::volunteer::VolunteerRoster;
use crate::domain::models::youth::YouthRoster;
use crate::domain::ports::{BookingRepository, YouthRosterRepository};
use crate::domain::services::assignment::{check_invariants, AssignmentEngine};
use crate::domain::services::calendar::{slot_start_utc, PeriodConfig};
use crate::domain::services::projection::{into_days, project, DayView};
use crate::error::AppError;

/// Read-decide-write attempts before giving up on a contended booking list.
pub const MAX_COMMIT_ATTEMPTS: usize = 3;

const MAX_NAME_LEN: usize = 100;
const MAX_HANDLE_LEN: usize = 64;

/// Booking input as it arrives, before any checks.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub slot: String,
    pub contact_method: Option<String>,
    pub name: String,
    pub contact: String,
    pub reminder_email: Option<String>,
}

/// Booking input that passed every boundary check.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub slot: SlotId,
    pub method: ContactMethod,
    pub name: String,
    pub contact: String,
    pub reminder_email: Option<String>,
}

pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    youth_repo: Arc<dyn YouthRosterRepository>,
    roster: Arc<VolunteerRoster>,
    period: PeriodConfig,
}

impl BookingService {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        youth_repo: Arc<dyn YouthRosterRepository>,
        roster: Arc<VolunteerRoster>,
        period: PeriodConfig,
    ) -> Self {
        Self { repo, youth_repo, roster, period }
    }

    pub fn period(&self) -> &PeriodConfig {
        &self.period
    }

    /// Checks everything that can be checked without the store.
    pub fn validate(&self, request: BookingRequest) -> Result<ValidatedBooking, AppError> {
        let slot = self.period.admit_generated(&request.slot)?;

        let method = request.contact_method
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(AppError::MissingContactMethod)?
            .parse::<ContactMethod>()
            .map_err(|_| AppError::MissingContactMethod)?;

        let name = request.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::Validation("Please enter your name".into()));
        }

        let contact = validate_contact(method, request.contact.trim())?;

        let reminder_email = match request.reminder_email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if looks_like_email(email) => Some(email.to_string()),
            Some(_) => return Err(AppError::Validation("Reminder email is not valid".into())),
        };

        Ok(ValidatedBooking { slot, method, name, contact, reminder_email })
    }

    /// Assigns a volunteer on a fresh read and appends the booking. A
    /// concurrent writer forces a re-read and a new decision.
    pub async fn book(&self, request: ValidatedBooking) -> Result<Booking, AppError> {
        let load_youth = request.method == ContactMethod::Chat;

        let booking = self.mutate(load_youth, |bookings, engine| {
            let assignee = engine.assign(&request.slot, request.method, bookings)?;
            let booking = new_booking(&request, assignee.id, assignee.name);
            bookings.push(booking.clone());
            Ok(booking)
        }).await?;

        info!(
            booking_id = %booking.id,
            slot = %booking.slot,
            method = booking.contact_method.label(),
            volunteer_id = %booking.volunteer_id,
            "Booking confirmed"
        );
        Ok(booking)
    }

    /// Admin-curated booking. Goes through the assignment gate unless a
    /// volunteer is forced.
    pub async fn add_manual(&self, request: ValidatedBooking, force_volunteer_id: Option<String>) -> Result<Booking, AppError> {
        let Some(forced) = force_volunteer_id.filter(|id| !id.trim().is_empty()) else {
            return self.book(request).await;
        };

        let load_youth = request.method == ContactMethod::Chat;
        let booking = self.mutate(load_youth, |bookings, engine| {
            let assignee = engine.assign_forced(&request.slot, request.method, forced.trim(), bookings)?;
            let booking = new_booking(&request, assignee.id, assignee.name);
            bookings.push(booking.clone());
            Ok(booking)
        }).await?;

        info!(booking_id = %booking.id, slot = %booking.slot, volunteer_id = %booking.volunteer_id, "Manual booking added");
        Ok(booking)
    }

    pub async fn list(&self) -> Result<Vec<Booking>, AppError> {
        Ok(self.repo.snapshot().await?.bookings)
    }

    pub async fn assignments_for(&self, volunteer_id: &str) -> Result<Vec<Booking>, AppError> {
        let mut mine: Vec<Booking> = self.list().await?
            .into_iter()
            .filter(|b| b.volunteer_id == volunteer_id)
            .collect();
        mine.sort_by_key(|b| b.slot);
        Ok(mine)
    }

    /// Per-slot availability for `[from, to]`, defaulting to the whole period.
    pub async fn project(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<DayView>, AppError> {
        let snapshot = self.repo.snapshot().await?;
        let youth = self.youth_repo.roster().await?;

        let from = from.unwrap_or(self.period.start);
        let to = to.unwrap_or(self.period.end);
        if from > to {
            return Err(AppError::Validation("`from` must not be after `to`".into()));
        }

        let projection = project(&self.period, from, to, &self.roster, &youth, &snapshot.bookings);
        Ok(into_days(projection, &self.period))
    }

    /// Bulk replace. The new list must respect capacity and must not
    /// double-book anyone.
    pub async fn replace_all(&self, bookings: Vec<Booking>) -> Result<usize, AppError> {
        check_invariants(&self.period, &bookings)?;
        self.repo.overwrite(&bookings).await?;
        info!(count = bookings.len(), "Booking list replaced");
        Ok(bookings.len())
    }

    /// Removes the first booking on `raw_slot`, optionally only the one held
    /// by `volunteer_id`.
    pub async fn remove_by_slot(&self, raw_slot: &str, volunteer_id: Option<&str>) -> Result<Booking, AppError> {
        let slot: SlotId = raw_slot.parse()?;

        let removed = self.mutate(false, |bookings, _| {
            let idx = bookings
                .iter()
                .position(|b| b.slot == slot && volunteer_id.is_none_or(|v| b.volunteer_id == v))
                .ok_or_else(|| AppError::NotFound(format!("No booking for {}", slot)))?;
            Ok(bookings.remove(idx))
        }).await?;

        info!(booking_id = %removed.id, slot = %removed.slot, "Booking removed");
        Ok(removed)
    }

    pub async fn remove_by_id(&self, id: &str) -> Result<Booking, AppError> {
        let removed = self.mutate(false, |bookings, _| {
            let idx = bookings
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
            Ok(bookings.remove(idx))
        }).await?;

        info!(booking_id = %removed.id, slot = %removed.slot, "Booking removed");
        Ok(removed)
    }

    pub async fn clear_date(&self, date: NaiveDate) -> Result<usize, AppError> {
        let removed = self.mutate(false, |bookings, _| {
            let before = bookings.len();
            bookings.retain(|b| b.slot.date() != date);
            Ok(before - bookings.len())
        }).await?;

        info!(%date, removed, "Bookings cleared for date");
        Ok(removed)
    }

    pub async fn clear_all(&self) -> Result<usize, AppError> {
        let removed = self.mutate(false, |bookings, _| {
            let removed = bookings.len();
            bookings.clear();
            Ok(removed)
        }).await?;
        warn!(removed, "All bookings cleared");
        Ok(removed)
    }

    /// Marks a booking done. Only an admin or the assigned volunteer may.
    pub async fn complete(&self, id: &str, actor: &Principal) -> Result<Booking, AppError> {
        let booking = self.mutate(false, |bookings, _| {
            let booking = bookings
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

            if !actor.is_admin() && booking.volunteer_id != actor.id {
                return Err(AppError::Forbidden("Only the assigned volunteer can complete this booking".into()));
            }

            if !booking.completed {
                booking.completed = true;
                booking.completed_at = Some(Utc::now());
                booking.completed_by = Some(actor.id.clone());
            }
            Ok(booking.clone())
        }).await?;

        info!(booking_id = %booking.id, by = %actor.id, "Booking completed");
        Ok(booking)
    }

    /// Bookings with an email to notify whose slot starts within `lead` of
    /// `now` and that have not been reminded yet.
    pub async fn due_reminders(&self, now: DateTime<Utc>, lead: Duration, tz: Tz) -> Result<Vec<Booking>, AppError> {
        let horizon = now + lead;
        Ok(self.list().await?
            .into_iter()
            .filter(|b| !b.completed && b.reminder_sent_at.is_none() && b.notification_email().is_some())
            .filter(|b| slot_start_utc(&b.slot, tz).is_some_and(|start| now < start && start <= horizon))
            .collect())
    }

    pub async fn mark_reminded(&self, ids: &[String]) -> Result<usize, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        self.mutate(false, |bookings, _| {
            let mut marked = 0;
            for b in bookings.iter_mut().filter(|b| ids.contains(&b.id) && b.reminder_sent_at.is_none()) {
                b.reminder_sent_at = Some(now);
                marked += 1;
            }
            Ok(marked)
        }).await
    }

    /// Runs `op` against a fresh snapshot and commits the result only if no
    /// one else wrote in between; otherwise starts over.
    async fn mutate<T, F>(&self, load_youth: bool, mut op: F) -> Result<T, AppError>
    where
        F: FnMut(&mut Vec<Booking>, &AssignmentEngine<'_>) -> Result<T, AppError> + Send,
        T: Send,
    {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let BookingSnapshot { mut bookings, version } = self.repo.snapshot().await?;
            let youth = if load_youth {
                self.youth_repo.roster().await?
            } else {
                YouthRoster::default()
            };

            let outcome = {
                let engine = AssignmentEngine::new(&self.period, &self.roster, &youth);
                op(&mut bookings, &engine)?
            };

            match self.repo.commit(&bookings, version).await {
                Ok(_) => return Ok(outcome),
                Err(AppError::StoreConflict) => {
                    warn!(attempt, "Booking list changed during write, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict("Bookings changed while saving. Please refresh and try again.".into()))
    }
}

fn new_booking(request: &ValidatedBooking, volunteer_id: String, volunteer_name: String) -> Booking {
    Booking::new(NewBookingParams {
        slot: request.slot,
        contact_method: request.method,
        name: request.name.clone(),
        contact: request.contact.clone(),
        reminder_email: request.reminder_email.clone(),
        volunteer_id,
        volunteer_name,
    })
}

fn validate_contact(method: ContactMethod, contact: &str) -> Result<String, AppError> {
    match method {
        ContactMethod::Phone => {
            let digits = contact.chars().filter(char::is_ascii_digit).count();
            let allowed = contact.chars().all(|c| c.is_ascii_digit() || " +-().".contains(c));
            if !allowed || !(7..=15).contains(&digits) {
                return Err(AppError::Validation("Please enter a valid phone number".into()));
            }
        }
        ContactMethod::Video => {
            if !looks_like_email(contact) {
                return Err(AppError::Validation("Please enter a valid email for the video link".into()));
            }
        }
        ContactMethod::Chat => {
            let len = contact.chars().count();
            if len < 2 || len > MAX_HANDLE_LEN || contact.chars().any(char::is_whitespace) {
                return Err(AppError::Validation("Please enter your chat username".into()));
            }
        }
    }
    Ok(contact.to_string())
}

pub fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !raw.chars().any(char::is_whitespace)
}
