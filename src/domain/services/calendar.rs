use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};
use crate::domain::models::booking::Booking;
use crate::domain::models::slot::SlotId;
use crate::error::AppError;

/// First slot of the day starts at 06:00.
pub const DAY_START_HOUR: u32 = 6;
/// Slots stop at 18:00; the last one starts at 17:30.
pub const DAY_END_HOUR: u32 = 18;
pub const SLOT_MINUTES: u32 = 30;

pub const BASE_CAPACITY: usize = 1;
pub const ESCALATED_CAPACITY: usize = 2;

/// The bookable period and its capacity cutover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodConfig {
    pub start: NaiveDate,
    pub cutover: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodConfig {
    pub fn new(start: NaiveDate, cutover: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::Validation("Period start must not be after period end".into()));
        }
        if cutover < start || cutover > end {
            return Err(AppError::Validation("Capacity cutover must fall inside the period".into()));
        }
        Ok(Self { start, cutover, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Weekdays in the period, in order. Weekends are skipped, so
    /// consecutive entries are not always consecutive days.
    pub fn generate_dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .filter(|d| is_weekday(*d))
            .collect()
    }

    /// Bookings a single slot identifier may hold on `date`. Zero outside
    /// the period.
    pub fn capacity_for(&self, date: NaiveDate) -> usize {
        if !self.contains(date) {
            0
        } else if date < self.cutover {
            BASE_CAPACITY
        } else {
            ESCALATED_CAPACITY
        }
    }

    /// Half-hour slots for `date`, 06:00 through 17:30. Empty for dates that
    /// are outside the period or on a weekend.
    pub fn enumerate_slots(&self, date: NaiveDate) -> Vec<SlotId> {
        if !self.contains(date) || !is_weekday(date) {
            return Vec::new();
        }

        (DAY_START_HOUR * 60..DAY_END_HOUR * 60)
            .step_by(SLOT_MINUTES as usize)
            .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
            .map(|time| SlotId::new(date, time))
            .collect()
    }

    /// Boundary gate for a requested slot: exact pattern, inside the period,
    /// Monday to Friday. Nothing is coerced to a nearby slot.
    pub fn admit(&self, raw: &str) -> Result<SlotId, AppError> {
        let slot: SlotId = raw.parse()?;

        if !self.contains(slot.date()) {
            return Err(AppError::InvalidSlot(format!(
                "{} is outside the booking period ({} to {})",
                slot.date(), self.start, self.end
            )));
        }
        if !is_weekday(slot.date()) {
            return Err(AppError::InvalidSlot("Bookings are only available Monday to Friday".into()));
        }

        Ok(slot)
    }

    /// `admit`, and additionally the time must be one of the generated
    /// half-hour starts.
    pub fn admit_generated(&self, raw: &str) -> Result<SlotId, AppError> {
        let slot = self.admit(raw)?;
        if !self.enumerate_slots(slot.date()).contains(&slot) {
            return Err(AppError::InvalidSlot(format!(
                "{} is not a bookable half-hour", slot.time_label()
            )));
        }
        Ok(slot)
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Start of the slot in UTC, or `None` when the local time does not exist
/// (or is ambiguous) in `tz`.
pub fn slot_start_utc(slot: &SlotId, tz: Tz) -> Option<chrono::DateTime<Utc>> {
    tz.from_local_datetime(&slot.date().and_time(slot.time()))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Generates an iCalendar (.ics) string for a booking
pub fn generate_ics(booking: &Booking, tz: Tz) -> Option<String> {
    let start = slot_start_utc(&booking.slot, tz)?;
    let end = start + Duration::minutes(SLOT_MINUTES as i64);

    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&format!("Outreach call ({})", booking.contact_method.label()))
        .description(&format!("Your volunteer: {}", booking.volunteer_name))
        .starts(start)
        .ends(end)
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    Some(calendar.to_string())
}
