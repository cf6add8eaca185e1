use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::Serialize;
use crate::domain::models::booking::Booking;
use crate::domain::models::slot::{ContactMethod, SlotId};
use crate::domain::models::volunteer::VolunteerRoster;
use crate::domain::models::youth::YouthRoster;
use crate::domain::services::assignment::{slot_load, AssignmentEngine};
use crate::domain::services::calendar::PeriodConfig;

/// What a client needs to decide whether to offer a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot: SlotId,
    pub time: String,
    pub capacity: usize,
    pub booked_count: usize,
    /// Someone on the phone/video roster covers this half-hour at all,
    /// whatever the bookings say.
    pub has_any_volunteer: bool,
    pub available_volunteer_count: usize,
    pub is_available: bool,
    pub has_discord_volunteer: bool,
    pub available_discord_volunteer_count: usize,
    pub is_discord_available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub capacity: usize,
    pub slots: Vec<SlotView>,
}

/// Builds the per-slot availability for every generated date in
/// `[from, to]` (clipped to the period). Always computed from the booking
/// list passed in.
pub fn project(
    period: &PeriodConfig,
    from: NaiveDate,
    to: NaiveDate,
    roster: &VolunteerRoster,
    youth: &YouthRoster,
    bookings: &[Booking],
) -> BTreeMap<NaiveDate, Vec<SlotView>> {
    let engine = AssignmentEngine::new(period, roster, youth);

    period
        .generate_dates()
        .into_iter()
        .filter(|d| from <= *d && *d <= to)
        .map(|date| {
            let capacity = period.capacity_for(date);
            let views = period
                .enumerate_slots(date)
                .into_iter()
                .map(|slot| view_for(&engine, roster, youth, slot, capacity, bookings))
                .collect();
            (date, views)
        })
        .collect()
}

fn view_for(
    engine: &AssignmentEngine<'_>,
    roster: &VolunteerRoster,
    youth: &YouthRoster,
    slot: SlotId,
    capacity: usize,
    bookings: &[Booking],
) -> SlotView {
    let booked_count = slot_load(bookings, &slot);
    let has_room = booked_count < capacity;

    let available_volunteer_count = engine.open_volunteer_count(&slot, bookings);
    let available_discord_volunteer_count = engine.unbooked_count(&slot, ContactMethod::Chat, bookings);

    SlotView {
        slot,
        time: slot.time_label(),
        capacity,
        booked_count,
        has_any_volunteer: !roster.eligible_any(slot.date(), slot.hour_decimal()).is_empty(),
        available_volunteer_count,
        is_available: has_room && available_volunteer_count > 0,
        has_discord_volunteer: !youth.eligible(&slot).is_empty(),
        available_discord_volunteer_count,
        is_discord_available: has_room && available_discord_volunteer_count > 0,
    }
}

/// Flattens a projection into the list shape the API returns.
pub fn into_days(projection: BTreeMap<NaiveDate, Vec<SlotView>>, period: &PeriodConfig) -> Vec<DayView> {
    projection
        .into_iter()
        .map(|(date, slots)| DayView { date, capacity: period.capacity_for(date), slots })
        .collect()
}
