//! Volunteer selection for a single slot request.
//!
//! Everything here is a pure function of the rosters and the booking list
//! handed in. Counts are re-derived from that list on every call; nothing is
//! cached between decisions.

use std::collections::{HashMap, HashSet};
use serde::Serialize;
use crate::domain::models::booking::Booking;
use crate::domain::models::slot::{ContactMethod, RosterPool, SlotId};
use crate::domain::models::volunteer::VolunteerRoster;
use crate::domain::models::youth::YouthRoster;
use crate::domain::services::calendar::PeriodConfig;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignee {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    id: &'a str,
    name: &'a str,
}

impl Candidate<'_> {
    fn to_assignee(self) -> Assignee {
        Assignee { id: self.id.to_string(), name: self.name.to_string() }
    }
}

pub struct AssignmentEngine<'a> {
    period: &'a PeriodConfig,
    roster: &'a VolunteerRoster,
    youth: &'a YouthRoster,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(period: &'a PeriodConfig, roster: &'a VolunteerRoster, youth: &'a YouthRoster) -> Self {
        Self { period, roster, youth }
    }

    /// Picks the least-loaded eligible volunteer not already holding `slot`.
    /// Ties go to the first one in roster order.
    pub fn assign(&self, slot: &SlotId, method: ContactMethod, bookings: &[Booking]) -> Result<Assignee, AppError> {
        if slot_load(bookings, slot) >= self.period.capacity_for(slot.date()) {
            return Err(none_available(method));
        }

        let pool = method.pool();
        self.unbooked(slot, method, bookings)
            .into_iter()
            .min_by_key(|c| assignment_count(bookings, pool, c.id))
            .map(Candidate::to_assignee)
            .ok_or_else(|| none_available(method))
    }

    /// Admin path: use the named volunteer without checking their roster
    /// availability. The id must exist in the roster serving `method`;
    /// capacity and double-booking still apply.
    pub fn assign_forced(&self, slot: &SlotId, method: ContactMethod, volunteer_id: &str, bookings: &[Booking]) -> Result<Assignee, AppError> {
        let name = match method.pool() {
            RosterPool::Volunteer => self.roster.find(volunteer_id).map(|v| v.name.clone()),
            RosterPool::Youth => self.youth.find(volunteer_id).map(|m| m.name.clone()),
        }
        .ok_or_else(|| AppError::NotFound(format!(
            "No {} volunteer with id {}", method.label(), volunteer_id
        )))?;

        if slot_load(bookings, slot) >= self.period.capacity_for(slot.date()) {
            return Err(AppError::Conflict(format!("{} is already at capacity", slot)));
        }
        if taken_ids(bookings, slot, method.pool()).contains(volunteer_id) {
            return Err(AppError::Conflict(format!("{} already holds {}", volunteer_id, slot)));
        }

        Ok(Assignee { id: volunteer_id.to_string(), name })
    }

    /// Number of volunteers who could still take `slot` via `method`,
    /// ignoring date capacity.
    pub fn unbooked_count(&self, slot: &SlotId, method: ContactMethod, bookings: &[Booking]) -> usize {
        self.unbooked(slot, method, bookings).len()
    }

    /// Phone/video volunteers covering `slot` for either method who are not
    /// yet booked on it.
    pub fn open_volunteer_count(&self, slot: &SlotId, bookings: &[Booking]) -> usize {
        let taken = taken_ids(bookings, slot, RosterPool::Volunteer);
        self.roster
            .eligible_any(slot.date(), slot.hour_decimal())
            .into_iter()
            .filter(|v| !taken.contains(v.id.as_str()))
            .count()
    }

    fn eligible(&self, slot: &SlotId, method: ContactMethod) -> Vec<Candidate<'a>> {
        match method.pool() {
            RosterPool::Volunteer => self.roster
                .eligible(slot.date(), slot.hour_decimal(), method)
                .into_iter()
                .map(|v| Candidate { id: &v.id, name: &v.name })
                .collect(),
            RosterPool::Youth => self.youth
                .eligible(slot)
                .into_iter()
                .map(|m| Candidate { id: &m.id, name: &m.name })
                .collect(),
        }
    }

    fn unbooked(&self, slot: &SlotId, method: ContactMethod, bookings: &[Booking]) -> Vec<Candidate<'a>> {
        let taken = taken_ids(bookings, slot, method.pool());
        self.eligible(slot, method)
            .into_iter()
            .filter(|c| !taken.contains(c.id))
            .collect()
    }
}

fn none_available(method: ContactMethod) -> AppError {
    match method.pool() {
        RosterPool::Volunteer => AppError::NoVolunteerAvailable,
        RosterPool::Youth => AppError::NoYouthVolunteerAvailable,
    }
}

/// Bookings held on `slot`, across every contact method.
pub fn slot_load(bookings: &[Booking], slot: &SlotId) -> usize {
    bookings.iter().filter(|b| b.slot == *slot).count()
}

/// Bookings in `pool` assigned to `volunteer_id`. Phone and video share one
/// count; chat is counted separately.
pub fn assignment_count(bookings: &[Booking], pool: RosterPool, volunteer_id: &str) -> usize {
    bookings
        .iter()
        .filter(|b| b.contact_method.pool() == pool && b.volunteer_id == volunteer_id)
        .count()
}

fn taken_ids<'b>(bookings: &'b [Booking], slot: &SlotId, pool: RosterPool) -> HashSet<&'b str> {
    bookings
        .iter()
        .filter(|b| b.slot == *slot && b.contact_method.pool() == pool)
        .map(|b| b.volunteer_id.as_str())
        .collect()
}

/// Rejects a booking list that overfills a slot or double-books a volunteer.
pub fn check_invariants(period: &PeriodConfig, bookings: &[Booking]) -> Result<(), AppError> {
    let mut per_slot: HashMap<SlotId, usize> = HashMap::new();
    let mut pairs = HashSet::new();

    for b in bookings {
        let load = per_slot.entry(b.slot).or_default();
        *load += 1;
        if *load > period.capacity_for(b.slot.date()) {
            return Err(AppError::Validation(format!("{} exceeds its capacity", b.slot)));
        }
        if !pairs.insert((b.slot, b.contact_method.pool(), b.volunteer_id.as_str())) {
            return Err(AppError::Validation(format!(
                "{} is booked twice for volunteer {}", b.slot, b.volunteer_id
            )));
        }
    }
    Ok(())
}
