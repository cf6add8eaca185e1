use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use crate::domain::models::slot::ContactMethod;

/// Half-open availability window `[start, end)` in fractional hours.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn contains(&self, hour: f64) -> bool {
        self.start <= hour && hour < self.end
    }

    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && (0.0..=24.0).contains(&self.start)
            && (0.0..=24.0).contains(&self.end)
            && self.start < self.end
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    pub methods: Vec<ContactMethod>,
    /// One window per date; a missing date means unavailable all day.
    #[serde(default)]
    pub availability: BTreeMap<NaiveDate, TimeWindow>,
}

/// Phone/video roster. Declaration order is significant: it breaks ties
/// between equally loaded volunteers.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VolunteerRoster {
    pub volunteers: Vec<Volunteer>,
}
