//! Read-only availability lookups over the two rosters.

use chrono::NaiveDate;
use crate::domain::models::slot::{ContactMethod, SlotId};
use crate::domain::models::volunteer::{Volunteer, VolunteerRoster};
use crate::domain::models::youth::{YouthRoster, YouthVolunteer};
use crate::error::AppError;

impl Volunteer {
    pub fn supports(&self, method: ContactMethod) -> bool {
        self.methods.contains(&method)
    }

    pub fn available_at(&self, date: NaiveDate, hour: f64) -> bool {
        self.availability.get(&date).is_some_and(|w| w.contains(hour))
    }
}

impl VolunteerRoster {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let roster: VolunteerRoster = serde_json::from_str(raw)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid roster file: {}", e)))?;
        roster.validate()?;
        Ok(roster)
    }

    fn validate(&self) -> Result<(), AppError> {
        let mut seen = std::collections::HashSet::new();
        for v in &self.volunteers {
            if !seen.insert(v.id.as_str()) {
                return Err(AppError::InternalWithMsg(format!("Duplicate volunteer id {}", v.id)));
            }
            if v.methods.contains(&ContactMethod::Chat) {
                return Err(AppError::InternalWithMsg(format!(
                    "Volunteer {} lists chat; chat is served by the youth roster", v.id
                )));
            }
            if let Some((date, _)) = v.availability.iter().find(|(_, w)| !w.is_well_formed()) {
                return Err(AppError::InternalWithMsg(format!(
                    "Volunteer {} has an invalid window on {}", v.id, date
                )));
            }
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&Volunteer> {
        self.volunteers.iter().find(|v| v.id == id)
    }

    /// True iff the volunteer has a window on `date` and `start <= hour < end`.
    pub fn is_available(&self, id: &str, date: NaiveDate, hour: f64) -> bool {
        self.find(id).is_some_and(|v| v.available_at(date, hour))
    }

    /// Volunteers supporting `method` and available at `date`/`hour`, in
    /// declaration order.
    pub fn eligible(&self, date: NaiveDate, hour: f64, method: ContactMethod) -> Vec<&Volunteer> {
        self.volunteers
            .iter()
            .filter(|v| v.supports(method) && v.available_at(date, hour))
            .collect()
    }

    /// Volunteers available at `date`/`hour` for any method they support.
    pub fn eligible_any(&self, date: NaiveDate, hour: f64) -> Vec<&Volunteer> {
        self.volunteers
            .iter()
            .filter(|v| !v.methods.is_empty() && v.available_at(date, hour))
            .collect()
    }
}

impl YouthVolunteer {
    pub fn available_for(&self, slot: &SlotId) -> bool {
        self.availability.contains(slot)
    }
}

impl YouthRoster {
    pub fn find(&self, id: &str) -> Option<&YouthVolunteer> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn is_available(&self, id: &str, slot: &SlotId) -> bool {
        self.find(id).is_some_and(|m| m.available_for(slot))
    }

    /// Youth volunteers who opted into `slot`, in registration order.
    pub fn eligible(&self, slot: &SlotId) -> Vec<&YouthVolunteer> {
        self.members.iter().filter(|m| m.available_for(slot)).collect()
    }
}
