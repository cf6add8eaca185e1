use std::collections::BTreeSet;
use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};
use crate::domain::models::slot::SlotId;
use crate::domain::models::youth::{AvailabilityChange, YouthVolunteer};
use crate::domain::ports::{Expected, YouthRosterRepository};
use crate::domain::services::booking_service::MAX_COMMIT_ATTEMPTS;
use crate::domain::services::calendar::PeriodConfig;
use crate::error::AppError;

pub struct YouthService {
    repo: Arc<dyn YouthRosterRepository>,
    period: PeriodConfig,
}

impl YouthService {
    pub fn new(repo: Arc<dyn YouthRosterRepository>, period: PeriodConfig) -> Self {
        Self { repo, period }
    }

    /// Returns the caller's entry, creating an empty one on first access.
    pub async fn get_or_create(&self, id: &str, name: &str) -> Result<YouthVolunteer, AppError> {
        if let Some(existing) = self.repo.find(id).await? {
            return Ok(existing.value);
        }

        let entry = YouthVolunteer::new(id.to_string(), name.to_string());
        match self.repo.save(&entry, Expected::Absent).await {
            Ok(_) => {
                info!(youth_id = %id, "Youth volunteer registered");
                Ok(entry)
            }
            // Someone registered the same id concurrently; theirs wins.
            Err(AppError::StoreConflict) => self.repo.find(id).await?
                .map(|v| v.value)
                .ok_or(AppError::Internal),
            Err(e) => Err(e),
        }
    }

    /// Applies an availability change to one volunteer's entry with a single
    /// versioned write. Every slot must be a generated, bookable half-hour.
    pub async fn update_availability(
        &self,
        id: &str,
        name: &str,
        change: AvailabilityChange,
        raw_slots: &[String],
    ) -> Result<YouthVolunteer, AppError> {
        let slots = raw_slots
            .iter()
            .map(|raw| self.period.admit_generated(raw))
            .collect::<Result<BTreeSet<SlotId>, AppError>>()?;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let (mut entry, expected) = match self.repo.find(id).await? {
                Some(current) => (current.value, Expected::Version(current.version)),
                None => (YouthVolunteer::new(id.to_string(), name.to_string()), Expected::Absent),
            };

            match change {
                AvailabilityChange::Add => entry.availability.extend(slots.iter().copied()),
                AvailabilityChange::Remove => entry.availability.retain(|s| !slots.contains(s)),
                AvailabilityChange::Replace => entry.availability = slots.clone(),
            }
            entry.updated_at = Utc::now();

            match self.repo.save(&entry, expected).await {
                Ok(_) => {
                    info!(youth_id = %id, ?change, slots = entry.availability.len(), "Youth availability updated");
                    return Ok(entry);
                }
                Err(AppError::StoreConflict) => {
                    warn!(youth_id = %id, attempt, "Youth entry changed during write, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict("Your availability changed elsewhere. Please reload.".into()))
    }

    pub async fn add_availability(&self, id: &str, name: &str, slots: &[String]) -> Result<YouthVolunteer, AppError> {
        self.update_availability(id, name, AvailabilityChange::Add, slots).await
    }

    pub async fn remove_availability(&self, id: &str, name: &str, slots: &[String]) -> Result<YouthVolunteer, AppError> {
        self.update_availability(id, name, AvailabilityChange::Remove, slots).await
    }

    pub async fn set_availability(&self, id: &str, name: &str, slots: &[String]) -> Result<YouthVolunteer, AppError> {
        self.update_availability(id, name, AvailabilityChange::Replace, slots).await
    }

    pub async fn list(&self) -> Result<Vec<YouthVolunteer>, AppError> {
        Ok(self.repo.roster().await?.members)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Youth volunteer not found".into()));
        }
        info!(youth_id = %id, "Youth volunteer removed");
        Ok(())
    }
}
