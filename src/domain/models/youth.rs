use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use crate::domain::models::slot::SlotId;

/// A chat-platform volunteer who manages their own availability, one
/// half-hour at a time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YouthVolunteer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub availability: BTreeSet<SlotId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl YouthVolunteer {
    pub fn new(id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            availability: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Snapshot of the youth roster in registration order.
#[derive(Debug, Clone, Default)]
pub struct YouthRoster {
    pub members: Vec<YouthVolunteer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityChange {
    Add,
    Remove,
    Replace,
}
