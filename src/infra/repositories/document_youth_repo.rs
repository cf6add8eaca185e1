use std::sync::Arc;
use crate::domain::models::youth::{YouthRoster, YouthVolunteer};
use crate::domain::ports::{DocumentStore, Expected, StoredDocument, Versioned, YouthRosterRepository};
use crate::error::AppError;
use async_trait::async_trait;
use tracing::warn;

pub const YOUTH_ROSTER_KEY: &str = "youth_volunteers";

pub struct DocumentYouthRepo {
    store: Arc<dyn DocumentStore>,
}

impl DocumentYouthRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn decode(doc: &StoredDocument) -> Result<YouthVolunteer, AppError> {
    serde_json::from_str(&doc.value)
        .map_err(|e| AppError::InternalWithMsg(format!("Youth roster entry is unreadable: {}", e)))
}

#[async_trait]
impl YouthRosterRepository for DocumentYouthRepo {
    async fn roster(&self) -> Result<YouthRoster, AppError> {
        let mut members = Vec::new();
        for (field, doc) in self.store.get_fields(YOUTH_ROSTER_KEY).await? {
            match decode(&doc) {
                Ok(entry) => members.push(entry),
                // One bad entry should not take chat bookings down for everyone.
                Err(e) => warn!("Skipping youth roster entry {}: {:?}", field, e),
            }
        }

        // Registration order is the tie-break order.
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(YouthRoster { members })
    }

    async fn find(&self, id: &str) -> Result<Option<Versioned<YouthVolunteer>>, AppError> {
        match self.store.get_field(YOUTH_ROSTER_KEY, id).await? {
            Some(doc) => Ok(Some(Versioned { value: decode(&doc)?, version: doc.version })),
            None => Ok(None),
        }
    }

    async fn save(&self, entry: &YouthVolunteer, expected: Expected) -> Result<i64, AppError> {
        let json = serde_json::to_string(entry)
            .map_err(|e| AppError::InternalWithMsg(format!("Youth roster serialization failed: {}", e)))?;
        self.store.set_field(YOUTH_ROSTER_KEY, &entry.id, &json, expected).await
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.store.delete_field(YOUTH_ROSTER_KEY, id).await
    }
}
