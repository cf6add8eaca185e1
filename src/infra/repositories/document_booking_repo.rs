use std::sync::Arc;
use crate::domain::models::booking::{legacy_slot_mirror, Booking, BookingSnapshot};
use crate::domain::ports::{BookingRepository, DocumentStore, Expected};
use crate::error::AppError;
use async_trait::async_trait;
use tracing::{debug, warn};

pub const BOOKINGS_KEY: &str = "bookings:v2";
/// Plain list of slot identifiers, kept for older readers.
pub const LEGACY_SLOTS_KEY: &str = "bookings";

pub struct DocumentBookingRepo {
    store: Arc<dyn DocumentStore>,
}

impl DocumentBookingRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Writes the list and its slot mirror together.
    async fn write(&self, bookings: &[Booking], expected: Expected) -> Result<i64, AppError> {
        let json = encode(bookings)?;
        let mirror = serde_json::to_string(&legacy_slot_mirror(bookings))
            .map_err(|e| AppError::InternalWithMsg(format!("Legacy slot mirror serialization failed: {}", e)))?;
        self.store.set_linked(BOOKINGS_KEY, &json, expected, LEGACY_SLOTS_KEY, &mirror).await
    }
}

fn encode(bookings: &[Booking]) -> Result<String, AppError> {
    serde_json::to_string(bookings)
        .map_err(|e| AppError::InternalWithMsg(format!("Booking serialization failed: {}", e)))
}

#[async_trait]
impl BookingRepository for DocumentBookingRepo {
    async fn snapshot(&self) -> Result<BookingSnapshot, AppError> {
        let Some(doc) = self.store.get(BOOKINGS_KEY).await? else {
            return Ok(BookingSnapshot::default());
        };

        let bookings: Vec<Booking> = serde_json::from_str(&doc.value)
            .map_err(|e| AppError::InternalWithMsg(format!("Stored booking list is unreadable: {}", e)))?;

        Ok(BookingSnapshot { bookings, version: doc.version })
    }

    async fn commit(&self, bookings: &[Booking], expected_version: i64) -> Result<i64, AppError> {
        let version = self.write(bookings, Expected::from_version(expected_version)).await?;
        debug!(version, count = bookings.len(), "Booking list committed");
        Ok(version)
    }

    async fn overwrite(&self, bookings: &[Booking]) -> Result<i64, AppError> {
        let version = self.write(bookings, Expected::Any).await?;
        warn!(version, count = bookings.len(), "Booking list overwritten");
        Ok(version)
    }
}
