use crate::domain::models::{
    booking::{Booking, BookingSnapshot},
    youth::{YouthRoster, YouthVolunteer},
};
use crate::error::AppError;
use async_trait::async_trait;

/// Write precondition for a versioned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Last write wins.
    Any,
    /// The document must not exist yet.
    Absent,
    /// The stored version must still be this one.
    Version(i64),
}

impl Expected {
    /// Version 0 stands for "never written".
    pub fn from_version(version: i64) -> Self {
        if version == 0 { Expected::Absent } else { Expected::Version(version) }
    }
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub value: String,
    pub version: i64,
}

#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

/// Key-value document store. Whole documents live under a key; hash-style
/// entries live under `(key, field)`. Conditional writes fail with
/// `AppError::StoreConflict`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredDocument>, AppError>;
    async fn set(&self, key: &str, value: &str, expected: Expected) -> Result<i64, AppError>;
    /// Conditional write of `key` that also overwrites `linked_key` in the
    /// same transaction. Nothing is written when the condition fails.
    async fn set_linked(&self, key: &str, value: &str, expected: Expected, linked_key: &str, linked_value: &str) -> Result<i64, AppError>;
    async fn get_field(&self, key: &str, field: &str) -> Result<Option<StoredDocument>, AppError>;
    async fn get_fields(&self, key: &str) -> Result<Vec<(String, StoredDocument)>, AppError>;
    async fn set_field(&self, key: &str, field: &str, value: &str, expected: Expected) -> Result<i64, AppError>;
    async fn delete_field(&self, key: &str, field: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn snapshot(&self) -> Result<BookingSnapshot, AppError>;
    /// Replaces the list only if it is still at `expected_version`.
    async fn commit(&self, bookings: &[Booking], expected_version: i64) -> Result<i64, AppError>;
    async fn overwrite(&self, bookings: &[Booking]) -> Result<i64, AppError>;
}

#[async_trait]
pub trait YouthRosterRepository: Send + Sync {
    async fn roster(&self) -> Result<YouthRoster, AppError>;
    async fn find(&self, id: &str) -> Result<Option<Versioned<YouthVolunteer>>, AppError>;
    async fn save(&self, entry: &YouthVolunteer, expected: Expected) -> Result<i64, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

/// Bot-mitigation check. `verify_scored` returns `None` when no scored check
/// is configured or the scoring service cannot be reached; when it is
/// configured, an empty token scores `0.0`.
#[async_trait]
pub trait VerificationGate: Send + Sync {
    async fn verify(&self, token: &str) -> Result<bool, AppError>;
    async fn verify_scored(&self, token: &str) -> Result<Option<f64>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}
