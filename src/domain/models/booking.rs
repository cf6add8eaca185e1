use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use crate::domain::models::slot::{ContactMethod, SlotId};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub slot: SlotId,
    pub contact_method: ContactMethod,
    pub name: String,
    /// Phone number, email or chat handle depending on `contact_method`.
    pub contact: String,
    #[serde(default)]
    pub reminder_email: Option<String>,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

pub struct NewBookingParams {
    pub slot: SlotId,
    pub contact_method: ContactMethod,
    pub name: String,
    pub contact: String,
    pub reminder_email: Option<String>,
    pub volunteer_id: String,
    pub volunteer_name: String,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slot: params.slot,
            contact_method: params.contact_method,
            name: params.name,
            contact: params.contact,
            reminder_email: params.reminder_email,
            volunteer_id: params.volunteer_id,
            volunteer_name: params.volunteer_name,
            created_at: Utc::now(),
            completed: false,
            completed_at: None,
            completed_by: None,
            reminder_sent_at: None,
        }
    }

    /// Email to notify, if any: the explicit reminder address, falling back
    /// to the contact detail for video bookings.
    pub fn notification_email(&self) -> Option<&str> {
        self.reminder_email.as_deref().or(match self.contact_method {
            ContactMethod::Video => Some(self.contact.as_str()),
            _ => None,
        })
    }
}

/// The booking list as read from the store, with the version it was read at.
#[derive(Debug, Clone, Default)]
pub struct BookingSnapshot {
    pub bookings: Vec<Booking>,
    pub version: i64,
}

/// Slot identifiers of every booking, in list order. This is the shape older
/// consumers of the store still read.
pub fn legacy_slot_mirror(bookings: &[Booking]) -> Vec<String> {
    bookings.iter().map(|b| b.slot.to_string()).collect()
}
