use serde::Deserialize;
use crate::domain::models::booking::Booking;
use crate::domain::services::booking_service::BookingRequest;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub slot: String,
    pub contact_method: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    pub reminder_email: Option<String>,
    #[serde(default)]
    pub captcha_token: String,
    pub captcha_score_token: Option<String>,
}

impl CreateBookingRequest {
    pub fn booking_request(&self) -> BookingRequest {
        BookingRequest {
            slot: self.slot.clone(),
            contact_method: self.contact_method.clone(),
            name: self.name.clone(),
            contact: self.contact.clone(),
            reminder_email: self.reminder_email.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualBookingRequest {
    pub slot: String,
    pub contact_method: Option<String>,
    pub name: String,
    pub contact: String,
    pub reminder_email: Option<String>,
    pub force_volunteer_id: Option<String>,
}

impl ManualBookingRequest {
    pub fn into_parts(self) -> (BookingRequest, Option<String>) {
        let request = BookingRequest {
            slot: self.slot,
            contact_method: self.contact_method,
            name: self.name,
            contact: self.contact,
            reminder_email: self.reminder_email,
        };
        (request, self.force_volunteer_id)
    }
}

#[derive(Deserialize)]
pub struct ReplaceBookingsRequest {
    pub bookings: Vec<Booking>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBySlotQuery {
    pub volunteer_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub slots: Vec<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}
