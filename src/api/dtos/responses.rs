use serde::Serialize;
use crate::domain::models::booking::Booking;
use crate::domain::services::projection::DayView;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub timezone: String,
    pub days: Vec<DayView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmedResponse {
    pub success: bool,
    pub booking_id: String,
    pub slot: String,
    pub volunteer_name: String,
}

impl From<&Booking> for BookingConfirmedResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            success: true,
            booking_id: booking.id.clone(),
            slot: booking.slot.to_string(),
            volunteer_name: booking.volunteer_name.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

#[derive(Serialize)]
pub struct ReplacedResponse {
    pub count: usize,
}
