pub mod assignment;
pub mod auth_service;
pub mod booking_service;
pub mod calendar;
pub mod notification_service;
pub mod origin_gate;
pub mod projection;
pub mod roster;
pub mod youth_service;
