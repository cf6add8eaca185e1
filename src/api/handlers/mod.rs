pub mod admin;
pub mod auth;
pub mod booking;
pub mod health;
pub mod slots;
pub mod volunteer;
pub mod youth;
