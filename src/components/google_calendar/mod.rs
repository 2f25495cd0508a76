mod client;
pub mod models;
pub mod token;

pub use client::GoogleCalendarClient;
pub use models::CalendarEvent;
