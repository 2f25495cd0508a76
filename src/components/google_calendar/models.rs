/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    /// `useDefault` flag of the event's reminders block, if one was present
    pub reminders_use_default: Option<bool>,
    pub reminder_overrides: Vec<ReminderOverride>,
}

/// A per-event reminder override
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

/// One calendar's slice of a poll window
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventsPage {
    pub items: Vec<CalendarEvent>,
    /// Lead time from the calendar's own `defaultReminders` setting, if any
    pub default_reminder_minutes: Option<i64>,
}
