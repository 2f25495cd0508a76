use crate::error::AppResult;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;

// Export components
pub mod audio_cues;
pub mod google_calendar;
pub mod ir_remote;
pub mod speech;

// Re-export the concrete collaborators
pub use audio_cues::AudioCues;
pub use google_calendar::GoogleCalendarClient;
pub use speech::SpeechAnnouncer;

use google_calendar::models::EventsPage;

/// Source of calendar events for one poll window.
///
/// Implementations return every non-cancelled event whose start falls in
/// `[time_min, time_max]`, expanded to single events, together with the
/// calendar's own default reminder lead time when it surfaces one.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> AppResult<EventsPage>;
}

/// Speaks a short text aloud. The call returns once playback has finished,
/// so the polling loop stays strictly sequential.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn speak(&self, text: &str) -> AppResult<()>;
}

/// Auxiliary cues framing an announcement: whatever must happen right
/// before the first word and right after the last one.
#[async_trait]
pub trait AnnounceCues: Send + Sync {
    async fn begin_announcement(&self) -> AppResult<()>;
    async fn end_announcement(&self) -> AppResult<()>;
}
