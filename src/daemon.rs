//! The polling loop: fetch, evaluate, announce, sleep, repeat.

use crate::components::google_calendar::models::CalendarEvent;
use crate::components::{AnnounceCues, Announcer, EventSource};
use crate::config::Config;
use crate::error::AppResult;
use crate::reminder::{evaluate, DueReminder};
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Owns the poll cycle and the announcement sequence. All collaborators
/// arrive through the constructor so tests can substitute them.
pub struct PollDaemon {
    config: Arc<Config>,
    tz: Tz,
    source: Arc<dyn EventSource>,
    announcer: Arc<dyn Announcer>,
    cues: Arc<dyn AnnounceCues>,
}

impl PollDaemon {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn EventSource>,
        announcer: Arc<dyn Announcer>,
        cues: Arc<dyn AnnounceCues>,
    ) -> AppResult<Self> {
        let tz = config.tz()?;
        Ok(Self {
            config,
            tz,
            source,
            announcer,
            cues,
        })
    }

    /// Run the polling loop until the process is stopped.
    ///
    /// A failed cycle never ends the loop: retryable failures are expected
    /// from time to time and back off quietly, anything else is logged
    /// loudly as a likely bug and the loop carries on regardless.
    pub async fn run(&self) {
        info!("Starting calendar polling and announcement loop");

        loop {
            match self.run_cycle().await {
                Ok(()) => {
                    sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        "Cycle failed, retrying in {} seconds: {}",
                        self.config.retry_backoff_secs, e
                    );
                    sleep(Duration::from_secs(self.config.retry_backoff_secs)).await;
                }
                Err(e) => {
                    error!("Unexpected error in polling loop, likely a bug: {:?}", e);
                    sleep(Duration::from_secs(self.config.retry_backoff_secs)).await;
                }
            }
        }
    }

    /// One poll cycle: fetch the window from every calendar, evaluate,
    /// announce whatever is due.
    pub async fn run_cycle(&self) -> AppResult<()> {
        debug!("Checking calendars...");

        let now = Utc::now().with_timezone(&self.tz);
        let time_max = now + ChronoDuration::days(self.config.lookahead_days);

        let (events, default_lead) = collect_events(
            self.source.as_ref(),
            &self.config.calendar_ids,
            now,
            time_max,
            self.config.reminder_minutes_default,
        )
        .await?;

        let due = evaluate(&events, now, default_lead);
        debug!("Checked {} events, {} due", events.len(), due.len());

        for reminder in due {
            info!(
                "Event starting in {} minutes. Announcing '{}'...",
                reminder.lead_minutes, reminder.spoken_name
            );
            self.announce(&reminder).await?;
        }

        Ok(())
    }

    /// The full announcement sequence for one due reminder
    async fn announce(&self, reminder: &DueReminder) -> AppResult<()> {
        self.cues.begin_announcement().await?;

        self.announcer.speak(&reminder.spoken_name).await?;
        self.announcer.speak(&self.config.repeat_phrase).await?;
        self.announcer.speak(&reminder.spoken_name).await?;

        self.cues.end_announcement().await?;

        if !reminder.repeat {
            // Hold until the minute rolls over so no second poll can land
            // inside the same matching minute and re-announce the event.
            // Assumes the announcement finished within that minute; see
            // DESIGN.md for the edge case.
            let now = Utc::now().with_timezone(&self.tz);
            sleep(Duration::from_secs(seconds_until_next_minute(&now))).await;
        }

        Ok(())
    }
}

/// Fetch and merge the poll window from every configured calendar.
///
/// The default lead time starts at the configured fallback; every calendar
/// that surfaces its own default overwrites it, so the last one seen wins.
pub async fn collect_events(
    source: &dyn EventSource,
    calendar_ids: &[String],
    time_min: DateTime<Tz>,
    time_max: DateTime<Tz>,
    fallback_lead_minutes: i64,
) -> AppResult<(Vec<CalendarEvent>, i64)> {
    let mut events = Vec::new();
    let mut default_lead = fallback_lead_minutes;

    for calendar_id in calendar_ids {
        let page = source.list_events(calendar_id, time_min, time_max).await?;
        events.extend(page.items);

        if let Some(minutes) = page.default_reminder_minutes {
            default_lead = minutes;
        }
    }

    Ok((events, default_lead))
}

/// Seconds left in the current wall-clock minute, always at least one
pub fn seconds_until_next_minute(now: &DateTime<Tz>) -> u64 {
    60 - u64::from(now.second()).min(59)
}
