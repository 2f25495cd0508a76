//! Decides which events must be announced right now.
//!
//! This module is deliberately pure: given the merged event list, the
//! current time and a default lead time, it reads no clock, performs no
//! I/O and logs nothing, so every decision is reproducible in tests.

use crate::components::google_calendar::models::CalendarEvent;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use unicode_normalization::UnicodeNormalization;

/// Minute-granularity civil time, zone and seconds stripped
pub const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Description value marking an event as safe to re-announce
const REPEAT_TAG: &str = "repeat";

/// The only reminder override method that is honored
const POPUP_METHOD: &str = "popup";

/// An event whose announce instant matches the current minute
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub event: CalendarEvent,
    /// Event name flattened for speech synthesis
    pub spoken_name: String,
    /// Minutes before the event start the reminder fires at
    pub lead_minutes: i64,
    /// True when the event may be announced again on the next poll
    pub repeat: bool,
}

/// Select the events whose announce instant is `now`, at minute granularity.
///
/// Events without a summary or a dateTime-qualified start are skipped;
/// all-day events never fire. The match is an exact-minute comparison, so
/// an event whose trigger minute was missed is not announced late. Input
/// order is preserved in the output.
pub fn evaluate(
    events: &[CalendarEvent],
    now: DateTime<Tz>,
    default_lead_minutes: i64,
) -> Vec<DueReminder> {
    let mut due = Vec::new();

    for event in events {
        let Some(summary) = event.summary.as_deref() else {
            continue;
        };
        let Some(start_raw) = event.start_date_time.as_deref() else {
            continue;
        };
        // Malformed timestamps drop the event, not the cycle
        let Some(start_minute) = civil_minute(start_raw) else {
            continue;
        };

        let lead_minutes = resolve_lead(event, default_lead_minutes);
        let announce_minute = (now + Duration::minutes(lead_minutes))
            .format(MINUTE_FORMAT)
            .to_string();

        if start_minute == announce_minute {
            due.push(DueReminder {
                event: event.clone(),
                spoken_name: normalize_for_speech(summary),
                lead_minutes,
                repeat: is_repeat(event),
            });
        }
    }

    due
}

/// Resolve the effective lead time for one event.
///
/// A popup override wins when the event opted out of calendar defaults;
/// otherwise the caller-supplied default applies. The default is already
/// the calendar's own value when the source surfaced one, so every event
/// always resolves to exactly one lead time.
fn resolve_lead(event: &CalendarEvent, default_lead_minutes: i64) -> i64 {
    if event.reminders_use_default == Some(false) {
        if let Some(popup) = event
            .reminder_overrides
            .iter()
            .find(|o| o.method == POPUP_METHOD)
        {
            return popup.minutes;
        }
    }
    default_lead_minutes
}

/// True iff the description, case-folded, is exactly "repeat"
fn is_repeat(event: &CalendarEvent) -> bool {
    event
        .description
        .as_deref()
        .map(|d| d.to_lowercase() == REPEAT_TAG)
        .unwrap_or(false)
}

/// Flatten an event name into plain lowercase ASCII for speech synthesis.
///
/// Accented characters are decomposed and the combining marks dropped, so
/// "Réunion" becomes "reunion". Lossy on purpose; anything outside ASCII
/// after decomposition is discarded.
pub fn normalize_for_speech(name: &str) -> String {
    name.to_lowercase().nfkd().filter(char::is_ascii).collect()
}

/// Civil time of an RFC 3339 timestamp, truncated to the minute.
///
/// The zone designator is stripped, not converted: the comparison frame is
/// whatever civil time the source wrote, which matches the configured
/// polling timezone for same-zone calendars.
fn civil_minute(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_local().format(MINUTE_FORMAT).to_string())
}
