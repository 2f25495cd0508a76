use super::models::{CalendarEvent, EventsPage, ReminderOverride};
use super::token::TokenManager;
use crate::components::EventSource;
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Client for the Google Calendar v3 events API
pub struct GoogleCalendarClient {
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            token_manager: TokenManager::new(config),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> AppResult<EventsPage> {
        // Get authentication token
        let token = self.token_manager.get_token().await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| google_calendar_error("No access token available"))?;

        // Build URL with query parameters
        let url_str = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            calendar_id
        );

        let mut url = Url::parse(&url_str)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        let mut query_params = HashMap::new();
        query_params.insert("timeMin", time_min.to_rfc3339());
        query_params.insert("timeMax", time_max.to_rfc3339());
        query_params.insert("singleEvents", "true".to_string());
        query_params.insert("orderBy", "startTime".to_string());

        for (key, value) in query_params {
            url.query_pairs_mut().append_pair(key, &value);
        }

        // Make API request
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        // Convert to CalendarEvent objects. An empty items list is a valid
        // response for a calendar with nothing in the window.
        let items = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .map(|events| events.iter().map(parse_event).collect())
            .unwrap_or_default();

        // Grab the default reminder lead time from calendar settings
        let default_reminder_minutes = response_data
            .get("defaultReminders")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
            .and_then(|r| r.get("minutes"))
            .and_then(|m| m.as_i64());

        debug!("Fetched events from calendar {}", calendar_id);

        Ok(EventsPage {
            items,
            default_reminder_minutes,
        })
    }
}

/// Flatten one API event object into our representation
fn parse_event(event: &serde_json::Value) -> CalendarEvent {
    let id = event
        .get("id")
        .and_then(|id| id.as_str())
        .unwrap_or("")
        .to_string();
    let summary = event
        .get("summary")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());
    let description = event
        .get("description")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());

    let start_date_time = event
        .get("start")
        .and_then(|start| start.as_object())
        .and_then(|start| start.get("dateTime"))
        .and_then(|dt| dt.as_str())
        .map(|s| s.to_string());

    let start_date = event
        .get("start")
        .and_then(|start| start.as_object())
        .and_then(|start| start.get("date"))
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    let reminders_use_default = event
        .get("reminders")
        .and_then(|r| r.get("useDefault"))
        .and_then(|u| u.as_bool());

    let reminder_overrides = event
        .get("reminders")
        .and_then(|r| r.get("overrides"))
        .and_then(|o| o.as_array())
        .map(|overrides| {
            overrides
                .iter()
                .map(|o| ReminderOverride {
                    method: o
                        .get("method")
                        .and_then(|m| m.as_str())
                        .unwrap_or("")
                        .to_string(),
                    minutes: o.get("minutes").and_then(|m| m.as_i64()).unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default();

    CalendarEvent {
        id,
        summary,
        description,
        start_date_time,
        start_date,
        reminders_use_default,
        reminder_overrides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event_extracts_reminders() {
        let raw = json!({
            "id": "abc123",
            "summary": "Dentist",
            "description": "repeat",
            "start": { "dateTime": "2024-03-01T09:10:00+01:00" },
            "reminders": {
                "useDefault": false,
                "overrides": [
                    { "method": "email", "minutes": 60 },
                    { "method": "popup", "minutes": 10 }
                ]
            }
        });

        let event = parse_event(&raw);
        assert_eq!(event.id, "abc123");
        assert_eq!(event.summary.as_deref(), Some("Dentist"));
        assert_eq!(
            event.start_date_time.as_deref(),
            Some("2024-03-01T09:10:00+01:00")
        );
        assert_eq!(event.reminders_use_default, Some(false));
        assert_eq!(event.reminder_overrides.len(), 2);
        assert_eq!(event.reminder_overrides[1].method, "popup");
        assert_eq!(event.reminder_overrides[1].minutes, 10);
    }

    #[test]
    fn test_parse_event_tolerates_missing_fields() {
        let raw = json!({
            "id": "allday",
            "summary": "Holiday",
            "start": { "date": "2024-03-01" }
        });

        let event = parse_event(&raw);
        assert_eq!(event.start_date_time, None);
        assert_eq!(event.start_date.as_deref(), Some("2024-03-01"));
        assert_eq!(event.reminders_use_default, None);
        assert!(event.reminder_overrides.is_empty());
    }
}
