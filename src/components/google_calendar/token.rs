use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Manages the OAuth token stored on disk, refreshing it when it expires
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<Config>,
    token_path: PathBuf,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<Config>) -> Self {
        let token_path = PathBuf::from(&config.token_path);

        Self {
            config,
            token_path,
            client: Client::new(),
        }
    }

    /// Get OAuth token, either from disk or by refreshing an expired one
    pub async fn get_token(&self) -> AppResult<Value> {
        let token_str = match tokio::fs::read_to_string(&self.token_path).await {
            Ok(contents) => contents,
            Err(_) => {
                return Err(google_calendar_error(&format!(
                    "No stored token at {}. Run get_calendar_token to authorize first.",
                    self.token_path.display()
                )));
            }
        };

        let token: Value = serde_json::from_str(&token_str)
            .map_err(|e| google_calendar_error(&format!("Failed to parse token JSON: {}", e)))?;

        // Check if token is expired
        if let Some(expiry) = token.get("expires_at").and_then(|v| v.as_i64()) {
            let now = Utc::now().timestamp();
            if expiry > now {
                return Ok(token);
            }
            // Token is expired, refresh it
            return self.refresh_token(&token).await;
        }

        Err(google_calendar_error(
            "Stored token has no expiry. Run get_calendar_token to authorize again.",
        ))
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &Value) -> AppResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| google_calendar_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.config.google_client_id.clone()),
            ("client_secret", self.config.google_client_secret.clone()),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = new_token
            .get("access_token")
            .cloned()
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?;

        // Combine new access token with existing refresh token
        let mut token_data = serde_json::Map::new();
        token_data.insert("access_token".to_string(), access_token);
        token_data.insert("refresh_token".to_string(), json!(refresh_token));

        // Calculate expiry
        let expires_in = new_token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        let expires_at = Utc::now().timestamp() + expires_in;
        token_data.insert("expires_at".to_string(), json!(expires_at));

        let token_json = json!(token_data);
        self.write_token(&token_json).await?;

        Ok(token_json)
    }

    /// Persist a token to disk (also called by the authorization helper)
    pub async fn set_token(&self, token_json: Value) -> AppResult<()> {
        self.write_token(&token_json).await
    }

    async fn write_token(&self, token_json: &Value) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(token_json)
            .map_err(|e| google_calendar_error(&format!("Failed to serialize token: {}", e)))?;

        tokio::fs::write(&self.token_path, contents).await.map_err(|e| {
            google_calendar_error(&format!(
                "Failed to save token to {}: {}",
                self.token_path.display(),
                e
            ))
        })
    }
}
