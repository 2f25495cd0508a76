use crate::config::Config;
use crate::error::{speech_error, AppResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

/// Issued tokens are valid for ten minutes; refresh with a margin
const TOKEN_LIFETIME_SECS: i64 = 540;

struct CachedToken {
    value: String,
    fetched_at: DateTime<Utc>,
}

/// Client for the Microsoft Cognitive Services text-to-speech API.
///
/// Synthesis requests carry a short-lived bearer token issued against the
/// subscription key; the token is cached and re-issued once it ages out.
pub struct SpeechSynthesizer {
    client: Client,
    subscription_key: String,
    token_url: String,
    synthesis_url: String,
    voice: String,
    language: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpeechSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            subscription_key: config.speech_api_key.clone(),
            token_url: format!(
                "https://{}.api.cognitive.microsoft.com/sts/v1.0/issueToken",
                config.speech_region
            ),
            synthesis_url: format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                config.speech_region
            ),
            voice: config.speech_voice.clone(),
            language: config.speech_language.clone(),
            token: Mutex::new(None),
        }
    }

    /// Synthesize `text` into 16 kHz mono RIFF WAV bytes
    pub async fn synthesize(&self, text: &str) -> AppResult<Vec<u8>> {
        let token = self.access_token().await?;
        let body = self.ssml(text);

        let response = self
            .client
            .post(&self.synthesis_url)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", "riff-16khz-16bit-mono-pcm")
            .header("Authorization", format!("Bearer {}", token))
            .header("User-Agent", "kuuluttaja")
            .body(body)
            .send()
            .await
            .map_err(|e| speech_error(&format!("Failed to submit synthesis request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            // The cached token may have been revoked; re-issue on next call
            *self.token.lock().await = None;
            return Err(speech_error(&format!(
                "Synthesis request failed: HTTP {}",
                status
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| speech_error(&format!("Failed to read synthesized audio: {}", e)))?;

        debug!("Synthesized {} bytes of audio", audio.len());

        Ok(audio.to_vec())
    }

    /// Get a bearer token, either cached or freshly issued
    async fn access_token(&self) -> AppResult<String> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if (Utc::now() - cached.fetched_at).num_seconds() < TOKEN_LIFETIME_SECS {
                return Ok(cached.value.clone());
            }
        }

        let response = self
            .client
            .post(&self.token_url)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .send()
            .await
            .map_err(|e| speech_error(&format!("Failed to request access token: {}", e)))?;

        if !response.status().is_success() {
            return Err(speech_error(&format!(
                "Access token request failed: HTTP {}",
                response.status()
            )));
        }

        let value = response
            .text()
            .await
            .map_err(|e| speech_error(&format!("Failed to read access token: {}", e)))?;

        debug!("Issued new speech access token");

        *guard = Some(CachedToken {
            value: value.clone(),
            fetched_at: Utc::now(),
        });

        Ok(value)
    }

    fn ssml(&self, text: &str) -> String {
        format!(
            "<speak version='1.0' xml:lang='{lang}'><voice xml:lang='{lang}' name='{voice}'>{text}</voice></speak>",
            lang = self.language,
            voice = self.voice,
            text = escape_xml(text),
        )
    }
}

/// Escape the characters that would break the SSML document
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
