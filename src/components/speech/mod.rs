mod playback;
mod synthesizer;

pub use playback::AudioPlayer;
pub use synthesizer::SpeechSynthesizer;

use crate::components::Announcer;
use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Speech announcer backed by the Microsoft synthesis API and local playback
pub struct SpeechAnnouncer {
    synthesizer: SpeechSynthesizer,
    player: Arc<AudioPlayer>,
}

impl SpeechAnnouncer {
    pub fn new(config: &Config, player: Arc<AudioPlayer>) -> Self {
        Self {
            synthesizer: SpeechSynthesizer::new(config),
            player,
        }
    }
}

#[async_trait]
impl Announcer for SpeechAnnouncer {
    async fn speak(&self, text: &str) -> AppResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        debug!("Speaking '{}'", text);
        let audio = self.synthesizer.synthesize(text).await?;
        self.player.play_wav(audio).await
    }
}
