use crate::components::ir_remote::IrRemote;
use crate::components::speech::AudioPlayer;
use crate::components::AnnounceCues;
use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Key simulated before an announcement
pub const KEY_START_ANNOUNCE: &str = "KEY_START_ANNOUNCE";
/// Key simulated after an announcement
pub const KEY_END_ANNOUNCE: &str = "KEY_END_ANNOUNCE";

/// Frames every announcement with IR commands and jingles: warn the audio
/// controller, give it a moment to switch over, play the intro jingle,
/// and mirror the sequence on the way out.
pub struct AudioCues {
    player: Arc<AudioPlayer>,
    ir: IrRemote,
    intro_cue: PathBuf,
    outro_cue: PathBuf,
    start_scancode: String,
    end_scancode: String,
}

impl AudioCues {
    pub fn new(config: &Config, player: Arc<AudioPlayer>) -> Self {
        Self {
            player,
            ir: IrRemote::new(config),
            intro_cue: PathBuf::from(&config.intro_cue_path),
            outro_cue: PathBuf::from(&config.outro_cue_path),
            start_scancode: config.ir_start_scancode.clone(),
            end_scancode: config.ir_end_scancode.clone(),
        }
    }
}

#[async_trait]
impl AnnounceCues for AudioCues {
    async fn begin_announcement(&self) -> AppResult<()> {
        self.ir.simulate(&self.start_scancode, KEY_START_ANNOUNCE).await?;
        // Give the amplifier a moment before any sound comes out
        sleep(Duration::from_secs(1)).await;
        self.player.play_file(&self.intro_cue).await
    }

    async fn end_announcement(&self) -> AppResult<()> {
        sleep(Duration::from_secs(1)).await;
        self.player.play_file(&self.outro_cue).await?;
        sleep(Duration::from_secs(1)).await;
        self.ir.simulate(&self.end_scancode, KEY_END_ANNOUNCE).await
    }
}
