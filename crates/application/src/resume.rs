//! Resume orchestration: pick the device, restore volumes, start playback.

use nosilence_detect::{DetectError, OutputVolume};
use nosilence_player::{PlayerClient, PlayerError};
use nosilence_settings::Settings;
use std::sync::Arc;

/// What ended up playing after a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSource {
    PreviousContext,
    Dj,
    FallbackPlaylist,
}

impl ResumeSource {
    pub fn label(&self) -> &'static str {
        match self {
            ResumeSource::PreviousContext => "previous playback",
            ResumeSource::Dj => "DJ",
            ResumeSource::FallbackPlaylist => "fallback playlist",
        }
    }
}

impl std::fmt::Display for ResumeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No device configured, or the configured one is not online.
    DeviceNotFound,
    AlreadyPlaying,
    Resumed(ResumeSource),
}

#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    #[error("player: {0}")]
    Player(#[from] PlayerError),
    #[error("output volume: {0}")]
    OutputVolume(#[from] DetectError),
}

pub type Result<T> = std::result::Result<T, ResumeError>;

pub struct ResumeOrchestrator {
    player: Arc<dyn PlayerClient>,
    output: Arc<dyn OutputVolume>,
    settings: Arc<Settings>,
}

impl ResumeOrchestrator {
    pub fn new(
        player: Arc<dyn PlayerClient>,
        output: Arc<dyn OutputVolume>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            player,
            output,
            settings,
        }
    }

    /// Bring the player back after an interruption.
    ///
    /// Any failed step aborts the attempt; nothing is retried at this level.
    pub async fn resume(&self) -> Result<ResumeOutcome> {
        let Some(device_id) = self.find_device().await? else {
            return Ok(ResumeOutcome::DeviceNotFound);
        };

        if self.settings.apply_output_volume() {
            self.output.set(self.settings.output_volume())?;
        }

        if let Some(playback) = self.player.current_playback().await? {
            if playback.is_playing {
                tracing::debug!("player already playing, nothing to resume");
                return Ok(ResumeOutcome::AlreadyPlaying);
            }
        }

        let source = self.start_playback(&device_id).await?;
        tracing::info!(device_id = %device_id, "started {}", source);

        if self.settings.apply_player_volume() {
            self.player
                .set_volume(self.settings.player_volume(), &device_id)
                .await?;
        }

        Ok(ResumeOutcome::Resumed(source))
    }

    async fn find_device(&self) -> Result<Option<String>> {
        let Some(name) = self.settings.player_device() else {
            tracing::warn!("no player device configured");
            return Ok(None);
        };

        let devices = self.player.list_devices().await?;
        let id = devices
            .into_iter()
            .find(|d| d.name == name)
            .and_then(|d| d.id);

        if id.is_none() {
            tracing::warn!("device '{}' not found", name);
        }
        Ok(id)
    }

    /// Previous context, then DJ, then the fallback playlist. Only a
    /// not-found moves on to the next option.
    async fn start_playback(&self, device_id: &str) -> Result<ResumeSource> {
        match self.player.resume(device_id).await {
            Ok(()) => return Ok(ResumeSource::PreviousContext),
            Err(e) if e.is_not_found() => {
                tracing::info!("no resume context, attempting DJ");
            }
            Err(e) => return Err(e.into()),
        }

        let dj = self.settings.dj_context_uri();
        match self.player.start_context(device_id, &dj).await {
            Ok(()) => return Ok(ResumeSource::Dj),
            Err(e) if e.is_not_found() => {
                tracing::info!("DJ unavailable, starting fallback playlist");
            }
            Err(e) => return Err(e.into()),
        }

        let playlist = self.settings.fallback_playlist_uri();
        self.player.start_context(device_id, &playlist).await?;
        Ok(ResumeSource::FallbackPlaylist)
    }
}
