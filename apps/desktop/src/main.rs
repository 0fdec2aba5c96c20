mod console;
mod login;
mod startup;

use anyhow::Context;
use nosilence_application::{MonitorLoop, MonitorPoller, ResumeOrchestrator};
use nosilence_detect::{AudioSampler, OutputVolume, PlatformOutputVolume, PlatformSessionSource, SessionSource};
use nosilence_events::TracingStatusSink;
use nosilence_player::{Credentials, PlayerClient, Retrying, SpotifyAuth, SpotifyClient};
use nosilence_settings::{paths, Settings};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,nosilence=debug")),
        )
        .init();

    tracing::info!("Starting NoSilence");

    let config_dir = paths::config_dir();
    paths::ensure_dir(&config_dir)
        .with_context(|| format!("cannot create config directory {}", config_dir.display()))?;

    let settings = Arc::new(Settings::load(paths::config_file()));

    let credentials = Credentials::load(&paths::secrets_file())?;
    let auth = Arc::new(SpotifyAuth::new(credentials, paths::token_cache_file())?);
    if !auth.has_token().await {
        login::interactive(&auth).await?;
    }

    let player: Arc<dyn PlayerClient> = Arc::new(Retrying::new(SpotifyClient::new(auth.clone())?));

    let user = startup::verify_login(player.as_ref()).await?;
    tracing::info!("authenticated with Spotify as {}", user.name());

    startup::adopt_default_device(&settings, player.as_ref()).await;

    if cfg!(not(windows)) {
        tracing::warn!("audio session monitoring is only available on Windows; running without a mixer");
    }
    let sessions: Arc<dyn SessionSource> = Arc::new(PlatformSessionSource::default());
    let output: Arc<dyn OutputVolume> = Arc::new(PlatformOutputVolume::default());

    let sampler = AudioSampler::new(sessions, settings.player_process());
    let orchestrator = ResumeOrchestrator::new(player, output, settings.clone());
    let monitor = MonitorLoop::new(
        settings.clone(),
        sampler,
        orchestrator,
        Arc::new(TracingStatusSink),
    );

    let mut poller = MonitorPoller::new();
    poller.start(monitor);

    let (quit_tx, mut quit_rx) = tokio::sync::mpsc::unbounded_channel();
    console::spawn(settings.clone(), quit_tx);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
        _ = quit_rx.recv() => tracing::info!("quit requested"),
    }

    poller.stop().await;
    tracing::info!("NoSilence stopped");
    Ok(())
}
