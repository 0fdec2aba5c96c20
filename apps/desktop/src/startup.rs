//! Startup checks against the player account.

use anyhow::Context;
use nosilence_player::{PlayerClient, UserProfile};
use nosilence_settings::Settings;
use std::time::Duration;

pub const AUTH_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Confirm the account is reachable. A rejected credential fails at once;
/// anything else gets one more try after [`AUTH_RETRY_DELAY`].
pub async fn verify_login(player: &dyn PlayerClient) -> anyhow::Result<UserProfile> {
    match player.current_user().await {
        Ok(user) => Ok(user),
        Err(e) if e.is_auth() => {
            Err(anyhow::Error::new(e).context("Spotify rejected the stored credentials"))
        }
        Err(e) => {
            tracing::warn!(
                "Spotify authentication check failed: {}. Retrying in {}s",
                e,
                AUTH_RETRY_DELAY.as_secs()
            );
            tokio::time::sleep(AUTH_RETRY_DELAY).await;
            player
                .current_user()
                .await
                .context("Spotify authentication failed after retry")
        }
    }
}

/// With no device configured, adopt the first one the account reports.
pub async fn adopt_default_device(settings: &Settings, player: &dyn PlayerClient) {
    if let Some(name) = settings.player_device() {
        tracing::info!("using player device '{}'", name);
        return;
    }

    match player.list_devices().await {
        Ok(devices) => match devices.into_iter().find(|d| !d.name.trim().is_empty()) {
            Some(device) => {
                tracing::info!("no device configured, using '{}'", device.name);
                settings.set_player_device(device.name);
            }
            None => tracing::warn!(
                "no player device configured and none online; set one with 'device <name>'"
            ),
        },
        Err(e) => tracing::warn!("could not list player devices: {}", e),
    }
}
