//! Remote control of the music player.
//!
//! [`PlayerClient`] is the seam the resume orchestrator talks to. The
//! production implementation is [`SpotifyClient`] (Spotify Web API), always
//! wrapped in [`Retrying`] so transient network failures are absorbed before
//! they reach the caller.

mod auth;
mod error;
mod retry;
mod spotify;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use auth::{
    code_from_redirect, Credentials, SpotifyAuth, StaticToken, TokenCache, TokenProvider,
    DEFAULT_REDIRECT_URI, SCOPES,
};
pub use error::{PlayerError, Result};
pub use retry::{RetryPolicy, Retrying, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
pub use spotify::{SpotifyClient, DEFAULT_API_BASE};

/// Upper bound on a single HTTP exchange with the player service.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// A playback device known to the player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque identifier used by playback calls. Some restricted devices have
    /// none; those can't be targeted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            is_active: false,
            kind: None,
            volume_percent: None,
        }
    }
}

/// Current playback state, when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    pub is_playing: bool,
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub context: Option<PlaybackContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackContext {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Display name, or the account id when the profile has none.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Remote player operations.
#[async_trait]
pub trait PlayerClient: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// `None` when nothing is loaded on any device.
    async fn current_playback(&self) -> Result<Option<Playback>>;

    /// Resume the previous context on `device_id`.
    async fn resume(&self, device_id: &str) -> Result<()>;

    /// Start playing `context_uri` (playlist, album, ...) on `device_id`.
    async fn start_context(&self, device_id: &str, context_uri: &str) -> Result<()>;

    async fn set_volume(&self, percent: u8, device_id: &str) -> Result<()>;

    /// Profile of the authenticated account. Used as the startup auth check.
    async fn current_user(&self) -> Result<UserProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_deserializes_api_shape() {
        let json = r#"{
            "id": "abc123",
            "is_active": true,
            "is_private_session": false,
            "is_restricted": false,
            "name": "DESKTOP-PC",
            "type": "Computer",
            "volume_percent": 54
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.id.as_deref(), Some("abc123"));
        assert_eq!(device.name, "DESKTOP-PC");
        assert!(device.is_active);
        assert_eq!(device.kind.as_deref(), Some("Computer"));
        assert_eq!(device.volume_percent, Some(54));
    }

    #[test]
    fn test_restricted_device_without_id() {
        let json = r#"{"id": null, "name": "Speaker", "volume_percent": null}"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert!(device.id.is_none());
        assert!(!device.is_active);
    }

    #[test]
    fn test_user_name_falls_back_to_id() {
        let user = UserProfile {
            id: "user-1".to_string(),
            display_name: None,
        };
        assert_eq!(user.name(), "user-1");
    }
}
