//! Spotify Web API implementation of [`PlayerClient`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    http_client, Device, Playback, PlayerClient, PlayerError, Result, TokenProvider, UserProfile,
    REQUEST_TIMEOUT,
};

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com";

#[derive(Deserialize)]
struct DevicesResponse {
    devices: Vec<Device>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SpotifyClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Ok(Self {
            http: http_client(REQUEST_TIMEOUT)?,
            api_base: DEFAULT_API_BASE.to_string(),
            tokens,
        })
    }

    /// Replace the default [`REQUEST_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.api_base, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        check_status(response).await
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    let code = status.as_u16();
    tracing::debug!(status = code, "player api error: {}", message);

    Err(match status {
        StatusCode::NOT_FOUND => PlayerError::NotFound {
            status: code,
            message,
        },
        StatusCode::UNAUTHORIZED => PlayerError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => PlayerError::Unavailable { status: code },
        // Includes 403, which the player uses for playback restrictions
        // (Premium required), not for bad credentials.
        _ => PlayerError::Api {
            status: code,
            message,
        },
    })
}

#[async_trait]
impl PlayerClient for SpotifyClient {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        let response = self
            .send(self.http.get(self.url("/me/player/devices")))
            .await?;
        let devices: DevicesResponse = response.json().await?;
        Ok(devices.devices)
    }

    async fn current_playback(&self) -> Result<Option<Playback>> {
        let response = self.send(self.http.get(self.url("/me/player"))).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn resume(&self, device_id: &str) -> Result<()> {
        let request = self
            .http
            .put(self.url("/me/player/play"))
            .query(&[("device_id", device_id)])
            .json(&serde_json::json!({}));
        self.send(request).await?;
        Ok(())
    }

    async fn start_context(&self, device_id: &str, context_uri: &str) -> Result<()> {
        let request = self
            .http
            .put(self.url("/me/player/play"))
            .query(&[("device_id", device_id)])
            .json(&serde_json::json!({ "context_uri": context_uri }));
        self.send(request).await?;
        Ok(())
    }

    async fn set_volume(&self, percent: u8, device_id: &str) -> Result<()> {
        let percent = percent.min(100).to_string();
        let request = self
            .http
            .put(self.url("/me/player/volume"))
            .query(&[("volume_percent", percent.as_str()), ("device_id", device_id)]);
        self.send(request).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile> {
        let response = self.send(self.http.get(self.url("/me"))).await?;
        Ok(response.json().await?)
    }
}
