//! Spotify authorization-code flow and token cache.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use crate::{http_client, PlayerError, Result, REQUEST_TIMEOUT};

pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
pub const DEFAULT_REDIRECT_URI: &str = "https://127.0.0.1:8888";
pub const SCOPES: &str = "user-modify-playback-state user-read-playback-state";

/// Refresh this many seconds before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, for tests and for tokens minted elsewhere.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Application credentials, read from `secrets.json`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "CLIENT_ID")]
    pub client_id: String,
    #[serde(rename = "CLIENT_SECRET")]
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PlayerError::Auth(format!("cannot read secrets file {}: {}", path.display(), e))
        })?;
        let credentials: Credentials = serde_json::from_str(&raw).map_err(|e| {
            PlayerError::Auth(format!("invalid secrets file {}: {}", path.display(), e))
        })?;
        if credentials.client_id.trim().is_empty() || credentials.client_secret.trim().is_empty() {
            return Err(PlayerError::Auth(format!(
                "secrets file {} is missing CLIENT_ID or CLIENT_SECRET",
                path.display()
            )));
        }
        Ok(credentials)
    }
}

/// Persisted OAuth tokens (`token.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds).
    pub expires_at: i64,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub token_type: String,
}

impl TokenCache {
    /// Load a cache file. Missing or unreadable caches are treated as absent.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!("ignoring invalid token cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Expired, or about to expire within the refresh margin.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }

    fn from_response(response: TokenResponse, previous_refresh: Option<String>, now: i64) -> Self {
        Self {
            access_token: response.access_token,
            // Refresh responses may omit the refresh token; keep the old one.
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: now + response.expires_in,
            scope: response.scope.unwrap_or_default(),
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Extract the authorization code from the URL the browser was redirected to.
pub fn code_from_redirect(redirect: &str) -> Result<String> {
    let url = Url::parse(redirect.trim())
        .map_err(|e| PlayerError::Auth(format!("invalid redirect URL: {}", e)))?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" => {
                return Err(PlayerError::Auth(format!("authorization denied: {}", value)));
            }
            _ => {}
        }
    }

    code.ok_or_else(|| PlayerError::Auth("redirect URL has no authorization code".to_string()))
}

/// Authorization-code flow with a file-backed token cache.
pub struct SpotifyAuth {
    http: reqwest::Client,
    credentials: Credentials,
    redirect_uri: String,
    accounts_base: String,
    cache_path: PathBuf,
    token: Mutex<Option<TokenCache>>,
}

impl SpotifyAuth {
    /// Create the flow, picking up any cached token at `cache_path`.
    pub fn new(credentials: Credentials, cache_path: impl Into<PathBuf>) -> Result<Self> {
        let cache_path = cache_path.into();
        let token = TokenCache::load(&cache_path);
        Ok(Self {
            http: http_client(REQUEST_TIMEOUT)?,
            credentials,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
            cache_path,
            token: Mutex::new(token),
        })
    }

    /// Replace the default [`REQUEST_TIMEOUT`] for token requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    pub fn with_accounts_base(mut self, base: impl Into<String>) -> Self {
        self.accounts_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Whether a token (possibly expired but refreshable) is available.
    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// URL the user opens to grant access.
    pub fn authorize_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/authorize", self.accounts_base))
            .map_err(|e| PlayerError::Auth(format!("invalid accounts URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", SCOPES);
        Ok(url)
    }

    /// Exchange an authorization code for tokens and cache them.
    pub async fn exchange_code(&self, code: &str) -> Result<()> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        let response = self.request_token(&params).await?;
        let cache = TokenCache::from_response(response, None, Utc::now().timestamp());
        self.store(&cache);
        *self.token.lock().await = Some(cache);
        tracing::info!("authorization code exchanged, token cached");
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenCache> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.request_token(&params).await?;
        let cache = TokenCache::from_response(
            response,
            Some(refresh_token.to_string()),
            Utc::now().timestamp(),
        );
        self.store(&cache);
        tracing::debug!("access token refreshed");
        Ok(cache)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_base))
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<TokenResponse>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| match e.error_description {
                Some(description) => format!("{}: {}", e.error, description),
                None => e.error,
            })
            .unwrap_or_else(|_| body.clone());

        match status.as_u16() {
            400 | 401 | 403 => Err(PlayerError::Auth(message)),
            429 | 502 | 503 | 504 => Err(PlayerError::Unavailable {
                status: status.as_u16(),
            }),
            code => Err(PlayerError::Api {
                status: code,
                message,
            }),
        }
    }

    fn store(&self, cache: &TokenCache) {
        if let Err(e) = cache.save(&self.cache_path) {
            tracing::warn!(
                "failed to write token cache {}: {}",
                self.cache_path.display(),
                e
            );
        }
    }
}

#[async_trait]
impl TokenProvider for SpotifyAuth {
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        let now = Utc::now().timestamp();

        let refresh_token = match guard.as_ref() {
            None => return Err(PlayerError::Auth("not logged in".to_string())),
            Some(cache) if !cache.is_expired(now) => return Ok(cache.access_token.clone()),
            Some(cache) => cache.refresh_token.clone().ok_or_else(|| {
                PlayerError::Auth("access token expired and no refresh token cached".to_string())
            })?,
        };

        let refreshed = self.refresh(&refresh_token).await?;
        let access_token = refreshed.access_token.clone();
        *guard = Some(refreshed);
        Ok(access_token)
    }
}
