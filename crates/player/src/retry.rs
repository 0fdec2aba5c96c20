//! Retry wrapper for remote player calls.
//!
//! Only transient network-class failures are repeated; everything else is
//! returned on first occurrence so that callers can match on it (e.g. a
//! not-found that triggers a playback fallback).

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::{Device, Playback, PlayerClient, PlayerError, Result, UserProfile};

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bounded retry with a linearly growing delay (`delay * attempt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries: retries.max(1),
            delay,
        }
    }

    /// Delay after the given 1-based failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }

    /// Run `operation`, retrying transient failures.
    pub async fn run<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let retries = self.retries.max(1);

        for attempt in 1..=retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        operation = operation_name,
                        "network error detected ({}/{}): {}",
                        attempt,
                        retries,
                        e
                    );
                    if attempt < retries {
                        tokio::time::sleep(self.delay_for_attempt(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(PlayerError::RetriesExhausted { attempts: retries })
    }
}

/// Applies a [`RetryPolicy`] to every call of the wrapped client.
pub struct Retrying<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: PlayerClient> Retrying<P> {
    pub fn new(inner: P) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PlayerClient> PlayerClient for Retrying<P> {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.policy
            .run("list_devices", || self.inner.list_devices())
            .await
    }

    async fn current_playback(&self) -> Result<Option<Playback>> {
        self.policy
            .run("current_playback", || self.inner.current_playback())
            .await
    }

    async fn resume(&self, device_id: &str) -> Result<()> {
        self.policy
            .run("resume", || self.inner.resume(device_id))
            .await
    }

    async fn start_context(&self, device_id: &str, context_uri: &str) -> Result<()> {
        self.policy
            .run("start_context", || {
                self.inner.start_context(device_id, context_uri)
            })
            .await
    }

    async fn set_volume(&self, percent: u8, device_id: &str) -> Result<()> {
        self.policy
            .run("set_volume", || self.inner.set_volume(percent, device_id))
            .await
    }

    async fn current_user(&self) -> Result<UserProfile> {
        self.policy
            .run("current_user", || self.inner.current_user())
            .await
    }
}
