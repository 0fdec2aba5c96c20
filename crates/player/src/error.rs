//! Error types for the player client.

use thiserror::Error;

/// Substrings that mark a failure as a transient network problem.
const TRANSIENT_MARKERS: &[&str] = &[
    "name resolution",
    "dns error",
    "failed to lookup address",
    "max retries",
];

#[derive(Debug, Error)]
pub enum PlayerError {
    /// The requested device, context or resource does not exist. Resolvable:
    /// callers fall back or skip instead of failing.
    #[error("not found ({status}): {message}")]
    NotFound { status: u16, message: String },

    /// Credentials are missing, expired beyond refresh, or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Rate limited or the service is temporarily unavailable.
    #[error("service unavailable ({status})")]
    Unavailable { status: u16 },

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// The retry wrapper gave up on a transient failure.
    #[error("player call failed after {attempts} attempts due to network issues")]
    RetriesExhausted { attempts: u32 },
}

impl PlayerError {
    /// Resolvable "not found / no context" class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlayerError::NotFound { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, PlayerError::Auth(_))
    }

    /// Transient network-class failure that the retry wrapper may repeat.
    pub fn is_transient(&self) -> bool {
        match self {
            PlayerError::Unavailable { status } => matches!(status, 429 | 502 | 503 | 504),
            PlayerError::Network(message) => {
                let message = message.to_lowercase();
                TRANSIENT_MARKERS
                    .iter()
                    .any(|marker| message.contains(marker))
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PlayerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return PlayerError::Decode(e.to_string());
        }
        // reqwest keeps the interesting part (e.g. the DNS failure) in the
        // source chain, not in its own Display.
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        PlayerError::Network(message)
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(e: serde_json::Error) -> Self {
        PlayerError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_markers() {
        assert!(PlayerError::Network("Max retries exceeded with url".into()).is_transient());
        assert!(PlayerError::Network(
            "error sending request: client error (Connect): dns error: failed to lookup address information".into()
        )
        .is_transient());
        assert!(PlayerError::Network("Temporary failure in name resolution".into()).is_transient());
        assert!(!PlayerError::Network("connection reset by peer".into()).is_transient());
    }

    #[test]
    fn test_status_classes() {
        assert!(PlayerError::Unavailable { status: 503 }.is_transient());
        assert!(PlayerError::Unavailable { status: 429 }.is_transient());
        assert!(!PlayerError::Api {
            status: 500,
            message: "boom".into()
        }
        .is_transient());

        let not_found = PlayerError::NotFound {
            status: 404,
            message: "No active device".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());
        assert!(!PlayerError::RetriesExhausted { attempts: 3 }.is_transient());
    }
}
