//! Observable status of the monitor.
//!
//! Pure domain values - no I/O.

use serde::{Deserialize, Serialize};

/// Icon tag for whatever presentation layer renders the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IconState {
    /// Player audible, or a resume is being issued.
    #[default]
    Active,
    Paused,
    /// A resume will happen once the interruption goes quiet.
    Armed,
    /// Silence or sound that would not lead to a resume.
    Unarmed,
}

impl IconState {
    pub fn label(&self) -> &'static str {
        match self {
            IconState::Active => "active",
            IconState::Paused => "paused",
            IconState::Armed => "armed",
            IconState::Unarmed => "unarmed",
        }
    }
}

impl std::fmt::Display for IconState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Status line computed on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Before the first tick.
    Monitoring,
    Paused,
    PlayerPlaying,
    /// `armed` is `Some` only when the require-sound gate is enabled.
    OtherSound { armed: Option<bool> },
    Idle,
    Countdown { remaining_secs: u64 },
    ResumingNow,
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Monitoring => write!(f, "Monitoring..."),
            MonitorStatus::Paused => write!(f, "Paused"),
            MonitorStatus::PlayerPlaying => write!(f, "Player playing"),
            MonitorStatus::OtherSound { armed: None } => write!(f, "Other sound playing"),
            MonitorStatus::OtherSound { armed: Some(true) } => {
                write!(f, "Other sound playing (Armed)")
            }
            MonitorStatus::OtherSound { armed: Some(false) } => {
                write!(f, "Other sound playing (Not Armed)")
            }
            MonitorStatus::Idle => write!(f, "Idle"),
            MonitorStatus::Countdown { remaining_secs } => {
                write!(f, "Resuming in {}s", remaining_secs)
            }
            MonitorStatus::ResumingNow => write!(f, "Resuming now..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(MonitorStatus::Paused.to_string(), "Paused");
        assert_eq!(
            MonitorStatus::OtherSound { armed: None }.to_string(),
            "Other sound playing"
        );
        assert_eq!(
            MonitorStatus::OtherSound { armed: Some(false) }.to_string(),
            "Other sound playing (Not Armed)"
        );
        assert_eq!(
            MonitorStatus::Countdown { remaining_secs: 29 }.to_string(),
            "Resuming in 29s"
        );
        assert_eq!(MonitorStatus::ResumingNow.to_string(), "Resuming now...");
    }

    #[test]
    fn test_icon_label() {
        assert_eq!(IconState::Unarmed.to_string(), "unarmed");
    }
}
