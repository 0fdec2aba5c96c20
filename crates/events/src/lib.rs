//! Status contracts between the monitor and its presentation layer.
//!
//! Using one shared DTO keeps the console daemon, any future tray front end
//! and the tests agreeing on what a status update carries.

mod bus;

pub use bus::{InMemoryStatusSink, NullStatusSink, StatusSink, StatusSinkRef, TracingStatusSink};

use nosilence_monitor::{IconState, MonitorStatus};
use serde::{Deserialize, Serialize};

/// Published when the status text or icon changes.
///
/// Producers: monitor poller
/// Consumers: console daemon, tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status_text: String,
    pub icon: IconState,
}

impl StatusUpdate {
    pub fn new(status_text: impl Into<String>, icon: IconState) -> Self {
        Self {
            status_text: status_text.into(),
            icon,
        }
    }

    pub fn from_status(status: MonitorStatus, icon: IconState) -> Self {
        Self::new(status.to_string(), icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_serialize() {
        let update = StatusUpdate::from_status(
            MonitorStatus::Countdown { remaining_secs: 12 },
            IconState::Armed,
        );
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["status_text"], "Resuming in 12s");
        assert_eq!(json["icon"], "armed");
    }

    #[test]
    fn test_status_update_deserialize() {
        let json = r#"{"status_text": "Paused", "icon": "paused"}"#;
        let update: StatusUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update, StatusUpdate::new("Paused", IconState::Paused));
    }
}
