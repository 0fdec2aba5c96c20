//! Backend traits for the audio mixer.
//!
//! These traits abstract platform-specific implementations, allowing the
//! classification and monitor logic to stay pure and testable.

use crate::{Result, SessionPeak};

/// Enumerates audio sessions on the default output device.
pub trait SessionSource: Send + Sync {
    /// Peak readings for every session that could be queried.
    ///
    /// Sessions that vanish or refuse access mid-enumeration are skipped by
    /// the implementation; only a failure of the whole enumeration is an
    /// error.
    fn sessions(&self) -> Result<Vec<SessionPeak>>;
}

/// Host output (system) volume.
pub trait OutputVolume: Send + Sync {
    /// Unmute and set the master volume to `percent` (clamped to 0..=100).
    fn set(&self, percent: u8) -> Result<()>;
}

/// Null implementation for tests and platforms without a mixer backend.
#[derive(Default)]
pub struct NullSessionSource;

impl SessionSource for NullSessionSource {
    fn sessions(&self) -> Result<Vec<SessionPeak>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct NullOutputVolume;

impl OutputVolume for NullOutputVolume {
    fn set(&self, percent: u8) -> Result<()> {
        tracing::debug!(percent, "output volume control unavailable on this platform");
        Ok(())
    }
}
