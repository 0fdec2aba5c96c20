//! Audio mixer access for NoSilence.
//!
//! Provides a one-shot snapshot of per-process peak loudness, classified as
//! "player" vs "other", plus control of the host output volume.
//!
//! Platform backends implement [`SessionSource`] and [`OutputVolume`]; the
//! classification in [`classify`] is pure and shared by all of them.

mod process;
mod source;

#[cfg(windows)]
mod wasapi;

use std::sync::Arc;

pub use nosilence_monitor::Sample;
pub use process::is_player_process;
pub use source::{NullOutputVolume, NullSessionSource, OutputVolume, SessionSource};

#[cfg(windows)]
pub use wasapi::{WasapiOutputVolume, WasapiSessionSource};

#[cfg(windows)]
pub type PlatformSessionSource = WasapiSessionSource;
#[cfg(windows)]
pub type PlatformOutputVolume = WasapiOutputVolume;

#[cfg(not(windows))]
pub type PlatformSessionSource = NullSessionSource;
#[cfg(not(windows))]
pub type PlatformOutputVolume = NullOutputVolume;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("audio backend error: {0}")]
    Backend(String),
    #[error("no default output device")]
    NoOutputDevice,
}

#[cfg(windows)]
impl From<windows::core::Error> for DetectError {
    fn from(e: windows::core::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;

/// Peak reading of one audio session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPeak {
    pub pid: u32,
    pub process_name: String,
    /// Instantaneous peak amplitude, 0.0 to 1.0.
    pub peak: f32,
}

impl SessionPeak {
    pub fn new(pid: u32, process_name: impl Into<String>, peak: f32) -> Self {
        Self {
            pid,
            process_name: process_name.into(),
            peak,
        }
    }
}

/// Classify session peaks against `threshold`.
///
/// A session counts as loud when its peak is strictly above the threshold.
pub fn classify(sessions: &[SessionPeak], player_process: &str, threshold: f32) -> Sample {
    sessions
        .iter()
        .filter(|session| session.peak > threshold)
        .fold(Sample::SILENT, |mut sample, session| {
            if is_player_process(&session.process_name, player_process) {
                sample.player_is_loud = true;
            } else {
                sample.other_is_loud = true;
            }
            sample
        })
}

/// Samples a [`SessionSource`] on behalf of a configured player process.
pub struct AudioSampler {
    source: Arc<dyn SessionSource>,
    player_process: String,
}

impl AudioSampler {
    pub fn new(source: Arc<dyn SessionSource>, player_process: impl Into<String>) -> Self {
        Self {
            source,
            player_process: player_process.into(),
        }
    }

    pub fn player_process(&self) -> &str {
        &self.player_process
    }

    /// Snapshot the mixer. A failed enumeration reads as silence so that a
    /// broken backend can never trigger a resume on its own.
    pub fn sample(&self, threshold: f32) -> Sample {
        match self.source.sessions() {
            Ok(sessions) => classify(&sessions, &self.player_process, threshold),
            Err(e) => {
                tracing::warn!("audio session enumeration failed: {}", e);
                Sample::SILENT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Vec<SessionPeak>);

    impl SessionSource for FixedSource {
        fn sessions(&self) -> Result<Vec<SessionPeak>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl SessionSource for FailingSource {
        fn sessions(&self) -> Result<Vec<SessionPeak>> {
            Err(DetectError::Backend("device invalidated".to_string()))
        }
    }

    #[test]
    fn test_classify_splits_player_and_other() {
        let sessions = vec![
            SessionPeak::new(10, "Spotify.exe", 0.4),
            SessionPeak::new(11, "firefox.exe", 0.0005),
        ];

        let sample = classify(&sessions, "Spotify.exe", 0.001);
        assert!(sample.player_is_loud);
        assert!(!sample.other_is_loud);

        let sessions = vec![
            SessionPeak::new(10, "Spotify.exe", 0.0),
            SessionPeak::new(11, "firefox.exe", 0.2),
        ];
        let sample = classify(&sessions, "Spotify.exe", 0.001);
        assert!(!sample.player_is_loud);
        assert!(sample.other_is_loud);
    }

    #[test]
    fn test_classify_threshold_is_strict() {
        let sessions = vec![SessionPeak::new(11, "discord.exe", 0.01)];
        assert_eq!(classify(&sessions, "Spotify.exe", 0.01), Sample::SILENT);
        assert!(classify(&sessions, "Spotify.exe", 0.009).other_is_loud);
    }

    #[test]
    fn test_classify_player_name_is_case_insensitive() {
        let sessions = vec![SessionPeak::new(10, "SPOTIFY.EXE", 0.5)];
        let sample = classify(&sessions, "spotify", 0.001);
        assert!(sample.player_is_loud);
        assert!(!sample.other_is_loud);
    }

    #[test]
    fn test_classify_empty_is_silent() {
        assert_eq!(classify(&[], "Spotify.exe", 0.001), Sample::SILENT);
    }

    #[test]
    fn test_sampler_uses_source() {
        let source = Arc::new(FixedSource(vec![
            SessionPeak::new(1, "Spotify.exe", 0.3),
            SessionPeak::new(2, "chrome.exe", 0.3),
        ]));
        let sampler = AudioSampler::new(source, "Spotify.exe");
        assert_eq!(sampler.sample(0.001), Sample::new(true, true));
    }

    #[test]
    fn test_sampler_failure_reads_as_silence() {
        let sampler = AudioSampler::new(Arc::new(FailingSource), "Spotify.exe");
        assert_eq!(sampler.sample(0.0), Sample::SILENT);
    }

    #[test]
    fn test_null_source_is_silent() {
        let sampler = AudioSampler::new(Arc::new(NullSessionSource), "Spotify.exe");
        assert_eq!(sampler.sample(0.0), Sample::SILENT);
    }
}
