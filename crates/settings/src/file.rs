//! On-disk representation of the settings store.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const SILENCE_THRESHOLD_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const SILENCE_TIMEOUT_RANGE: RangeInclusive<f64> = 1.0..=9999.0;
pub const MIN_SOUND_DURATION_RANGE: RangeInclusive<f64> = 0.0..=9999.0;
pub const POLLING_INTERVAL_RANGE: RangeInclusive<f64> = 0.1..=60.0;
pub const VOLUME_MAX: u8 = 100;

pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.001;
pub const DEFAULT_SILENCE_TIMEOUT: f64 = 30.0;
pub const DEFAULT_MIN_SOUND_DURATION: f64 = 2.0;
pub const DEFAULT_POLLING_INTERVAL: f64 = 1.0;
pub const DEFAULT_PLAYER_VOLUME: u8 = 100;
pub const DEFAULT_OUTPUT_VOLUME: u8 = 25;
pub const DEFAULT_PLAYER_PROCESS: &str = "Spotify.exe";
pub const DEFAULT_DJ_CONTEXT_URI: &str = "spotify:playlist:37i9dQZF1EYkqdzj48dyYq";
pub const DEFAULT_FALLBACK_PLAYLIST_URI: &str = "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M";

/// Every persisted field. Missing keys fall back to their defaults so older
/// config files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub spotify_device: Option<String>,
    pub silence_timeout: f64,
    pub silence_threshold: f32,
    pub min_sound_duration: f64,
    pub require_non_player_sound: bool,
    pub spotify_volume_percent: u8,
    pub system_volume_percent: u8,
    pub polling_interval: f64,
    pub change_spotify_volume: bool,
    pub change_system_volume: bool,
    pub player_process: String,
    pub fallback_dj_uri: String,
    pub fallback_playlist_uri: String,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            spotify_device: None,
            silence_timeout: DEFAULT_SILENCE_TIMEOUT,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            min_sound_duration: DEFAULT_MIN_SOUND_DURATION,
            require_non_player_sound: false,
            spotify_volume_percent: DEFAULT_PLAYER_VOLUME,
            system_volume_percent: DEFAULT_OUTPUT_VOLUME,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            change_spotify_volume: true,
            change_system_volume: true,
            player_process: DEFAULT_PLAYER_PROCESS.to_string(),
            fallback_dj_uri: DEFAULT_DJ_CONTEXT_URI.to_string(),
            fallback_playlist_uri: DEFAULT_FALLBACK_PLAYLIST_URI.to_string(),
        }
    }
}

impl SettingsFile {
    /// Clamp every numeric field into its documented range.
    pub fn clamped(mut self) -> Self {
        self.silence_threshold = clamp_f32(
            self.silence_threshold,
            SILENCE_THRESHOLD_RANGE,
            DEFAULT_SILENCE_THRESHOLD,
        );
        self.silence_timeout = clamp_f64(
            self.silence_timeout,
            SILENCE_TIMEOUT_RANGE,
            DEFAULT_SILENCE_TIMEOUT,
        );
        self.min_sound_duration = clamp_f64(
            self.min_sound_duration,
            MIN_SOUND_DURATION_RANGE,
            DEFAULT_MIN_SOUND_DURATION,
        );
        self.polling_interval = clamp_f64(
            self.polling_interval,
            POLLING_INTERVAL_RANGE,
            DEFAULT_POLLING_INTERVAL,
        );
        self.spotify_volume_percent = clamp_volume(self.spotify_volume_percent);
        self.system_volume_percent = clamp_volume(self.system_volume_percent);
        self.spotify_device = self.spotify_device.filter(|name| !name.trim().is_empty());
        if self.player_process.trim().is_empty() {
            self.player_process = DEFAULT_PLAYER_PROCESS.to_string();
        }
        self
    }
}

pub(crate) fn clamp_f32(value: f32, range: RangeInclusive<f32>, default: f32) -> f32 {
    if value.is_nan() {
        return default;
    }
    value.clamp(*range.start(), *range.end())
}

pub(crate) fn clamp_f64(value: f64, range: RangeInclusive<f64>, default: f64) -> f64 {
    if value.is_nan() {
        return default;
    }
    value.clamp(*range.start(), *range.end())
}

pub(crate) fn clamp_volume(percent: u8) -> u8 {
    percent.min(VOLUME_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let file: SettingsFile =
            serde_json::from_str(r#"{"silence_timeout": 60, "spotify_device": "Desk"}"#).unwrap();
        assert_eq!(file.silence_timeout, 60.0);
        assert_eq!(file.spotify_device.as_deref(), Some("Desk"));
        assert_eq!(file.silence_threshold, DEFAULT_SILENCE_THRESHOLD);
        assert_eq!(file.player_process, DEFAULT_PLAYER_PROCESS);
        assert!(file.change_system_volume);
    }

    #[test]
    fn test_clamped_limits_ranges() {
        let file = SettingsFile {
            silence_threshold: 4.0,
            silence_timeout: 0.0,
            min_sound_duration: -3.0,
            polling_interval: 500.0,
            spotify_volume_percent: 250,
            ..Default::default()
        }
        .clamped();

        assert_eq!(file.silence_threshold, 1.0);
        assert_eq!(file.silence_timeout, 1.0);
        assert_eq!(file.min_sound_duration, 0.0);
        assert_eq!(file.polling_interval, 60.0);
        assert_eq!(file.spotify_volume_percent, 100);
    }

    #[test]
    fn test_clamped_replaces_nan_and_blank_strings() {
        let file = SettingsFile {
            silence_threshold: f32::NAN,
            polling_interval: f64::NAN,
            spotify_device: Some("   ".to_string()),
            player_process: String::new(),
            ..Default::default()
        }
        .clamped();

        assert_eq!(file.silence_threshold, DEFAULT_SILENCE_THRESHOLD);
        assert_eq!(file.polling_interval, DEFAULT_POLLING_INTERVAL);
        assert!(file.spotify_device.is_none());
        assert_eq!(file.player_process, DEFAULT_PLAYER_PROCESS);
    }
}
