//! Process-wide settings for NoSilence.
//!
//! A single [`Settings`] value is shared (via `Arc`) between the poll loop and
//! the control surface. Each field sits behind its own lock, so readers take
//! one guard per field at the moment they need it and never observe a torn
//! value. No read is expected to see a consistent snapshot of all fields.
//!
//! Every setter clamps its input and immediately persists the whole store to
//! disk when the store was loaded from a file.

mod file;
pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub use file::*;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Settings {
    path: Option<PathBuf>,
    silence_threshold: Mutex<f32>,
    silence_timeout: Mutex<f64>,
    min_sound_duration: Mutex<f64>,
    require_non_player_sound: Mutex<bool>,
    player_volume: Mutex<u8>,
    output_volume: Mutex<u8>,
    apply_player_volume: Mutex<bool>,
    apply_output_volume: Mutex<bool>,
    player_device: Mutex<Option<String>>,
    polling_interval: Mutex<f64>,
    player_process: Mutex<String>,
    dj_context_uri: Mutex<String>,
    fallback_playlist_uri: Mutex<String>,
    paused: Mutex<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::in_memory(SettingsFile::default())
    }
}

impl Settings {
    /// Settings that are never written to disk.
    pub fn in_memory(file: SettingsFile) -> Self {
        Self::from_parts(None, file)
    }

    /// Load from `path`. A missing file yields defaults; an unreadable or
    /// malformed file is logged and also yields defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match read_file(&path) {
            Ok(Some(file)) => {
                tracing::info!(path = %path.display(), "loaded config");
                file
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                SettingsFile::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to load config: {}", e);
                SettingsFile::default()
            }
        };
        Self::from_parts(Some(path), file)
    }

    fn from_parts(path: Option<PathBuf>, file: SettingsFile) -> Self {
        let file = file.clamped();
        Self {
            path,
            silence_threshold: Mutex::new(file.silence_threshold),
            silence_timeout: Mutex::new(file.silence_timeout),
            min_sound_duration: Mutex::new(file.min_sound_duration),
            require_non_player_sound: Mutex::new(file.require_non_player_sound),
            player_volume: Mutex::new(file.spotify_volume_percent),
            output_volume: Mutex::new(file.system_volume_percent),
            apply_player_volume: Mutex::new(file.change_spotify_volume),
            apply_output_volume: Mutex::new(file.change_system_volume),
            player_device: Mutex::new(file.spotify_device),
            polling_interval: Mutex::new(file.polling_interval),
            player_process: Mutex::new(file.player_process),
            dj_context_uri: Mutex::new(file.fallback_dj_uri),
            fallback_playlist_uri: Mutex::new(file.fallback_playlist_uri),
            paused: Mutex::new(false),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current values, each read under its own guard.
    pub fn snapshot(&self) -> SettingsFile {
        SettingsFile {
            spotify_device: self.player_device(),
            silence_timeout: *guard(&self.silence_timeout),
            silence_threshold: self.silence_threshold(),
            min_sound_duration: *guard(&self.min_sound_duration),
            require_non_player_sound: self.require_non_player_sound(),
            spotify_volume_percent: self.player_volume(),
            system_volume_percent: self.output_volume(),
            polling_interval: *guard(&self.polling_interval),
            change_spotify_volume: self.apply_player_volume(),
            change_system_volume: self.apply_output_volume(),
            player_process: self.player_process(),
            fallback_dj_uri: self.dj_context_uri(),
            fallback_playlist_uri: self.fallback_playlist_uri(),
        }
    }

    /// Write the current values to the backing file, if any.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("failed to save config: {}", e);
        }
    }

    // Audio detection

    pub fn silence_threshold(&self) -> f32 {
        *guard(&self.silence_threshold)
    }

    pub fn set_silence_threshold(&self, threshold: f32) -> f32 {
        let value = clamp_f32(threshold, SILENCE_THRESHOLD_RANGE, DEFAULT_SILENCE_THRESHOLD);
        *guard(&self.silence_threshold) = value;
        self.persist();
        tracing::info!("silence threshold set to {:.1}%", value * 100.0);
        value
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_secs_f64(*guard(&self.silence_timeout))
    }

    pub fn set_silence_timeout(&self, seconds: f64) -> f64 {
        let value = clamp_f64(seconds, SILENCE_TIMEOUT_RANGE, DEFAULT_SILENCE_TIMEOUT);
        *guard(&self.silence_timeout) = value;
        self.persist();
        tracing::info!("silence timeout set to {} seconds", value);
        value
    }

    pub fn min_sound_duration(&self) -> Duration {
        Duration::from_secs_f64(*guard(&self.min_sound_duration))
    }

    pub fn set_min_sound_duration(&self, seconds: f64) -> f64 {
        let value = clamp_f64(seconds, MIN_SOUND_DURATION_RANGE, DEFAULT_MIN_SOUND_DURATION);
        *guard(&self.min_sound_duration) = value;
        self.persist();
        tracing::info!("minimum interrupting sound set to {} seconds", value);
        value
    }

    pub fn require_non_player_sound(&self) -> bool {
        *guard(&self.require_non_player_sound)
    }

    pub fn toggle_require_non_player_sound(&self) -> bool {
        let value = toggle(&self.require_non_player_sound);
        self.persist();
        tracing::info!(enabled = value, "require non-player sound");
        value
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs_f64(*guard(&self.polling_interval))
    }

    pub fn set_polling_interval(&self, seconds: f64) -> f64 {
        let value = clamp_f64(seconds, POLLING_INTERVAL_RANGE, DEFAULT_POLLING_INTERVAL);
        *guard(&self.polling_interval) = value;
        self.persist();
        tracing::info!("polling interval set to {} seconds", value);
        value
    }

    pub fn player_process(&self) -> String {
        guard(&self.player_process).clone()
    }

    // Volumes

    pub fn player_volume(&self) -> u8 {
        *guard(&self.player_volume)
    }

    pub fn set_player_volume(&self, percent: u8) -> u8 {
        let value = clamp_volume(percent);
        *guard(&self.player_volume) = value;
        self.persist();
        tracing::info!("player volume set to {}%", value);
        value
    }

    pub fn output_volume(&self) -> u8 {
        *guard(&self.output_volume)
    }

    pub fn set_output_volume(&self, percent: u8) -> u8 {
        let value = clamp_volume(percent);
        *guard(&self.output_volume) = value;
        self.persist();
        tracing::info!("output volume set to {}%", value);
        value
    }

    pub fn apply_player_volume(&self) -> bool {
        *guard(&self.apply_player_volume)
    }

    pub fn toggle_apply_player_volume(&self) -> bool {
        let value = toggle(&self.apply_player_volume);
        self.persist();
        tracing::info!(enabled = value, "player volume control");
        value
    }

    pub fn apply_output_volume(&self) -> bool {
        *guard(&self.apply_output_volume)
    }

    pub fn toggle_apply_output_volume(&self) -> bool {
        let value = toggle(&self.apply_output_volume);
        self.persist();
        tracing::info!(enabled = value, "output volume control");
        value
    }

    // Player

    pub fn player_device(&self) -> Option<String> {
        guard(&self.player_device).clone()
    }

    pub fn set_player_device(&self, name: impl Into<String>) {
        let name = name.into();
        let name = name.trim();
        *guard(&self.player_device) = (!name.is_empty()).then(|| name.to_string());
        self.persist();
        tracing::info!(device = name, "player device set");
    }

    pub fn dj_context_uri(&self) -> String {
        guard(&self.dj_context_uri).clone()
    }

    pub fn fallback_playlist_uri(&self) -> String {
        guard(&self.fallback_playlist_uri).clone()
    }

    // Runtime only

    pub fn is_paused(&self) -> bool {
        *guard(&self.paused)
    }

    pub fn toggle_paused(&self) -> bool {
        let value = toggle(&self.paused);
        tracing::info!("monitoring {}", if value { "paused" } else { "resumed" });
        value
    }
}

fn toggle(lock: &Mutex<bool>) -> bool {
    let mut value = guard(lock);
    *value = !*value;
    *value
}

fn read_file(path: &Path) -> Result<Option<SettingsFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}
