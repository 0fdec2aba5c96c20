//! Recording fakes for the player and output-volume seams.

use async_trait::async_trait;
use nosilence_detect::{DetectError, OutputVolume};
use nosilence_player::{Device, Playback, PlayerClient, PlayerError, UserProfile};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListDevices,
    CurrentPlayback,
    Resume(String),
    StartContext(String, String),
    SetVolume(u8, String),
}

pub(crate) fn not_found() -> PlayerError {
    PlayerError::NotFound {
        status: 404,
        message: "Player command failed: No active device found".to_string(),
    }
}

pub(crate) fn server_error() -> PlayerError {
    PlayerError::Api {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakePlayer {
    devices: Vec<Device>,
    playing: bool,
    resume_error: Option<fn() -> PlayerError>,
    context_errors: HashMap<String, fn() -> PlayerError>,
    calls: Mutex<Vec<Call>>,
}

impl FakePlayer {
    pub(crate) fn with_device(name: &str, id: &str) -> Self {
        Self {
            devices: vec![Device::new(id, name)],
            ..Self::default()
        }
    }

    pub(crate) fn playing(mut self) -> Self {
        self.playing = true;
        self
    }

    pub(crate) fn fail_resume(mut self, error: fn() -> PlayerError) -> Self {
        self.resume_error = Some(error);
        self
    }

    pub(crate) fn fail_context(mut self, uri: &str, error: fn() -> PlayerError) -> Self {
        self.context_errors.insert(uri.to_string(), error);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state.
    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListDevices | Call::CurrentPlayback))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlayerClient for FakePlayer {
    async fn list_devices(&self) -> nosilence_player::Result<Vec<Device>> {
        self.record(Call::ListDevices);
        Ok(self.devices.clone())
    }

    async fn current_playback(&self) -> nosilence_player::Result<Option<Playback>> {
        self.record(Call::CurrentPlayback);
        Ok(Some(Playback {
            is_playing: self.playing,
            device: None,
            context: None,
        }))
    }

    async fn resume(&self, device_id: &str) -> nosilence_player::Result<()> {
        self.record(Call::Resume(device_id.to_string()));
        match self.resume_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    async fn start_context(&self, device_id: &str, context_uri: &str) -> nosilence_player::Result<()> {
        self.record(Call::StartContext(
            device_id.to_string(),
            context_uri.to_string(),
        ));
        match self.context_errors.get(context_uri) {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    async fn set_volume(&self, percent: u8, device_id: &str) -> nosilence_player::Result<()> {
        self.record(Call::SetVolume(percent, device_id.to_string()));
        Ok(())
    }

    async fn current_user(&self) -> nosilence_player::Result<UserProfile> {
        Ok(UserProfile {
            id: "listener".to_string(),
            display_name: None,
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeOutput {
    fail: bool,
    sets: Mutex<Vec<u8>>,
}

impl FakeOutput {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn sets(&self) -> Vec<u8> {
        self.sets.lock().unwrap().clone()
    }
}

impl OutputVolume for FakeOutput {
    fn set(&self, percent: u8) -> nosilence_detect::Result<()> {
        if self.fail {
            return Err(DetectError::NoOutputDevice);
        }
        self.sets.lock().unwrap().push(percent);
        Ok(())
    }
}
