//! WASAPI backend.
//!
//! Every call initialises COM for the calling thread (MTA) and releases it on
//! return, so the backend can be used from any tokio worker.

use windows::core::{Interface, BOOL};
use windows::Win32::Media::Audio::Endpoints::{IAudioEndpointVolume, IAudioMeterInformation};
use windows::Win32::Media::Audio::{
    eMultimedia, eRender, IAudioSessionControl2, IAudioSessionEnumerator, IAudioSessionManager2,
    IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_MULTITHREADED,
};

use crate::process::process_name;
use crate::source::{OutputVolume, SessionSource};
use crate::{DetectError, Result, SessionPeak};

struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    fn new() -> Self {
        // RPC_E_CHANGED_MODE means the thread already has an apartment we
        // can use but must not uninitialise.
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        Self {
            initialized: hr.is_ok(),
        }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { CoUninitialize() };
        }
    }
}

fn default_render_device() -> Result<IMMDevice> {
    unsafe {
        let enumerator: IMMDeviceEnumerator =
            CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)?;
        enumerator
            .GetDefaultAudioEndpoint(eRender, eMultimedia)
            .map_err(|_| DetectError::NoOutputDevice)
    }
}

#[derive(Default)]
pub struct WasapiSessionSource;

impl WasapiSessionSource {
    pub fn new() -> Self {
        Self
    }
}

impl SessionSource for WasapiSessionSource {
    fn sessions(&self) -> Result<Vec<SessionPeak>> {
        let _com = ComGuard::new();
        let device = default_render_device()?;

        let enumerator = unsafe {
            let manager: IAudioSessionManager2 = device.Activate(CLSCTX_ALL, None)?;
            manager.GetSessionEnumerator()?
        };
        let count = unsafe { enumerator.GetCount()? };

        let mut system = sysinfo::System::new();
        let mut peaks = Vec::with_capacity(count.max(0) as usize);

        for index in 0..count {
            match read_session(&enumerator, index, &mut system) {
                Ok(Some(peak)) => peaks.push(peak),
                Ok(None) => {}
                Err(e) => tracing::trace!(index, "skipping audio session: {}", e),
            }
        }

        Ok(peaks)
    }
}

fn read_session(
    enumerator: &IAudioSessionEnumerator,
    index: i32,
    system: &mut sysinfo::System,
) -> windows::core::Result<Option<SessionPeak>> {
    let (pid, peak) = unsafe {
        let control = enumerator.GetSession(index)?;
        let control2: IAudioSessionControl2 = control.cast()?;
        let pid = control2.GetProcessId()?;
        // System sounds session.
        if pid == 0 {
            return Ok(None);
        }
        let meter: IAudioMeterInformation = control.cast()?;
        (pid, meter.GetPeakValue()?)
    };

    Ok(process_name(system, pid).map(|name| SessionPeak::new(pid, name, peak)))
}

#[derive(Default)]
pub struct WasapiOutputVolume;

impl WasapiOutputVolume {
    pub fn new() -> Self {
        Self
    }
}

impl OutputVolume for WasapiOutputVolume {
    fn set(&self, percent: u8) -> Result<()> {
        let _com = ComGuard::new();
        let device = default_render_device()?;
        let scalar = (f32::from(percent) / 100.0).clamp(0.0, 1.0);

        unsafe {
            let volume: IAudioEndpointVolume = device.Activate(CLSCTX_ALL, None)?;
            volume.SetMute(BOOL::from(false), std::ptr::null())?;
            volume.SetMasterVolumeLevelScalar(scalar, std::ptr::null())?;
        }

        tracing::info!(percent, "output volume applied");
        Ok(())
    }
}
