//! Monitor poller - background task that samples the mixer and resumes the
//! player once an interruption has gone quiet.

use nosilence_detect::{AudioSampler, Sample};
use nosilence_events::{StatusSinkRef, StatusUpdate};
use nosilence_monitor::{Decision, MonitorConfig, MonitorState};
use nosilence_settings::Settings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{ResumeOrchestrator, ResumeOutcome};

/// One monitor: sampler, state machine and orchestrator driven tick by tick.
pub struct MonitorLoop {
    settings: Arc<Settings>,
    sampler: AudioSampler,
    orchestrator: ResumeOrchestrator,
    sink: StatusSinkRef,
    state: MonitorState,
    last_published: Option<StatusUpdate>,
}

impl MonitorLoop {
    pub fn new(
        settings: Arc<Settings>,
        sampler: AudioSampler,
        orchestrator: ResumeOrchestrator,
        sink: StatusSinkRef,
    ) -> Self {
        Self {
            settings,
            sampler,
            orchestrator,
            sink,
            state: MonitorState::new(Instant::now().into_std()),
            last_published: None,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Run a single poll. The resume attempt, if any, is awaited here so
    /// ticks never overlap.
    pub async fn tick(&mut self) -> Decision {
        let paused = self.settings.is_paused();
        let sample = if paused {
            Sample::SILENT
        } else {
            self.sampler.sample(self.settings.silence_threshold())
        };

        let config = MonitorConfig {
            silence_timeout: self.settings.silence_timeout(),
            min_sound_duration: self.settings.min_sound_duration(),
            require_non_player_sound: self.settings.require_non_player_sound(),
        };

        let decision = self
            .state
            .tick(sample, paused, &config, Instant::now().into_std());
        self.publish_if_changed();

        if decision == Decision::Resume {
            match self.orchestrator.resume().await {
                Ok(ResumeOutcome::Resumed(source)) => {
                    tracing::info!("resumed playback from {}", source);
                }
                Ok(outcome) => tracing::debug!(?outcome, "resume skipped"),
                Err(e) => tracing::error!("playback error: {}", e),
            }
            self.state.restart_silence(Instant::now().into_std());
        }

        decision
    }

    fn publish_if_changed(&mut self) {
        let update = StatusUpdate::from_status(self.state.status(), self.state.icon());
        if self.last_published.as_ref() == Some(&update) {
            return;
        }
        tracing::debug!(status = %update.status_text, icon = %update.icon, "status changed");
        self.sink.publish(&update);
        self.last_published = Some(update);
    }
}

/// Background task running a [`MonitorLoop`] at the configured interval.
pub struct MonitorPoller {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl Default for MonitorPoller {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
            handle: None,
        }
    }
}

impl MonitorPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the polling task. Must be called inside a tokio runtime.
    pub fn start(&mut self, mut monitor: MonitorLoop) {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("MonitorPoller already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let wake = Arc::clone(&self.wake);

        let handle = tokio::spawn(async move {
            tracing::info!("MonitorPoller started");

            while running.load(Ordering::SeqCst) {
                monitor.tick().await;

                // Re-read every iteration so interval changes apply at once.
                let interval = monitor.settings.polling_interval();
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = wake.notified() => {}
                }
            }

            tracing::info!("MonitorPoller stopped");
        });

        self.handle = Some(handle);
    }

    /// Stop the poller and wait for the current tick to finish.
    pub async fn stop(&mut self) {
        self.signal_stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("monitor task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn signal_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

impl Drop for MonitorPoller {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
