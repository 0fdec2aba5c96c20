//! Arming / silence-timeout state machine.

use std::time::{Duration, Instant};

use crate::status::{IconState, MonitorStatus};

/// Per-tick loudness classification of the audio mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    /// At least one player session peaked above the threshold.
    pub player_is_loud: bool,
    /// At least one non-player session peaked above the threshold.
    pub other_is_loud: bool,
}

impl Sample {
    pub const SILENT: Sample = Sample {
        player_is_loud: false,
        other_is_loud: false,
    };

    pub fn new(player_is_loud: bool, other_is_loud: bool) -> Self {
        Self {
            player_is_loud,
            other_is_loud,
        }
    }
}

/// Settings the machine needs, read fresh by the caller before every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    pub silence_timeout: Duration,
    pub min_sound_duration: Duration,
    pub require_non_player_sound: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            silence_timeout: Duration::from_secs(30),
            min_sound_duration: Duration::from_secs(2),
            require_non_player_sound: false,
        }
    }
}

/// Result of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The silence window expired: resume the player now.
    Resume,
    /// Sound is present or the countdown is running.
    Wait,
    /// Paused, or silence that cannot lead to a resume.
    Idle,
}

/// Monitor state. Owned by the poll loop and only mutated by [`tick`].
///
/// [`tick`]: MonitorState::tick
#[derive(Debug, Clone)]
pub struct MonitorState {
    last_loud_at: Instant,
    interruption_armed: bool,
    interruption_started_at: Option<Instant>,
    paused: bool,
    status: MonitorStatus,
    icon: IconState,
}

impl MonitorState {
    pub fn new(now: Instant) -> Self {
        Self {
            last_loud_at: now,
            interruption_armed: false,
            interruption_started_at: None,
            paused: false,
            status: MonitorStatus::Monitoring,
            icon: IconState::Active,
        }
    }

    pub fn last_loud_at(&self) -> Instant {
        self.last_loud_at
    }

    pub fn is_armed(&self) -> bool {
        self.interruption_armed
    }

    pub fn interruption_started_at(&self) -> Option<Instant> {
        self.interruption_started_at
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    pub fn status_text(&self) -> String {
        self.status.to_string()
    }

    pub fn icon(&self) -> IconState {
        self.icon
    }

    /// Advance the machine by one poll.
    ///
    /// Precedence: paused, then player audible, then other sound, then
    /// silence. Only the silence branch can return [`Decision::Resume`], and
    /// when it does the silence window and the arming are reset.
    pub fn tick(
        &mut self,
        sample: Sample,
        paused: bool,
        config: &MonitorConfig,
        now: Instant,
    ) -> Decision {
        self.paused = paused;

        if paused {
            self.last_loud_at = now;
            self.disarm();
            self.set(MonitorStatus::Paused, IconState::Paused);
            return Decision::Idle;
        }

        if sample.other_is_loud {
            self.last_loud_at = now;
            let started = *self.interruption_started_at.get_or_insert(now);
            if now.saturating_duration_since(started) >= config.min_sound_duration {
                if !self.interruption_armed {
                    tracing::debug!("interruption armed");
                }
                self.interruption_armed = true;
            }
        } else {
            // Arming survives gaps in the interrupting sound.
            self.interruption_started_at = None;
        }

        if sample.player_is_loud {
            self.last_loud_at = now;
            self.disarm();
            self.set(MonitorStatus::PlayerPlaying, IconState::Active);
            return Decision::Wait;
        }

        let gate = !config.require_non_player_sound || self.interruption_armed;

        if sample.other_is_loud {
            let armed = config
                .require_non_player_sound
                .then_some(self.interruption_armed);
            let icon = if gate {
                IconState::Armed
            } else {
                IconState::Unarmed
            };
            self.set(MonitorStatus::OtherSound { armed }, icon);
            return Decision::Wait;
        }

        if !gate {
            // The timeout only starts counting once the gate is satisfied.
            self.last_loud_at = now;
            self.set(MonitorStatus::Idle, IconState::Unarmed);
            return Decision::Idle;
        }

        let silent_for = now.saturating_duration_since(self.last_loud_at);
        match config.silence_timeout.checked_sub(silent_for) {
            Some(remaining) if !remaining.is_zero() => {
                self.set(
                    MonitorStatus::Countdown {
                        remaining_secs: remaining.as_secs(),
                    },
                    IconState::Armed,
                );
                Decision::Wait
            }
            _ => {
                self.set(MonitorStatus::ResumingNow, IconState::Active);
                self.last_loud_at = now;
                self.interruption_armed = false;
                Decision::Resume
            }
        }
    }

    /// Restart the silence window after a resume attempt finished.
    pub fn restart_silence(&mut self, now: Instant) {
        self.last_loud_at = now;
        self.interruption_armed = false;
    }

    fn disarm(&mut self) {
        self.interruption_armed = false;
        self.interruption_started_at = None;
    }

    fn set(&mut self, status: MonitorStatus, icon: IconState) {
        self.status = status;
        self.icon = icon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OTHER: Sample = Sample {
        player_is_loud: false,
        other_is_loud: true,
    };
    const PLAYER: Sample = Sample {
        player_is_loud: true,
        other_is_loud: false,
    };
    const SILENT: Sample = Sample::SILENT;

    fn gated(min_secs: u64, timeout_secs: u64) -> MonitorConfig {
        MonitorConfig {
            silence_timeout: Duration::from_secs(timeout_secs),
            min_sound_duration: Duration::from_secs(min_secs),
            require_non_player_sound: true,
        }
    }

    fn ungated(timeout_secs: u64) -> MonitorConfig {
        MonitorConfig {
            silence_timeout: Duration::from_secs(timeout_secs),
            min_sound_duration: Duration::ZERO,
            require_non_player_sound: false,
        }
    }

    struct Clock(Instant);

    impl Clock {
        fn at(&self, secs: u64) -> Instant {
            self.0 + Duration::from_secs(secs)
        }
    }

    fn setup() -> (Clock, MonitorState) {
        let clock = Clock(Instant::now());
        let state = MonitorState::new(clock.at(0));
        (clock, state)
    }

    #[test]
    fn test_arming_scenario() {
        let (clock, mut state) = setup();
        let config = gated(3, 30);

        for t in 0..=2 {
            let decision = state.tick(OTHER, false, &config, clock.at(t));
            assert_eq!(decision, Decision::Wait);
            assert!(!state.is_armed(), "not armed at t={t}");
            assert_eq!(state.icon(), IconState::Unarmed);
            assert_eq!(state.status_text(), "Other sound playing (Not Armed)");
        }

        state.tick(OTHER, false, &config, clock.at(3));
        assert!(state.is_armed());
        assert_eq!(state.icon(), IconState::Armed);
        assert_eq!(state.status_text(), "Other sound playing (Armed)");
        assert_eq!(state.last_loud_at(), clock.at(3));

        let decision = state.tick(SILENT, false, &config, clock.at(4));
        assert_eq!(decision, Decision::Wait);
        assert_eq!(state.status_text(), "Resuming in 29s");
        assert_eq!(state.icon(), IconState::Armed);

        for t in 5..33 {
            assert_eq!(state.tick(SILENT, false, &config, clock.at(t)), Decision::Wait);
        }

        let decision = state.tick(SILENT, false, &config, clock.at(33));
        assert_eq!(decision, Decision::Resume);
        assert_eq!(state.status_text(), "Resuming now...");
        assert_eq!(state.icon(), IconState::Active);
        assert!(!state.is_armed());
        assert_eq!(state.last_loud_at(), clock.at(33));
    }

    #[test]
    fn test_paused_resets_everything() {
        let (clock, mut state) = setup();
        let config = gated(0, 30);

        state.tick(OTHER, false, &config, clock.at(1));
        assert!(state.is_armed());

        let decision = state.tick(OTHER, true, &config, clock.at(2));
        assert_eq!(decision, Decision::Idle);
        assert!(!state.is_armed());
        assert!(state.interruption_started_at().is_none());
        assert_eq!(state.last_loud_at(), clock.at(2));
        assert_eq!(state.status_text(), "Paused");
        assert_eq!(state.icon(), IconState::Paused);
        assert!(state.is_paused());
    }

    #[test]
    fn test_paused_never_resumes() {
        let (clock, mut state) = setup();
        let config = ungated(5);

        for t in 0..100 {
            assert_eq!(state.tick(SILENT, true, &config, clock.at(t)), Decision::Idle);
        }
        // Unpausing starts a fresh window instead of resuming immediately.
        assert_eq!(state.tick(SILENT, false, &config, clock.at(100)), Decision::Wait);
        assert_eq!(state.status_text(), "Resuming in 4s");
    }

    #[test]
    fn test_arming_survives_gaps() {
        let (clock, mut state) = setup();
        let config = gated(2, 300);

        for t in 0..=2 {
            state.tick(OTHER, false, &config, clock.at(t));
        }
        assert!(state.is_armed());

        for t in 3..50 {
            state.tick(SILENT, false, &config, clock.at(t));
            assert!(state.is_armed(), "still armed at t={t}");
            assert!(state.interruption_started_at().is_none());
        }

        // A short burst after the gap does not disarm either.
        state.tick(OTHER, false, &config, clock.at(50));
        assert!(state.is_armed());
    }

    #[test]
    fn test_gap_restarts_the_arming_run() {
        let (clock, mut state) = setup();
        let config = gated(3, 30);

        state.tick(OTHER, false, &config, clock.at(0));
        state.tick(OTHER, false, &config, clock.at(1));
        state.tick(SILENT, false, &config, clock.at(2));
        state.tick(OTHER, false, &config, clock.at(3));
        assert!(!state.is_armed());
        assert_eq!(state.interruption_started_at(), Some(clock.at(3)));

        state.tick(OTHER, false, &config, clock.at(5));
        assert!(!state.is_armed());
        state.tick(OTHER, false, &config, clock.at(6));
        assert!(state.is_armed());
    }

    #[test]
    fn test_player_loud_disarms() {
        let (clock, mut state) = setup();
        let config = gated(0, 30);

        state.tick(OTHER, false, &config, clock.at(0));
        assert!(state.is_armed());

        let both = Sample::new(true, true);
        let decision = state.tick(both, false, &config, clock.at(1));
        assert_eq!(decision, Decision::Wait);
        assert!(!state.is_armed());
        assert!(state.interruption_started_at().is_none());
        assert_eq!(state.status_text(), "Player playing");
        assert_eq!(state.icon(), IconState::Active);

        state.tick(PLAYER, false, &config, clock.at(2));
        assert!(!state.is_armed());
        assert_eq!(state.last_loud_at(), clock.at(2));
    }

    #[test]
    fn test_never_resumes_while_other_sound_is_active() {
        let (clock, mut state) = setup();
        let config = ungated(1);

        for t in 0..60 {
            assert_eq!(state.tick(OTHER, false, &config, clock.at(t)), Decision::Wait);
            assert_eq!(state.status_text(), "Other sound playing");
            assert_eq!(state.icon(), IconState::Armed);
        }
    }

    #[test]
    fn test_idle_keeps_resetting_silence_window() {
        let (clock, mut state) = setup();
        let config = gated(3, 10);

        for t in 0..100 {
            assert_eq!(state.tick(SILENT, false, &config, clock.at(t)), Decision::Idle);
            assert_eq!(state.last_loud_at(), clock.at(t));
            assert_eq!(state.status_text(), "Idle");
            assert_eq!(state.icon(), IconState::Unarmed);
        }
    }

    #[test]
    fn test_ungated_resumes_after_plain_silence() {
        let (clock, mut state) = setup();
        let config = ungated(30);

        state.tick(PLAYER, false, &config, clock.at(0));
        assert_eq!(state.tick(SILENT, false, &config, clock.at(29)), Decision::Wait);
        assert_eq!(state.status_text(), "Resuming in 1s");
        assert_eq!(state.tick(SILENT, false, &config, clock.at(30)), Decision::Resume);

        // Next expiry needs a full new window.
        assert_eq!(state.tick(SILENT, false, &config, clock.at(31)), Decision::Wait);
        assert_eq!(state.tick(SILENT, false, &config, clock.at(60)), Decision::Resume);
    }

    #[test]
    fn test_resume_iff_conditions_hold() {
        let config = gated(0, 5);
        let samples = [SILENT, OTHER, PLAYER, Sample::new(true, true)];

        for sample in samples {
            for paused in [false, true] {
                for armed_first in [false, true] {
                    let (clock, mut state) = setup();
                    if armed_first {
                        state.tick(OTHER, false, &config, clock.at(0));
                    }
                    let decision = state.tick(sample, paused, &config, clock.at(10));
                    let expected = !paused
                        && !sample.other_is_loud
                        && !sample.player_is_loud
                        && armed_first;
                    assert_eq!(
                        decision == Decision::Resume,
                        expected,
                        "sample={sample:?} paused={paused} armed_first={armed_first}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_restart_silence_after_resume() {
        let (clock, mut state) = setup();
        let config = ungated(10);

        assert_eq!(state.tick(SILENT, false, &config, clock.at(10)), Decision::Resume);
        state.restart_silence(clock.at(14));
        assert_eq!(state.tick(SILENT, false, &config, clock.at(15)), Decision::Wait);
        assert_eq!(state.status_text(), "Resuming in 9s");
    }
}
