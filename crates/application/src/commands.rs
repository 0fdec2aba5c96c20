//! Control-surface commands.
//!
//! Every command is a row in the static [`COMMANDS`] table. Front ends look a
//! command up by name and call its handler with the rest of the input line;
//! handlers only touch the settings store, which persists each change.

use nosilence_settings::Settings;

pub const TIMEOUT_PRESETS: &[f64] = &[10.0, 30.0, 60.0, 120.0, 300.0];
pub const INTERVAL_PRESETS: &[f64] = &[0.5, 1.0, 2.0, 5.0, 10.0];
pub const THRESHOLD_PRESETS: &[f32] = &[0.001, 0.005, 0.01, 0.02];
pub const VOLUME_PRESETS: &[u8] = &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Pause,
    ToggleOutputVolume,
    TogglePlayerVolume,
    RequireSound,
    Timeout,
    Interval,
    Threshold,
    MinDuration,
    PlayerVolume,
    OutputVolume,
    Device,
    Status,
    Presets,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A setting changed; the message describes the new value.
    Updated(String),
    Info(String),
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("missing value, usage: {0}")]
    MissingArgument(&'static str),
    #[error("invalid value '{value}', usage: {usage}")]
    InvalidValue { value: String, usage: &'static str },
}

pub type Result<T> = std::result::Result<T, CommandError>;

type Handler = fn(&Settings, &Command, Option<&str>) -> Result<CommandOutcome>;

pub struct Command {
    pub id: CommandId,
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    handler: Handler,
}

impl Command {
    pub fn run(&self, settings: &Settings, argument: Option<&str>) -> Result<CommandOutcome> {
        (self.handler)(settings, self, argument)
    }

    fn require<'a>(&self, argument: Option<&'a str>) -> Result<&'a str> {
        argument.ok_or(CommandError::MissingArgument(self.usage))
    }

    fn invalid(&self, value: &str) -> CommandError {
        CommandError::InvalidValue {
            value: value.to_string(),
            usage: self.usage,
        }
    }

    fn parse_seconds(&self, argument: Option<&str>) -> Result<f64> {
        let raw = self.require(argument)?;
        let value = raw
            .trim_end_matches('s')
            .parse::<f64>()
            .map_err(|_| self.invalid(raw))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(raw))
        }
    }

    fn parse_percent(&self, argument: Option<&str>) -> Result<u8> {
        let raw = self.require(argument)?;
        let value = raw
            .trim_end_matches('%')
            .parse::<u32>()
            .map_err(|_| self.invalid(raw))?;
        Ok(value.min(100) as u8)
    }
}

pub static COMMANDS: &[Command] = &[
    Command {
        id: CommandId::Pause,
        name: "pause",
        usage: "pause",
        summary: "pause or resume monitoring",
        handler: pause,
    },
    Command {
        id: CommandId::ToggleOutputVolume,
        name: "volume-output",
        usage: "volume-output",
        summary: "toggle restoring the system volume on resume",
        handler: toggle_output_volume,
    },
    Command {
        id: CommandId::TogglePlayerVolume,
        name: "volume-player",
        usage: "volume-player",
        summary: "toggle restoring the player volume on resume",
        handler: toggle_player_volume,
    },
    Command {
        id: CommandId::RequireSound,
        name: "require-sound",
        usage: "require-sound",
        summary: "toggle requiring another sound before resuming",
        handler: require_sound,
    },
    Command {
        id: CommandId::Timeout,
        name: "timeout",
        usage: "timeout <seconds>",
        summary: "silence before resuming",
        handler: timeout,
    },
    Command {
        id: CommandId::Interval,
        name: "interval",
        usage: "interval <seconds>",
        summary: "polling interval",
        handler: interval,
    },
    Command {
        id: CommandId::Threshold,
        name: "threshold",
        usage: "threshold <0.0-1.0 | N%>",
        summary: "peak level that counts as sound",
        handler: threshold,
    },
    Command {
        id: CommandId::MinDuration,
        name: "min-duration",
        usage: "min-duration <seconds>",
        summary: "how long another sound must play to arm a resume",
        handler: min_duration,
    },
    Command {
        id: CommandId::PlayerVolume,
        name: "player-volume",
        usage: "player-volume <0-100>",
        summary: "player volume applied on resume",
        handler: player_volume,
    },
    Command {
        id: CommandId::OutputVolume,
        name: "output-volume",
        usage: "output-volume <0-100>",
        summary: "system volume applied on resume",
        handler: output_volume,
    },
    Command {
        id: CommandId::Device,
        name: "device",
        usage: "device <name>",
        summary: "player device to resume on (empty to unset)",
        handler: device,
    },
    Command {
        id: CommandId::Status,
        name: "status",
        usage: "status",
        summary: "show current settings",
        handler: status,
    },
    Command {
        id: CommandId::Presets,
        name: "presets",
        usage: "presets",
        summary: "list suggested values",
        handler: presets,
    },
    Command {
        id: CommandId::Help,
        name: "help",
        usage: "help",
        summary: "list commands",
        handler: help,
    },
    Command {
        id: CommandId::Quit,
        name: "quit",
        usage: "quit",
        summary: "exit",
        handler: quit,
    },
];

/// Find a command by name (case-insensitive).
pub fn lookup(name: &str) -> Option<&'static Command> {
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

pub fn command(id: CommandId) -> Option<&'static Command> {
    COMMANDS.iter().find(|command| command.id == id)
}

/// Parse and run one input line. Blank lines yield `Ok(None)`.
pub fn dispatch(settings: &Settings, line: &str) -> Result<Option<CommandOutcome>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, argument) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim()).filter(|r| !r.is_empty())),
        None => (line, None),
    };

    let command = lookup(name).ok_or_else(|| CommandError::Unknown(name.to_string()))?;
    tracing::debug!(command = command.name, argument = ?argument, "dispatching command");
    command.run(settings, argument).map(Some)
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn pause(settings: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let paused = settings.toggle_paused();
    let message = if paused {
        "Monitoring paused"
    } else {
        "Monitoring resumed"
    };
    Ok(CommandOutcome::Updated(message.to_string()))
}

fn toggle_output_volume(settings: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let enabled = settings.toggle_apply_output_volume();
    Ok(CommandOutcome::Updated(format!(
        "Change system volume: {}",
        on_off(enabled)
    )))
}

fn toggle_player_volume(settings: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let enabled = settings.toggle_apply_player_volume();
    Ok(CommandOutcome::Updated(format!(
        "Change player volume: {}",
        on_off(enabled)
    )))
}

fn require_sound(settings: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let enabled = settings.toggle_require_non_player_sound();
    Ok(CommandOutcome::Updated(format!(
        "Require non-player sound: {}",
        on_off(enabled)
    )))
}

fn timeout(settings: &Settings, command: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    let seconds = settings.set_silence_timeout(command.parse_seconds(argument)?);
    Ok(CommandOutcome::Updated(format!("Silence timeout set to {}s", seconds)))
}

fn interval(settings: &Settings, command: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    let seconds = settings.set_polling_interval(command.parse_seconds(argument)?);
    Ok(CommandOutcome::Updated(format!("Polling interval set to {}s", seconds)))
}

fn min_duration(settings: &Settings, command: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    let seconds = settings.set_min_sound_duration(command.parse_seconds(argument)?);
    Ok(CommandOutcome::Updated(format!(
        "Minimum sound duration set to {}s",
        seconds
    )))
}

fn threshold(settings: &Settings, command: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    let raw = command.require(argument)?;
    let value = match raw.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f32>().map(|p| p / 100.0),
        None => raw.parse::<f32>(),
    }
    .map_err(|_| command.invalid(raw))?;
    if !value.is_finite() {
        return Err(command.invalid(raw));
    }

    let threshold = settings.set_silence_threshold(value);
    Ok(CommandOutcome::Updated(format!(
        "Silence threshold set to {} ({:.2}%)",
        threshold,
        threshold * 100.0
    )))
}

fn player_volume(settings: &Settings, command: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    let percent = settings.set_player_volume(command.parse_percent(argument)?);
    Ok(CommandOutcome::Updated(format!("Player volume set to {}%", percent)))
}

fn output_volume(settings: &Settings, command: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    let percent = settings.set_output_volume(command.parse_percent(argument)?);
    Ok(CommandOutcome::Updated(format!("System volume set to {}%", percent)))
}

fn device(settings: &Settings, _: &Command, argument: Option<&str>) -> Result<CommandOutcome> {
    settings.set_player_device(argument.unwrap_or_default());
    let message = match settings.player_device() {
        Some(name) => format!("Player device set to '{}'", name),
        None => "Player device unset".to_string(),
    };
    Ok(CommandOutcome::Updated(message))
}

fn status(settings: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let threshold = settings.silence_threshold();
    let lines = [
        format!("Paused: {}", on_off(settings.is_paused())),
        format!(
            "Device: {}",
            settings.player_device().as_deref().unwrap_or("<unset>")
        ),
        format!("Silence timeout: {}s", settings.silence_timeout().as_secs_f64()),
        format!("Polling interval: {}s", settings.polling_interval().as_secs_f64()),
        format!("Silence threshold: {} ({:.2}%)", threshold, threshold * 100.0),
        format!(
            "Require non-player sound: {} (min {}s)",
            on_off(settings.require_non_player_sound()),
            settings.min_sound_duration().as_secs_f64()
        ),
        format!(
            "Player volume: {}% ({})",
            settings.player_volume(),
            on_off(settings.apply_player_volume())
        ),
        format!(
            "System volume: {}% ({})",
            settings.output_volume(),
            on_off(settings.apply_output_volume())
        ),
    ];
    Ok(CommandOutcome::Info(lines.join("\n")))
}

fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn presets(_: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let lines = [
        format!("timeout: {}", join(TIMEOUT_PRESETS.iter().map(|s| format!("{}s", s)))),
        format!("interval: {}", join(INTERVAL_PRESETS.iter().map(|s| format!("{}s", s)))),
        format!(
            "threshold: {}",
            join(THRESHOLD_PRESETS.iter().map(|t| format!("{:.1}%", t * 100.0)))
        ),
        format!("volume: {}", join(VOLUME_PRESETS.iter().map(|v| format!("{}%", v)))),
    ];
    Ok(CommandOutcome::Info(lines.join("\n")))
}

fn help(_: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    let width = COMMANDS.iter().map(|c| c.usage.len()).max().unwrap_or(0);
    let lines: Vec<String> = COMMANDS
        .iter()
        .map(|c| format!("{:width$}  {}", c.usage, c.summary, width = width))
        .collect();
    Ok(CommandOutcome::Info(lines.join("\n")))
}

fn quit(_: &Settings, _: &Command, _: Option<&str>) -> Result<CommandOutcome> {
    Ok(CommandOutcome::Quit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    fn run(settings: &Settings, line: &str) -> Result<Option<CommandOutcome>> {
        dispatch(settings, line)
    }

    #[test]
    fn test_table_is_complete_and_unique() {
        let ids: HashSet<CommandId> = COMMANDS.iter().map(|c| c.id).collect();
        let names: HashSet<&str> = COMMANDS.iter().map(|c| c.name).collect();
        assert_eq!(ids.len(), COMMANDS.len());
        assert_eq!(names.len(), COMMANDS.len());
        assert_eq!(COMMANDS.len(), 15);

        for c in COMMANDS {
            assert_eq!(command(c.id).map(|found| found.name), Some(c.name));
            assert!(c.usage.starts_with(c.name));
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("timeout").unwrap().id, CommandId::Timeout);
        assert_eq!(lookup("PAUSE").unwrap().id, CommandId::Pause);
        assert!(lookup("resume").is_none());
    }

    #[test]
    fn test_blank_and_unknown_lines() {
        let settings = Settings::default();
        assert_eq!(run(&settings, "   "), Ok(None));
        assert_eq!(
            run(&settings, "louder 5"),
            Err(CommandError::Unknown("louder".to_string()))
        );
    }

    #[test]
    fn test_pause_toggles() {
        let settings = Settings::default();
        run(&settings, "pause").unwrap();
        assert!(settings.is_paused());
        run(&settings, "pause").unwrap();
        assert!(!settings.is_paused());
    }

    #[test]
    fn test_numeric_setters_clamp() {
        let settings = Settings::default();

        run(&settings, "timeout 120").unwrap();
        assert_eq!(settings.silence_timeout(), Duration::from_secs(120));

        run(&settings, "timeout 0").unwrap();
        assert_eq!(settings.silence_timeout(), Duration::from_secs(1));

        run(&settings, "interval 0.5s").unwrap();
        assert_eq!(settings.polling_interval(), Duration::from_millis(500));

        run(&settings, "min-duration 3").unwrap();
        assert_eq!(settings.min_sound_duration(), Duration::from_secs(3));

        run(&settings, "player-volume 250").unwrap();
        assert_eq!(settings.player_volume(), 100);

        run(&settings, "output-volume 40%").unwrap();
        assert_eq!(settings.output_volume(), 40);
    }

    #[test]
    fn test_threshold_accepts_scalar_and_percent() {
        let settings = Settings::default();

        run(&settings, "threshold 0.5%").unwrap();
        assert!((settings.silence_threshold() - 0.005).abs() < 1e-6);

        run(&settings, "threshold 0.02").unwrap();
        assert!((settings.silence_threshold() - 0.02).abs() < 1e-6);

        run(&settings, "threshold 7").unwrap();
        assert_eq!(settings.silence_threshold(), 1.0);
    }

    #[test]
    fn test_invalid_values() {
        let settings = Settings::default();
        assert_eq!(
            run(&settings, "timeout"),
            Err(CommandError::MissingArgument("timeout <seconds>"))
        );
        assert!(matches!(
            run(&settings, "timeout soon"),
            Err(CommandError::InvalidValue { .. })
        ));
        assert!(matches!(
            run(&settings, "threshold NaN"),
            Err(CommandError::InvalidValue { .. })
        ));
        assert!(matches!(
            run(&settings, "player-volume -5"),
            Err(CommandError::InvalidValue { .. })
        ));
        assert_eq!(settings.silence_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_device_keeps_spaces_and_unsets() {
        let settings = Settings::default();

        let outcome = run(&settings, "device Living Room Speaker").unwrap();
        assert_eq!(
            outcome,
            Some(CommandOutcome::Updated(
                "Player device set to 'Living Room Speaker'".to_string()
            ))
        );
        assert_eq!(settings.player_device().as_deref(), Some("Living Room Speaker"));

        run(&settings, "device").unwrap();
        assert_eq!(settings.player_device(), None);
    }

    #[test]
    fn test_toggles() {
        let settings = Settings::default();

        run(&settings, "require-sound").unwrap();
        assert!(settings.require_non_player_sound());

        run(&settings, "volume-output").unwrap();
        assert!(!settings.apply_output_volume());

        run(&settings, "volume-player").unwrap();
        assert!(!settings.apply_player_volume());
    }

    #[test]
    fn test_info_commands() {
        let settings = Settings::default();

        let Some(CommandOutcome::Info(status)) = run(&settings, "status").unwrap() else {
            panic!("status should be informational");
        };
        assert!(status.contains("Silence timeout: 30s"));
        assert!(status.contains("Device: <unset>"));

        let Some(CommandOutcome::Info(presets)) = run(&settings, "presets").unwrap() else {
            panic!("presets should be informational");
        };
        assert!(presets.contains("10s, 30s, 60s, 120s, 300s"));
        assert!(presets.contains("0.1%, 0.5%, 1.0%, 2.0%"));

        let Some(CommandOutcome::Info(help)) = run(&settings, "help").unwrap() else {
            panic!("help should be informational");
        };
        assert!(help.contains("min-duration <seconds>"));

        assert_eq!(run(&settings, "quit"), Ok(Some(CommandOutcome::Quit)));
    }
}
