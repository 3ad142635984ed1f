use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use crate::fx::DistortionType;
use crate::params::{DistortionParams, ParamId, ParamSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // Numeric controls
    SetParam { param: ParamId, value: f32 },

    // Waveshaper selection
    SetDistortionType(DistortionType),

    // Bypass
    SetBypass(bool),
    ToggleBypass,

    // Whole parameter set, from a settings file
    LoadSnapshot(ParamSnapshot),
}

impl Command {
    /// Apply this command to the live parameter set
    pub fn apply(&self, params: &DistortionParams) {
        match self {
            Command::SetParam { param, value } => params.set(*param, *value),
            Command::SetDistortionType(t) => params.set_distortion_type(*t),
            Command::SetBypass(on) => params.set_bypass(*on),
            Command::ToggleBypass => {
                params.toggle_bypass();
            }
            Command::LoadSnapshot(snapshot) => params.apply_snapshot(snapshot),
        }
    }

    /// Parse a console line such as `gain 70`, `type soft_clip` or `bypass on`
    pub fn parse(line: &str) -> Result<Command> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            bail!("empty command");
        };
        let arg = words.collect::<Vec<_>>().join(" ");
        let head = head.to_ascii_lowercase();

        if let Some(param) = ParamId::from_key(&head) {
            let value: f32 = arg
                .parse()
                .map_err(|_| anyhow!("{} expects a number, got '{}'", param.key(), arg))?;
            return Ok(Command::SetParam { param, value });
        }

        match head.as_str() {
            "type" => DistortionType::from_key(&arg)
                .map(Command::SetDistortionType)
                .ok_or_else(|| anyhow!("unknown distortion type '{}'", arg)),
            "bypass" => match arg.to_ascii_lowercase().as_str() {
                "" | "toggle" => Ok(Command::ToggleBypass),
                "on" | "true" | "1" => Ok(Command::SetBypass(true)),
                "off" | "false" | "0" => Ok(Command::SetBypass(false)),
                other => bail!("bypass expects on/off, got '{}'", other),
            },
            _ => bail!("unknown command '{}'", head),
        }
    }

    /// Human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            Command::SetParam { param, value } => {
                format!("Set {} to {:.1}", param.name(), value)
            }
            Command::SetDistortionType(t) => format!("Set type to {}", t.name()),
            Command::SetBypass(true) => "Bypass on".to_string(),
            Command::SetBypass(false) => "Bypass off".to_string(),
            Command::ToggleBypass => "Toggle bypass".to_string(),
            Command::LoadSnapshot(s) => format!(
                "Load {} gain {:.1} drive {:.1} output {:.1}{}",
                s.distortion_type.name(),
                s.gain,
                s.drive,
                s.output,
                if s.bypass { " (bypassed)" } else { "" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_params() {
        assert_eq!(
            Command::parse("gain 70").unwrap(),
            Command::SetParam { param: ParamId::Gain, value: 70.0 }
        );
        assert_eq!(
            Command::parse("  OUTPUT   12.5 ").unwrap(),
            Command::SetParam { param: ParamId::Output, value: 12.5 }
        );
    }

    #[test]
    fn parses_type_and_bypass() {
        assert_eq!(
            Command::parse("type soft clip").unwrap(),
            Command::SetDistortionType(DistortionType::SoftClip)
        );
        assert_eq!(Command::parse("bypass").unwrap(), Command::ToggleBypass);
        assert_eq!(Command::parse("bypass off").unwrap(), Command::SetBypass(false));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("drive loud").is_err());
        assert!(Command::parse("type fuzz").is_err());
        assert!(Command::parse("mix 50").is_err());
    }

    #[test]
    fn apply_clamps_through_params() {
        let params = DistortionParams::new();
        Command::SetParam { param: ParamId::Drive, value: 400.0 }.apply(&params);
        Command::SetDistortionType(DistortionType::Overdrive).apply(&params);
        Command::ToggleBypass.apply(&params);
        assert_eq!(params.drive(), 100.0);
        assert_eq!(params.distortion_type(), DistortionType::Overdrive);
        assert!(params.bypass());
    }

    #[test]
    fn load_snapshot_replaces_every_field() {
        let params = DistortionParams::new();
        let snapshot = ParamSnapshot {
            gain: 5.0,
            drive: 150.0,
            output: 20.0,
            distortion_type: DistortionType::Foldback,
            bypass: true,
        };
        Command::LoadSnapshot(snapshot).apply(&params);
        assert_eq!(
            params.snapshot(),
            ParamSnapshot {
                drive: 100.0,
                ..snapshot
            }
        );
    }
}
