use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::fx::DistortionType;
use crate::params::ParamSnapshot;

/// Parameter flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// JSON settings file holding a parameter snapshot; flags override it
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Input level, 0-100
    #[arg(long)]
    pub gain: Option<f32>,

    /// Distortion intensity, 0-100
    #[arg(long)]
    pub drive: Option<f32>,

    /// Output level, 0-100
    #[arg(long = "output-level")]
    pub output_level: Option<f32>,

    /// Waveshaper: hard_clip, soft_clip, overdrive, foldback (or 0-3)
    #[arg(long = "type", value_parser = parse_distortion_type)]
    pub distortion_type: Option<DistortionType>,

    /// Pass audio through unprocessed
    #[arg(long)]
    pub bypass: bool,
}

fn parse_distortion_type(s: &str) -> Result<DistortionType, String> {
    DistortionType::from_key(s).ok_or_else(|| {
        format!(
            "unknown distortion type '{}', expected one of: {}",
            s,
            DistortionType::all()
                .iter()
                .map(|t| t.key())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

/// Read a parameter snapshot from a JSON settings file
pub fn load_settings(path: &Path) -> Result<ParamSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {}", path.display()))?;
    let snapshot: ParamSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("Invalid settings file: {}", path.display()))?;
    Ok(snapshot)
}

impl ParamArgs {
    /// Merge defaults, the settings file and flags, then clamp into range
    pub fn resolve(&self) -> Result<ParamSnapshot> {
        let mut snapshot = match &self.settings {
            Some(path) => load_settings(path)?,
            None => ParamSnapshot::default(),
        };

        if let Some(gain) = self.gain {
            snapshot.gain = gain;
        }
        if let Some(drive) = self.drive {
            snapshot.drive = drive;
        }
        if let Some(output) = self.output_level {
            snapshot.output = output;
        }
        if let Some(t) = self.distortion_type {
            snapshot.distortion_type = t;
        }
        if self.bypass {
            snapshot.bypass = true;
        }

        Ok(snapshot.clamped())
    }
}
