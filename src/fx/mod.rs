pub mod distortion;

pub use distortion::{process_sample, Distortion};

use serde::{Deserialize, Serialize};

/// Waveshaping algorithm applied after gain staging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistortionType {
    #[default]
    HardClip,
    SoftClip,
    Overdrive,
    Foldback,
}

impl DistortionType {
    pub fn name(&self) -> &'static str {
        match self {
            DistortionType::HardClip => "Hard Clip",
            DistortionType::SoftClip => "Soft Clip",
            DistortionType::Overdrive => "Overdrive",
            DistortionType::Foldback => "Foldback",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            DistortionType::HardClip => "hard_clip",
            DistortionType::SoftClip => "soft_clip",
            DistortionType::Overdrive => "overdrive",
            DistortionType::Foldback => "foldback",
        }
    }

    /// Selector position, in the order the choices are presented
    pub fn index(&self) -> u8 {
        match self {
            DistortionType::HardClip => 0,
            DistortionType::SoftClip => 1,
            DistortionType::Overdrive => 2,
            DistortionType::Foldback => 3,
        }
    }

    /// Unknown selector positions fall back to hard clipping
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => DistortionType::SoftClip,
            2 => DistortionType::Overdrive,
            3 => DistortionType::Foldback,
            _ => DistortionType::HardClip,
        }
    }

    /// Accepts a key ("soft_clip"), a display name ("Soft Clip") or an index ("1")
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "hard_clip" | "hard" | "0" => Some(DistortionType::HardClip),
            "soft_clip" | "soft" | "1" => Some(DistortionType::SoftClip),
            "overdrive" | "2" => Some(DistortionType::Overdrive),
            "foldback" | "fold" | "3" => Some(DistortionType::Foldback),
            _ => None,
        }
    }

    pub fn all() -> Vec<DistortionType> {
        vec![
            DistortionType::HardClip,
            DistortionType::SoftClip,
            DistortionType::Overdrive,
            DistortionType::Foldback,
        ]
    }

    /// Apply this type's transfer curve to an already gain-staged sample
    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        match self {
            DistortionType::HardClip => distortion::hard_clip(x),
            DistortionType::SoftClip => distortion::soft_clip(x),
            DistortionType::Overdrive => distortion::overdrive(x),
            DistortionType::Foldback => distortion::foldback(x),
        }
    }
}
