use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::fx::DistortionType;

/// Lower bound shared by every percentage parameter
pub const PARAM_MIN: f32 = 0.0;
/// Upper bound shared by every percentage parameter
pub const PARAM_MAX: f32 = 100.0;
/// Default position for gain, drive and output
pub const PARAM_DEFAULT: f32 = 50.0;

/// Parameter ID for addressing the numeric controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamId {
    Gain,
    Drive,
    Output,
}

impl ParamId {
    pub fn name(&self) -> &'static str {
        match self {
            ParamId::Gain => "Gain",
            ParamId::Drive => "Drive",
            ParamId::Output => "Output",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ParamId::Gain => "gain",
            ParamId::Drive => "drive",
            ParamId::Output => "output",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gain" => Some(ParamId::Gain),
            "drive" => Some(ParamId::Drive),
            "output" => Some(ParamId::Output),
            _ => None,
        }
    }

    /// All numeric params in display order
    pub fn all() -> Vec<ParamId> {
        vec![ParamId::Gain, ParamId::Drive, ParamId::Output]
    }
}

/// Clamp a percentage into [0, 100]. NaN yields `None` so callers keep the old value.
pub fn clamp_percent(value: f32) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(PARAM_MIN, PARAM_MAX))
    }
}

/// Plain copy of the parameter set, read once per block by the audio thread
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSnapshot {
    pub gain: f32,              // 0-100, default 50 (input level)
    pub drive: f32,             // 0-100, default 50 (distortion intensity)
    pub output: f32,            // 0-100, default 50 (output level)
    pub distortion_type: DistortionType,
    pub bypass: bool,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            gain: PARAM_DEFAULT,
            drive: PARAM_DEFAULT,
            output: PARAM_DEFAULT,
            distortion_type: DistortionType::HardClip,
            bypass: false,
        }
    }
}

impl ParamSnapshot {
    /// Copy with every numeric field forced into [0, 100].
    /// NaN fields fall back to the default position.
    pub fn clamped(&self) -> Self {
        Self {
            gain: clamp_percent(self.gain).unwrap_or(PARAM_DEFAULT),
            drive: clamp_percent(self.drive).unwrap_or(PARAM_DEFAULT),
            output: clamp_percent(self.output).unwrap_or(PARAM_DEFAULT),
            ..*self
        }
    }
}

/// Live parameter set shared between the control thread and the audio thread.
///
/// Every field is its own atomic: writers never block readers, and a reader
/// may observe a mix of old and new fields while an update is in flight.
#[derive(Debug)]
pub struct DistortionParams {
    gain: AtomicU32,
    drive: AtomicU32,
    output: AtomicU32,
    distortion_type: AtomicU8,
    bypass: AtomicBool,
}

impl DistortionParams {
    pub fn new() -> Self {
        Self::from_snapshot(&ParamSnapshot::default())
    }

    pub fn from_snapshot(snapshot: &ParamSnapshot) -> Self {
        let snapshot = snapshot.clamped();
        Self {
            gain: AtomicU32::new(snapshot.gain.to_bits()),
            drive: AtomicU32::new(snapshot.drive.to_bits()),
            output: AtomicU32::new(snapshot.output.to_bits()),
            distortion_type: AtomicU8::new(snapshot.distortion_type.index()),
            bypass: AtomicBool::new(snapshot.bypass),
        }
    }

    fn slot(&self, param: ParamId) -> &AtomicU32 {
        match param {
            ParamId::Gain => &self.gain,
            ParamId::Drive => &self.drive,
            ParamId::Output => &self.output,
        }
    }

    pub fn get(&self, param: ParamId) -> f32 {
        f32::from_bits(self.slot(param).load(Ordering::Relaxed))
    }

    /// Store a clamped value. NaN is ignored.
    pub fn set(&self, param: ParamId, value: f32) {
        if let Some(v) = clamp_percent(value) {
            self.slot(param).store(v.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn gain(&self) -> f32 {
        self.get(ParamId::Gain)
    }

    pub fn set_gain(&self, gain: f32) {
        self.set(ParamId::Gain, gain);
    }

    pub fn drive(&self) -> f32 {
        self.get(ParamId::Drive)
    }

    pub fn set_drive(&self, drive: f32) {
        self.set(ParamId::Drive, drive);
    }

    pub fn output(&self) -> f32 {
        self.get(ParamId::Output)
    }

    pub fn set_output(&self, output: f32) {
        self.set(ParamId::Output, output);
    }

    pub fn distortion_type(&self) -> DistortionType {
        DistortionType::from_index(self.distortion_type.load(Ordering::Relaxed))
    }

    pub fn set_distortion_type(&self, distortion_type: DistortionType) {
        self.distortion_type
            .store(distortion_type.index(), Ordering::Relaxed);
    }

    pub fn bypass(&self) -> bool {
        self.bypass.load(Ordering::Relaxed)
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
    }

    /// Flip bypass, returning the new state
    pub fn toggle_bypass(&self) -> bool {
        !self.bypass.fetch_xor(true, Ordering::Relaxed)
    }

    /// Read every field once. Fields are individually consistent only.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            gain: self.gain(),
            drive: self.drive(),
            output: self.output(),
            distortion_type: self.distortion_type(),
            bypass: self.bypass(),
        }
    }

    pub fn apply_snapshot(&self, snapshot: &ParamSnapshot) {
        self.set_gain(snapshot.gain);
        self.set_drive(snapshot.drive);
        self.set_output(snapshot.output);
        self.set_distortion_type(snapshot.distortion_type);
        self.set_bypass(snapshot.bypass);
    }
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_plugin_state() {
        let params = DistortionParams::new();
        assert_eq!(params.gain(), 50.0);
        assert_eq!(params.drive(), 50.0);
        assert_eq!(params.output(), 50.0);
        assert_eq!(params.distortion_type(), DistortionType::HardClip);
        assert!(!params.bypass());
    }

    #[test]
    fn writes_are_clamped_into_domain() {
        let params = DistortionParams::new();
        params.set_gain(150.0);
        params.set_drive(-20.0);
        params.set_output(f32::INFINITY);
        assert_eq!(params.gain(), 100.0);
        assert_eq!(params.drive(), 0.0);
        assert_eq!(params.output(), 100.0);
    }

    #[test]
    fn nan_write_keeps_previous_value() {
        let params = DistortionParams::new();
        params.set_drive(72.5);
        params.set_drive(f32::NAN);
        assert_eq!(params.drive(), 72.5);
    }

    #[test]
    fn toggle_bypass_returns_new_state() {
        let params = DistortionParams::new();
        assert!(params.toggle_bypass());
        assert!(params.bypass());
        assert!(!params.toggle_bypass());
        assert!(!params.bypass());
    }

    #[test]
    fn snapshot_round_trips_through_atomics() {
        let params = DistortionParams::new();
        let snap = ParamSnapshot {
            gain: 10.0,
            drive: 90.0,
            output: 0.0,
            distortion_type: DistortionType::Foldback,
            bypass: true,
        };
        params.apply_snapshot(&snap);
        assert_eq!(params.snapshot(), snap);
    }

    #[test]
    fn snapshot_json_fills_missing_fields_with_defaults() {
        let snap: ParamSnapshot =
            serde_json::from_str(r#"{ "drive": 80.0, "distortion_type": "SoftClip" }"#).unwrap();
        assert_eq!(snap.drive, 80.0);
        assert_eq!(snap.gain, 50.0);
        assert_eq!(snap.distortion_type, DistortionType::SoftClip);
        assert!(!snap.bypass);
    }

    #[test]
    fn param_keys_resolve() {
        for param in ParamId::all() {
            assert_eq!(ParamId::from_key(param.key()), Some(param));
        }
        assert_eq!(ParamId::from_key("mix"), None);
    }
}
