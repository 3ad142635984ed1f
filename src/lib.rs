//! Realtime waveshaping distortion.
//!
//! The core is [`fx::process_sample`]: bypass, gain staging and one of four
//! transfer curves, applied to a single sample with a [`params::ParamSnapshot`].
//! [`params::DistortionParams`] holds the live controls in atomics so a control
//! thread can write while the audio thread reads.

pub mod audio;
pub mod command;
pub mod config;
pub mod console;
pub mod fx;
pub mod params;
pub mod render;
pub mod samples;

pub use fx::{process_sample, Distortion, DistortionType};
pub use params::{DistortionParams, ParamId, ParamSnapshot};
