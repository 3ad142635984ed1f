use std::sync::Arc;

use crate::params::{DistortionParams, ParamSnapshot};

/// Input gain: 1.0x - 5.0x over the 0-100 range
#[inline]
pub fn gain_factor(gain: f32) -> f32 {
    1.0 + (gain / 100.0) * 4.0
}

/// Distortion gain: 1.0x - 10.0x over the 0-100 range
#[inline]
pub fn drive_gain(drive: f32) -> f32 {
    1.0 + (drive / 100.0) * 9.0
}

/// Output gain: 0.0 - 2.0 over the 0-100 range
#[inline]
pub fn output_gain(output: f32) -> f32 {
    output / 100.0 * 2.0
}

/// Clamp to [-1, 1]
#[inline]
pub fn hard_clip(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}

/// Hyperbolic tangent saturation. In f32 this reaches exactly +/-1 once |x| passes about 9.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Exponential saturation beyond +/-1. The inner region passes through linearly.
#[inline]
pub fn overdrive(x: f32) -> f32 {
    if x > 1.0 {
        1.0 - (-x).exp()
    } else if x < -1.0 {
        -1.0 + x.exp()
    } else {
        x
    }
}

/// Reflect the excess over +/-1 back toward zero.
///
/// Only one reflection happens: past 3.0 the result crosses the opposite rail.
#[inline]
pub fn foldback(x: f32) -> f32 {
    if x > 1.0 {
        1.0 - (x - 1.0)
    } else if x < -1.0 {
        -1.0 - (x + 1.0)
    } else {
        x
    }
}

/// Run one sample through the full chain: bypass, gain, drive, shaper, output.
#[inline]
pub fn process_sample(input: f32, params: &ParamSnapshot) -> f32 {
    if params.bypass {
        return input;
    }

    let gain = gain_factor(params.gain);
    let drive = drive_gain(params.drive);
    let out = output_gain(params.output);

    let mut processed = input * gain;
    processed *= drive;

    params.distortion_type.shape(processed) * out
}

/// Waveshaping distortion reading live parameters.
///
/// Parameters are sampled once per block; a change made by the control thread
/// lands at the next block boundary.
pub struct Distortion {
    params: Arc<DistortionParams>,
}

impl Distortion {
    pub fn new(params: Arc<DistortionParams>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Arc<DistortionParams> {
        &self.params
    }

    pub fn process(&self, input: f32) -> f32 {
        process_sample(input, &self.params.snapshot())
    }

    /// Process a mono buffer in place
    pub fn process_block(&self, buffer: &mut [f32]) {
        let snapshot = self.params.snapshot();
        if snapshot.bypass {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = process_sample(*sample, &snapshot);
        }
    }

    /// Process planar channels in place, each one independently
    pub fn process_channels(&self, channels: &mut [&mut [f32]]) {
        let snapshot = self.params.snapshot();
        if snapshot.bypass {
            return;
        }
        for channel in channels.iter_mut() {
            for sample in channel.iter_mut() {
                *sample = process_sample(*sample, &snapshot);
            }
        }
    }

    /// Process interleaved frames in place
    pub fn process_interleaved(&self, data: &mut [f32], channels: usize) {
        let snapshot = self.params.snapshot();
        if snapshot.bypass || channels == 0 {
            return;
        }
        for frame in data.chunks_mut(channels) {
            for sample in frame.iter_mut() {
                *sample = process_sample(*sample, &snapshot);
            }
        }
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self::new(Arc::new(DistortionParams::new()))
    }
}
