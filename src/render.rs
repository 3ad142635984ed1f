use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::fx::Distortion;
use crate::params::{DistortionParams, ParamSnapshot};
use crate::samples::{load_wav, write_wav, AudioBuffer};

/// Block length used when rendering offline, matching a typical host callback
pub const RENDER_BLOCK_SIZE: usize = 512;

/// Result of a render operation
#[derive(Debug)]
pub struct RenderResult {
    pub duration_secs: f32,
    pub frames: usize,
    pub channels: usize,
    pub sample_rate: u32,
}

/// Offline renderer that mirrors the real-time block loop
pub struct OfflineRenderer {
    distortion: Distortion,
}

impl OfflineRenderer {
    pub fn new(params: &ParamSnapshot) -> Self {
        let params = Arc::new(DistortionParams::from_snapshot(params));
        Self {
            distortion: Distortion::new(params),
        }
    }

    /// Process every channel in place, block by block
    pub fn render(&self, buffer: &mut AudioBuffer) {
        for channel in buffer.channels.iter_mut() {
            for block in channel.chunks_mut(RENDER_BLOCK_SIZE) {
                self.distortion.process_block(block);
            }
        }
    }
}

/// Render a WAV file through the distortion and write the result
pub fn render_wav(input: &Path, output: &Path, params: &ParamSnapshot) -> Result<RenderResult> {
    let mut buffer = load_wav(input)?;

    OfflineRenderer::new(params).render(&mut buffer);

    write_wav(output, &buffer)?;

    Ok(RenderResult {
        duration_secs: buffer.duration_secs(),
        frames: buffer.frames(),
        channels: buffer.channels.len(),
        sample_rate: buffer.sample_rate,
    })
}
