use std::path::Path;

use anyhow::{bail, Context, Result};

/// Planar audio loaded from a WAV file
pub struct AudioBuffer {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Interleave channels into frames, ch0 ch1 ch0 ch1 ...
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}

/// Load a WAV file into planar f32 channels, normalising integer formats to [-1, 1]
pub fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV: {}", path.display()))?;

    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        bail!("WAV file has no channels: {}", path.display());
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<hound::Result<Vec<f32>>>()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<hound::Result<Vec<f32>>>(),
    }
    .with_context(|| format!("Failed to decode WAV: {}", path.display()))?;

    if samples.is_empty() {
        bail!("WAV file is empty: {}", path.display());
    }

    // De-interleave; a trailing partial frame is dropped
    let frames = samples.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in samples.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    Ok(AudioBuffer {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write planar channels as a 32-bit float WAV file
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channels.len() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for sample in buffer.interleaved() {
        writer.write_sample(sample)?;
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;

    Ok(())
}
