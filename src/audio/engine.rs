use std::sync::Arc;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use parking_lot::RwLock;

use crate::command::CommandReceiver;
use crate::fx::process_sample;
use crate::params::DistortionParams;
use crate::samples::AudioBuffer;

/// Playback state published by the audio thread for the control thread
#[derive(Clone, Debug, Default)]
pub struct EngineStatus {
    pub sample_rate: u32,
    pub channels: usize,
    /// Read position in the looped source, in frames
    pub position: usize,
    pub blocks: u64,
    pub peak_in: f32,
    pub peak_out: f32,
}

/// Audio engine streaming a looped source through the distortion
pub struct AudioEngine {
    _stream: Stream,
    pub params: Arc<DistortionParams>,
    pub status: Arc<RwLock<EngineStatus>>,
}

impl AudioEngine {
    /// Initialize the audio engine with the default output device
    pub fn new(
        source: AudioBuffer,
        params: Arc<DistortionParams>,
        command_rx: CommandReceiver,
    ) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device available")?;

        let config = device
            .default_output_config()
            .context("No default output config")?;
        let status = Arc::new(RwLock::new(EngineStatus::default()));

        let stream = match config.sample_format() {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config.into(),
                source,
                params.clone(),
                command_rx,
                status.clone(),
            )?,
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config.into(),
                source,
                params.clone(),
                command_rx,
                status.clone(),
            )?,
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config.into(),
                source,
                params.clone(),
                command_rx,
                status.clone(),
            )?,
            format => anyhow::bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start output stream")?;

        Ok(Self {
            _stream: stream,
            params,
            status,
        })
    }

    /// Build the audio stream for a specific sample format
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        source: AudioBuffer,
        params: Arc<DistortionParams>,
        command_rx: CommandReceiver,
        status: Arc<RwLock<EngineStatus>>,
    ) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        if source.sample_rate != sample_rate {
            eprintln!(
                "Resampling source from {} Hz to {} Hz",
                source.sample_rate, sample_rate
            );
        }
        let source = resample(source, sample_rate);

        if let Some(mut s) = status.try_write() {
            s.sample_rate = sample_rate;
            s.channels = channels;
        }

        let mut position = 0usize;
        let mut blocks = 0u64;

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let (peak_in, peak_out) =
                    fill_block(data, channels, &source, &mut position, &params, &command_rx);

                blocks += 1;
                if let Some(mut s) = status.try_write() {
                    s.position = position;
                    s.blocks = blocks;
                    s.peak_in = peak_in;
                    s.peak_out = peak_out;
                }
            },
            |err| {
                eprintln!("Audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }
}

/// Render one interleaved output block from the looped source.
///
/// Pending commands are applied first, so a block never sees a parameter
/// change partway through. A mono source feeds every device channel; otherwise
/// channels map one to one and device channels past the source are silent.
/// Returns the block's input and output peaks.
pub fn fill_block<T>(
    data: &mut [T],
    channels: usize,
    source: &AudioBuffer,
    position: &mut usize,
    params: &DistortionParams,
    command_rx: &CommandReceiver,
) -> (f32, f32)
where
    T: cpal::Sample + cpal::FromSample<f32>,
{
    while let Some(cmd) = command_rx.try_recv() {
        cmd.apply(params);
    }
    let snapshot = params.snapshot();

    let frames = source.frames();
    let source_channels = source.channels.len();
    let mut peak_in = 0.0f32;
    let mut peak_out = 0.0f32;

    if channels == 0 {
        return (peak_in, peak_out);
    }

    for frame in data.chunks_mut(channels) {
        for (ch, channel_sample) in frame.iter_mut().enumerate() {
            let input = match source_channels {
                _ if frames == 0 => None,
                1 => Some(source.channels[0][*position]),
                n if ch < n => Some(source.channels[ch][*position]),
                _ => None,
            };
            let output = match input {
                Some(input) => {
                    let output = process_sample(input, &snapshot);
                    peak_in = peak_in.max(input.abs());
                    peak_out = peak_out.max(output.abs());
                    output
                }
                None => 0.0,
            };
            *channel_sample = T::from_sample(output);
        }
        if frames > 0 {
            *position = (*position + 1) % frames;
        }
    }

    (peak_in, peak_out)
}

/// Linear-interpolation resample of every channel to `target_sr`
pub fn resample(buffer: AudioBuffer, target_sr: u32) -> AudioBuffer {
    if buffer.sample_rate == target_sr || target_sr == 0 {
        return buffer;
    }

    let ratio = buffer.sample_rate as f64 / target_sr as f64;
    let new_len = (buffer.frames() as f64 / ratio) as usize;
    let channels = buffer
        .channels
        .iter()
        .map(|channel| {
            let mut resampled = Vec::with_capacity(new_len);
            for i in 0..new_len {
                let pos = i as f64 * ratio;
                let idx = pos as usize;
                let frac = (pos - idx as f64) as f32;
                let s0 = channel.get(idx).copied().unwrap_or(0.0);
                let s1 = channel.get(idx + 1).copied().unwrap_or(s0);
                resampled.push(s0 + (s1 - s0) * frac);
            }
            resampled
        })
        .collect();

    AudioBuffer {
        channels,
        sample_rate: target_sr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandBus};
    use crate::fx::DistortionType;
    use crate::params::ParamId;

    fn unity_params() -> DistortionParams {
        let params = DistortionParams::new();
        params.set_gain(0.0);
        params.set_drive(0.0);
        params.set_output(50.0);
        params
    }

    #[test]
    fn block_applies_queued_commands_before_rendering() {
        let bus = CommandBus::new();
        let params = unity_params();
        let source = AudioBuffer {
            channels: vec![vec![0.5; 8]],
            sample_rate: 48000,
        };
        bus.sender().send(Command::SetParam { param: ParamId::Output, value: 0.0 });

        let mut data = [1.0f32; 8];
        let mut position = 0;
        fill_block(&mut data, 2, &source, &mut position, &params, &bus.receiver());

        assert_eq!(params.output(), 0.0);
        assert!(data.iter().all(|&s| s == 0.0));
        assert_eq!(bus.receiver().try_recv(), None);
    }

    #[test]
    fn mono_source_feeds_every_device_channel() {
        let bus = CommandBus::new();
        let params = unity_params();
        let source = AudioBuffer {
            channels: vec![vec![0.1, 0.2, 0.3]],
            sample_rate: 48000,
        };

        let mut data = [0.0f32; 6];
        let mut position = 0;
        fill_block(&mut data, 2, &source, &mut position, &params, &bus.receiver());

        assert_eq!(data, [0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn device_channels_past_the_source_are_silent() {
        let bus = CommandBus::new();
        let params = unity_params();
        let source = AudioBuffer {
            channels: vec![vec![0.25, 0.5], vec![-0.25, -0.5]],
            sample_rate: 48000,
        };

        let mut data = [1.0f32; 8];
        let mut position = 0;
        fill_block(&mut data, 4, &source, &mut position, &params, &bus.receiver());

        assert_eq!(data, [0.25, -0.25, 0.0, 0.0, 0.5, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn position_wraps_to_loop_the_source() {
        let bus = CommandBus::new();
        let params = unity_params();
        let source = AudioBuffer {
            channels: vec![vec![0.1, 0.2, 0.3]],
            sample_rate: 48000,
        };

        let mut data = [0.0f32; 4];
        let mut position = 1;
        fill_block(&mut data, 1, &source, &mut position, &params, &bus.receiver());

        assert_eq!(data, [0.2, 0.3, 0.1, 0.2]);
        assert_eq!(position, 2);
    }

    #[test]
    fn block_reports_input_and_output_peaks() {
        let bus = CommandBus::new();
        let params = DistortionParams::new();
        params.set_distortion_type(DistortionType::HardClip);
        let source = AudioBuffer {
            channels: vec![vec![0.05, -0.8, 0.3]],
            sample_rate: 48000,
        };

        let mut data = [0.0f32; 3];
        let mut position = 0;
        let (peak_in, peak_out) =
            fill_block(&mut data, 1, &source, &mut position, &params, &bus.receiver());

        assert_eq!(peak_in, 0.8);
        // -0.8 * 3 * 5.5 clips to -1, then output gain 1.0
        assert_eq!(peak_out, 1.0);
    }

    #[test]
    fn empty_source_renders_silence() {
        let bus = CommandBus::new();
        let params = DistortionParams::new();
        let source = AudioBuffer {
            channels: vec![Vec::new()],
            sample_rate: 48000,
        };

        let mut data = [0.7f32; 4];
        let mut position = 0;
        let peaks = fill_block(&mut data, 2, &source, &mut position, &params, &bus.receiver());

        assert_eq!(data, [0.0; 4]);
        assert_eq!(peaks, (0.0, 0.0));
        assert_eq!(position, 0);
    }

    #[test]
    fn resample_same_rate_is_untouched() {
        let buffer = AudioBuffer {
            channels: vec![vec![0.1, 0.2, 0.3]],
            sample_rate: 48000,
        };
        let out = resample(buffer, 48000);
        assert_eq!(out.channels[0], vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn resample_halves_length_when_downsampling() {
        let buffer = AudioBuffer {
            channels: vec![vec![0.0, 1.0, 2.0, 3.0], vec![0.0; 4]],
            sample_rate: 96000,
        };
        let out = resample(buffer, 48000);
        assert_eq!(out.sample_rate, 48000);
        assert_eq!(out.channels[0], vec![0.0, 2.0]);
        assert_eq!(out.channels[1].len(), 2);
    }
}
