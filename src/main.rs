use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use beast_distortion::audio::AudioEngine;
use beast_distortion::command::CommandBus;
use beast_distortion::config::ParamArgs;
use beast_distortion::console::Console;
use beast_distortion::params::DistortionParams;
use beast_distortion::render::render_wav;
use beast_distortion::samples::load_wav;

/// Beast Distortion - hard clip, soft clip, overdrive and foldback waveshaping
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Process a WAV file offline and write the result
    Render {
        /// Source WAV file
        input: PathBuf,
        /// Destination WAV file (32-bit float)
        output: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Loop a WAV file through the distortion on the default output device
    Play {
        /// Source WAV file
        input: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Print the resolved parameters as JSON
    Params {
        #[command(flatten)]
        params: ParamArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Mode::Render {
            input,
            output,
            params,
        } => {
            let snapshot = params.resolve()?;
            let result = render_wav(&input, &output, &snapshot)?;
            println!(
                "Rendered {} ({} ch, {} Hz, {:.2}s) with {}",
                output.display(),
                result.channels,
                result.sample_rate,
                result.duration_secs,
                snapshot.distortion_type.name()
            );
            Ok(())
        }
        Mode::Play { input, params } => {
            let snapshot = params.resolve()?;
            let source = load_wav(&input)?;

            let command_bus = CommandBus::new();
            let params = Arc::new(DistortionParams::from_snapshot(&snapshot));

            let engine = AudioEngine::new(source, params.clone(), command_bus.receiver())?;
            println!("Playing {} (Ctrl-D or 'quit' to stop)", input.display());

            Console::new(command_bus.sender(), params, engine.status.clone()).run()
        }
        Mode::Params { params } => {
            let snapshot = params.resolve()?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}
