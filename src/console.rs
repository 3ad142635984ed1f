use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::audio::EngineStatus;
use crate::command::{Command, CommandSender};
use crate::config::load_settings;
use crate::params::DistortionParams;

const HELP: &str = "\
Commands:
  gain <0-100>        input level
  drive <0-100>       distortion intensity
  output <0-100>      output level
  type <name|0-3>     hard_clip, soft_clip, overdrive, foldback
  bypass [on|off]     toggle or set bypass
  load <file.json>    apply a settings file
  show                print parameters as of the last audio block
  status              print playback status
  help                this text
  quit                stop playback";

/// What the console loop should do after a line
#[derive(Debug, PartialEq)]
pub enum ConsoleAction {
    Continue,
    Quit,
}

/// Line-based control surface feeding the command bus
pub struct Console {
    sender: CommandSender,
    params: Arc<DistortionParams>,
    status: Arc<RwLock<EngineStatus>>,
}

impl Console {
    pub fn new(
        sender: CommandSender,
        params: Arc<DistortionParams>,
        status: Arc<RwLock<EngineStatus>>,
    ) -> Self {
        Self {
            sender,
            params,
            status,
        }
    }

    /// Read commands from stdin until `quit` or end of input
    pub fn run(&self) -> Result<()> {
        println!("{}", HELP);
        let stdin = io::stdin();
        let mut out = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            if self.handle_line(&line, &mut out)? == ConsoleAction::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle one line of input, writing any report to `out`
    pub fn handle_line<W: Write>(&self, line: &str, out: &mut W) -> Result<ConsoleAction> {
        let trimmed = line.trim();
        match trimmed {
            "" => {}
            "quit" | "exit" | "q" => return Ok(ConsoleAction::Quit),
            "help" | "?" => writeln!(out, "{}", HELP)?,
            "show" => {
                let json = serde_json::to_string_pretty(&self.params.snapshot())?;
                writeln!(out, "{}", json)?;
            }
            "status" => {
                let s = self.status.read().clone();
                writeln!(
                    out,
                    "{} Hz, {} ch, frame {}, blocks {}, peak in {:.3}, peak out {:.3}",
                    s.sample_rate, s.channels, s.position, s.blocks, s.peak_in, s.peak_out
                )?;
            }
            _ => {
                let parsed = match trimmed.strip_prefix("load ") {
                    Some(path) => load_settings(Path::new(path.trim()))
                        .map(|snapshot| Command::LoadSnapshot(snapshot.clamped())),
                    None => Command::parse(trimmed),
                };
                match parsed {
                    Ok(cmd) => self.dispatch(cmd, out)?,
                    Err(e) => eprintln!("Error: {:#} (type 'help' for commands)", e),
                }
            }
        }
        Ok(ConsoleAction::Continue)
    }

    fn dispatch<W: Write>(&self, cmd: Command, out: &mut W) -> Result<()> {
        let description = cmd.description();
        if self.sender.send(cmd) {
            writeln!(out, "{}", description)?;
        }
        Ok(())
    }
}
