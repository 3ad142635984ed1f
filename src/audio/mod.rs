pub mod engine;

pub use engine::{fill_block, resample, AudioEngine, EngineStatus};
