use std::path::{Path, PathBuf};

pub use crate::audio::SampleBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EqBand {
    Low,
    Mid,
    High,
}

impl EqBand {
    pub const ALL: [EqBand; 3] = [EqBand::Low, EqBand::Mid, EqBand::High];

    // cutoff range the band's knob sweeps across, in Hz
    pub fn cutoff_range(self) -> (f32, f32) {
        match self {
            EqBand::Low => (80.0, 800.0),
            EqBand::Mid => (300.0, 2500.0),
            EqBand::High => (2500.0, 10000.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadedTrack {
    pub duration: f64, // seconds
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not load {}: {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },
}

// Everything the player needs from an audio backend. The player only ever
// talks to this trait; the cpal implementation lives in `crate::audio`.
pub trait AudioBackend {
    /// Starts loading `path` in the background. The result shows up in
    /// `poll_load`. A newer call supersedes any load still in flight.
    fn load(&mut self, path: &Path);
    fn poll_load(&mut self) -> Option<Result<LoadedTrack, LoadError>>;
    fn is_loaded(&self) -> bool;

    fn play(&mut self);
    fn pause(&mut self);
    /// Pauses and rewinds to zero.
    fn stop(&mut self);
    fn seek(&mut self, secs: f64);
    fn current_time(&self) -> f64;
    /// 0.0 until a track is loaded.
    fn duration(&self) -> f64;

    fn set_volume(&mut self, volume: f32);
    fn set_rate(&mut self, rate: f32);
    fn set_loop(&mut self, looping: bool);
    fn set_band_cutoff(&mut self, band: EqBand, hz: f32);

    /// True once for every natural end of the loaded track.
    fn take_ended(&mut self) -> bool;
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't decode files (it would stall the callback), so the
    // loader thread hands it a finished buffer.
    LoadTrack(SampleBuffer),
    Play,
    Pause,
    Stop,
    Seek { frame: f64 },
    SetVolume(f32),
    SetRate(f32),
    SetLoop(bool),
    SetCutoff { band: EqBand, hz: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    Ended,
}
