// Purely for testing: an in-memory backend whose loads and track ends are
// driven by hand.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use super::{Player, Track};
use crate::audio_api::{AudioBackend, EqBand, LoadError, LoadedTrack};
use crate::config::Config;

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub requested: Vec<PathBuf>,
    completions: VecDeque<Result<LoadedTrack, LoadError>>,
    pub duration: Option<f64>,
    pub time: f64,
    pub playing: bool,
    pub volume: f32,
    pub rate: f32,
    pub looping: bool,
    pub cutoffs: HashMap<EqBand, f32>,
    pub cutoff_calls: usize,
    pub ended: u32,
    pub plays: u32,
    pub pauses: u32,
    pub stops: u32,
    pub seeks: Vec<f64>,
}

impl FakeBackend {
    /// Finishes the most recent load: `Ok(duration)` or a failure.
    pub fn complete(&mut self, outcome: Result<f64, ()>) {
        let path = self.requested.last().cloned().unwrap_or_default();
        self.completions.push_back(match outcome {
            Ok(duration) => Ok(LoadedTrack { duration }),
            Err(()) => Err(LoadError::LoadFailed { path, reason: "not a wav file".into() }),
        });
    }
}

impl AudioBackend for FakeBackend {
    fn load(&mut self, path: &Path) {
        self.requested.push(path.to_path_buf());
    }

    fn poll_load(&mut self) -> Option<Result<LoadedTrack, LoadError>> {
        let outcome = self.completions.pop_front()?;
        if let Ok(loaded) = &outcome {
            self.duration = Some(loaded.duration);
            self.time = 0.0;
            self.playing = false;
        }
        Some(outcome)
    }

    fn is_loaded(&self) -> bool {
        self.duration.is_some()
    }

    fn play(&mut self) {
        self.plays += 1;
        self.playing = self.is_loaded();
    }

    fn pause(&mut self) {
        self.pauses += 1;
        self.playing = false;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.playing = false;
        self.time = 0.0;
    }

    fn seek(&mut self, secs: f64) {
        self.seeks.push(secs);
        self.time = secs.clamp(0.0, self.duration());
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_band_cutoff(&mut self, band: EqBand, hz: f32) {
        self.cutoff_calls += 1;
        self.cutoffs.insert(band, hz);
    }

    fn take_ended(&mut self) -> bool {
        if self.ended == 0 {
            return false;
        }
        self.ended -= 1;
        true
    }
}

pub fn tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| Track {
            title: format!("Track {}", i + 1),
            source: PathBuf::from(format!("assets/track{i}.wav")),
        })
        .collect()
}

// Started, first track loaded, paused at 0.
pub fn loaded_player(n: usize, duration: f64) -> Player<FakeBackend> {
    let mut player = Player::new(FakeBackend::default(), tracks(n), &Config::default());
    player.start();
    player.backend.complete(Ok(duration));
    player.tick();
    player
}
