// The player core: transport state machine plus the pointer interaction
// layer. Everything is owned here and mutated only from the UI thread; the
// audio side is reached through the `AudioBackend` trait.

use std::f32::consts::TAU;
use std::path::PathBuf;

use crate::audio_api::{AudioBackend, EqBand};
use crate::config::{Config, ScratchPolicy};
use crate::hit::HitRegistry;
use crate::shared::{DisplayState, InputEvent};

mod interaction;
mod knob;
mod transport;

#[cfg(test)]
mod test_backend;

pub use interaction::{DragTarget, InteractionState};
pub use knob::{cutoff_hz, KnobId, KnobRange};

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub title: String,
    pub source: PathBuf,
}

/// Bipolar tone settings, 0.0 leaves a band at the centre of its sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EqSettings {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl EqSettings {
    pub fn get(&self, band: EqBand) -> f32 {
        match band {
            EqBand::Low => self.low,
            EqBand::Mid => self.mid,
            EqBand::High => self.high,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub current_track: usize,
    pub is_playing: bool,
    pub loop_mode: bool,
    pub volume: f32,
    pub eq: EqSettings,
}

impl PlayerState {
    pub fn knob(&self, knob: KnobId) -> f32 {
        match knob {
            KnobId::Low => self.eq.low,
            KnobId::Mid => self.eq.mid,
            KnobId::High => self.eq.high,
            KnobId::Volume => self.volume,
        }
    }

    fn knob_mut(&mut self, knob: KnobId) -> &mut f32 {
        match knob {
            KnobId::Low => &mut self.eq.low,
            KnobId::Mid => &mut self.eq.mid,
            KnobId::High => &mut self.eq.high,
            KnobId::Volume => &mut self.volume,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSettings {
    pub autoplay_on_track_change: bool,
    pub scratch: ScratchPolicy,
    pub scratch_seconds_per_unit: f64,
    pub scratch_radians_per_unit: f32,
    pub knob_sensitivity: f32,
    pub disc_speed: f32,
}

impl From<&Config> for PlayerSettings {
    fn from(config: &Config) -> Self {
        Self {
            autoplay_on_track_change: config.autoplay_on_track_change,
            scratch: config.scratch,
            scratch_seconds_per_unit: config.scratch_seconds_per_unit,
            scratch_radians_per_unit: config.scratch_radians_per_unit,
            knob_sensitivity: config.knob_sensitivity,
            disc_speed: config.disc_speed,
        }
    }
}

// A track change in flight. `resume_at` and `was_playing` describe the track
// that was loaded before it, so a failed load can put it back.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingLoad {
    index: usize,
    autoplay: bool,
    resume_at: f64,
    was_playing: bool,
}

pub struct Player<B: AudioBackend> {
    backend: B,
    tracks: Vec<Track>,
    state: PlayerState,
    interaction: InteractionState,
    settings: PlayerSettings,
    disc_angle: f32,
    // set when an end-of-track has been acted on, so a repeat is ignored
    end_signaled: bool,
    loaded_track: Option<usize>,
    pending: Option<PendingLoad>,
    status: Option<String>,
    playlist_scroll: usize,
}

impl<B: AudioBackend> Player<B> {
    pub fn new(backend: B, tracks: Vec<Track>, config: &Config) -> Self {
        Self {
            backend,
            tracks,
            state: PlayerState {
                current_track: 0,
                is_playing: false,
                loop_mode: false,
                volume: KnobRange::Unit.clamp(config.volume),
                eq: EqSettings::default(),
            },
            interaction: InteractionState::default(),
            settings: PlayerSettings::from(config),
            disc_angle: 0.0,
            end_signaled: false,
            loaded_track: None,
            pending: None,
            status: None,
            playlist_scroll: 0,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn handle_input(&mut self, event: InputEvent, registry: &HitRegistry) {
        match event {
            InputEvent::PointerDown(at) => self.pointer_down(at, registry),
            InputEvent::PointerDrag(at) => self.pointer_drag(at),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::Wheel { at, delta } => self.wheel(at, delta, registry),
            InputEvent::TogglePlay => self.toggle_play(),
            InputEvent::Next => self.next(),
            InputEvent::Prev => self.prev(),
            InputEvent::ToggleLoop => self.toggle_loop(),
            InputEvent::SeekBy(secs) => self.seek_by(secs),
            InputEvent::NudgeKnob(knob, delta) => self.nudge_knob(knob, delta),
            InputEvent::Quit => {}
        }
    }

    // One render-loop step: pick up finished loads and track ends, spin the
    // disc, and push the EQ to the backend whether or not it changed.
    pub fn tick(&mut self) {
        while let Some(outcome) = self.backend.poll_load() {
            self.on_load_complete(outcome);
        }
        // a guard armed on an earlier tick may drop now; one armed below
        // stays up for the rest of this tick
        self.release_end_guard();
        // an end reported by the outgoing track must not skip past the new one
        if self.backend.take_ended() && self.pending.is_none() {
            self.on_track_end();
        }

        if self.state.is_playing && !self.interaction.is_scratching() {
            self.disc_angle = (self.disc_angle + self.settings.disc_speed).rem_euclid(TAU);
        }
        self.apply_eq();
    }

    fn apply_eq(&mut self) {
        for band in EqBand::ALL {
            self.backend.set_band_cutoff(band, cutoff_hz(band, self.state.eq.get(band)));
        }
    }

    // Some(duration) only when there is something to seek in
    fn loaded_duration(&self) -> Option<f64> {
        let duration = self.backend.duration();
        (self.backend.is_loaded() && duration > 0.0).then_some(duration)
    }

    pub fn display_state(&self) -> DisplayState {
        let duration = self.loaded_duration().unwrap_or(0.0);
        let elapsed = self.backend.current_time().clamp(0.0, duration);
        let progress = if duration > 0.0 { elapsed / duration } else { 0.0 };

        DisplayState {
            titles: self.tracks.iter().map(|t| t.title.clone()).collect(),
            current_track: self.state.current_track,
            playing: self.state.is_playing,
            loading: self.pending.is_some(),
            loop_mode: self.state.loop_mode,
            scratching: self.interaction.is_scratching(),
            elapsed,
            duration,
            progress,
            disc_angle: self.disc_angle,
            knobs: KnobId::ALL.map(|k| (k, self.state.knob(k))),
            playlist_scroll: self.playlist_scroll,
            status: self.status.clone(),
        }
    }
}
