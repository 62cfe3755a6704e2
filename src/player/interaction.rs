use super::{KnobId, Player};
use crate::audio_api::AudioBackend;
use crate::config::ScratchPolicy;
use crate::hit::{ButtonAction, Control, HitRegistry, Point, Region};

/// What the pointer is holding between press and release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragTarget {
    Scratch { last_x: f32, grabbed_at: f64, was_playing: bool },
    SeekBar { bar: Region },
    Knob { knob: KnobId, last_y: f32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
    pub drag: Option<DragTarget>,
}

impl InteractionState {
    pub fn is_scratching(&self) -> bool {
        matches!(self.drag, Some(DragTarget::Scratch { .. }))
    }
}

impl<B: AudioBackend> Player<B> {
    pub fn pointer_down(&mut self, at: Point, registry: &HitRegistry) {
        if self.interaction.drag.is_some() {
            // a release we never saw
            self.pointer_up();
        }
        let Some(hit) = registry.hit(at) else {
            return;
        };

        match hit.control {
            Control::Button(ButtonAction::Prev) => self.prev(),
            Control::Button(ButtonAction::TogglePlay) => self.toggle_play(),
            Control::Button(ButtonAction::Next) => self.next(),
            Control::Button(ButtonAction::ToggleLoop) => self.toggle_loop(),
            Control::Disc => self.begin_scratch(at),
            Control::SeekBar => {
                self.interaction.drag = Some(DragTarget::SeekBar { bar: hit.region });
                self.seek_fraction(hit.region.fraction_x(at) as f64);
            }
            Control::Knob(knob) => {
                self.interaction.drag = Some(DragTarget::Knob { knob, last_y: at.y });
            }
            Control::PlaylistRow(index) => self.select_track(index),
            Control::Playlist { .. } => {}
        }
    }

    fn begin_scratch(&mut self, at: Point) {
        if !self.backend.is_loaded() {
            return;
        }
        match self.settings.scratch {
            ScratchPolicy::Pause => self.backend.pause(),
            ScratchPolicy::Slow { rate } => self.backend.set_rate(rate),
        }
        self.interaction.drag = Some(DragTarget::Scratch {
            last_x: at.x,
            grabbed_at: self.backend.current_time(),
            was_playing: self.state.is_playing,
        });
    }

    pub fn pointer_drag(&mut self, at: Point) {
        match self.interaction.drag {
            Some(DragTarget::Scratch { last_x, grabbed_at, was_playing }) => {
                let dx = at.x - last_x;
                if dx != 0.0 {
                    if let Some(duration) = self.loaded_duration() {
                        let target = self.backend.current_time() + dx as f64 * self.settings.scratch_seconds_per_unit;
                        self.backend.seek(target.clamp(0.0, duration));
                    }
                    self.disc_angle = (self.disc_angle + dx * self.settings.scratch_radians_per_unit)
                        .rem_euclid(std::f32::consts::TAU);
                }
                self.interaction.drag = Some(DragTarget::Scratch { last_x: at.x, grabbed_at, was_playing });
            }
            Some(DragTarget::SeekBar { bar }) => self.seek_fraction(bar.fraction_x(at) as f64),
            Some(DragTarget::Knob { knob, last_y }) => {
                // screen y grows downward, dragging up turns the knob up
                let dy = at.y - last_y;
                self.nudge_knob(knob, -dy * self.settings.knob_sensitivity);
                self.interaction.drag = Some(DragTarget::Knob { knob, last_y: at.y });
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(DragTarget::Scratch { grabbed_at, was_playing, .. }) = self.interaction.drag.take() {
            match self.settings.scratch {
                // a pause or track change while held wins
                ScratchPolicy::Pause if was_playing && self.state.is_playing => self.backend.play(),
                ScratchPolicy::Pause => {}
                ScratchPolicy::Slow { .. } => self.backend.set_rate(1.0),
            }
            log::debug!(
                "scratch released: {grabbed_at:.2}s -> {:.2}s",
                self.backend.current_time()
            );
        }
    }

    pub fn wheel(&mut self, at: Point, delta: isize, registry: &HitRegistry) {
        let Some(visible) = registry.hits(at).find_map(|h| match h.control {
            Control::Playlist { visible } => Some(visible),
            _ => None,
        }) else {
            return;
        };
        let max_scroll = self.tracks.len().saturating_sub(visible);
        self.playlist_scroll = self.playlist_scroll.saturating_add_signed(delta).min(max_scroll);
    }
}
