use super::{KnobId, PendingLoad, Player};
use crate::audio_api::{AudioBackend, LoadError, LoadedTrack};

// how close to the end playback may sit before the end guard stays armed
const END_WINDOW_SECS: f64 = 0.25;

impl<B: AudioBackend> Player<B> {
    /// Pushes the initial chain settings and preloads the first track
    /// without starting it.
    pub fn start(&mut self) {
        self.backend.set_volume(self.state.volume);
        self.backend.set_loop(self.state.loop_mode);
        self.apply_eq();
        if !self.tracks.is_empty() {
            self.begin_load(self.state.current_track, false);
        }
    }

    pub fn toggle_play(&mut self) {
        // the backend still holds the outgoing track; play once the new one lands
        if let Some(pending) = self.pending.as_mut() {
            pending.autoplay = !pending.autoplay;
            log::debug!("play on load {}", if pending.autoplay { "on" } else { "off" });
            return;
        }
        if !self.backend.is_loaded() {
            return;
        }
        if self.state.is_playing {
            self.backend.pause();
            self.state.is_playing = false;
        } else {
            self.resume();
        }
    }

    // every path back into Playing goes through here
    fn resume(&mut self) {
        self.backend.play();
        self.state.is_playing = true;
        self.end_signaled = false;
    }

    pub fn next(&mut self) {
        self.step_track(1);
    }

    pub fn prev(&mut self) {
        self.step_track(-1);
    }

    fn step_track(&mut self, step: isize) {
        let n = self.tracks.len() as isize;
        if n == 0 {
            return;
        }
        let index = (self.state.current_track as isize + step).rem_euclid(n) as usize;
        self.change_track(index);
    }

    pub fn select_track(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.change_track(index);
        }
    }

    fn change_track(&mut self, index: usize) {
        // a second change while loading still restores the track before both
        let (resume_at, was_playing) = match self.pending {
            Some(p) => (p.resume_at, p.was_playing),
            None => (self.backend.current_time(), self.state.is_playing),
        };
        self.backend.stop();
        while self.backend.take_ended() {}
        self.state.is_playing = false;
        self.state.current_track = index;
        log::info!("switching to track {index}: {}", self.tracks[index].title);
        self.begin_load(index, self.settings.autoplay_on_track_change);
        if let Some(pending) = self.pending.as_mut() {
            pending.resume_at = resume_at;
            pending.was_playing = was_playing;
        }
    }

    fn begin_load(&mut self, index: usize, autoplay: bool) {
        self.pending = Some(PendingLoad { index, autoplay, resume_at: 0.0, was_playing: false });
        self.status = None;
        self.backend.load(&self.tracks[index].source);
    }

    pub(super) fn on_load_complete(&mut self, outcome: Result<LoadedTrack, LoadError>) {
        let Some(pending) = self.pending.take() else {
            log::debug!("load completed with nothing pending");
            return;
        };
        match outcome {
            Ok(loaded) => {
                log::info!(
                    "loaded \"{}\" ({:.1}s)",
                    self.tracks[pending.index].title,
                    loaded.duration
                );
                self.loaded_track = Some(pending.index);
                // the new source starts with a fresh chain
                self.backend.set_volume(self.state.volume);
                self.backend.set_loop(self.state.loop_mode);
                self.apply_eq();
                if pending.autoplay {
                    self.resume();
                }
            }
            Err(e) => {
                log::warn!("{e}");
                self.status = Some(e.to_string());
                if let Some(previous) = self.loaded_track {
                    // the old buffer is still in the backend, pick up where it was
                    self.state.current_track = previous;
                    self.backend.seek(pending.resume_at);
                    if pending.was_playing {
                        self.resume();
                    }
                }
            }
        }
    }

    pub fn toggle_loop(&mut self) {
        self.state.loop_mode = !self.state.loop_mode;
        self.backend.set_loop(self.state.loop_mode);
        log::debug!("loop mode {}", if self.state.loop_mode { "on" } else { "off" });
    }

    pub fn on_track_end(&mut self) {
        if self.end_signaled {
            log::debug!("ignoring repeated end of track");
            return;
        }
        self.end_signaled = true;
        if self.state.loop_mode {
            self.backend.seek(0.0);
            self.backend.play();
            self.state.is_playing = true;
        } else {
            self.next();
        }
    }

    // After a loop restart the guard drops once playback is clear of the end.
    pub(super) fn release_end_guard(&mut self) {
        if !self.end_signaled || !self.state.is_playing || self.interaction.is_scratching() {
            return;
        }
        if let Some(duration) = self.loaded_duration() {
            if self.backend.current_time() < duration - END_WINDOW_SECS {
                self.end_signaled = false;
            }
        }
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        if let Some(duration) = self.loaded_duration() {
            self.backend.seek(fraction.clamp(0.0, 1.0) * duration);
        }
    }

    pub fn seek_by(&mut self, secs: f64) {
        if let Some(duration) = self.loaded_duration() {
            let target = (self.backend.current_time() + secs).clamp(0.0, duration);
            self.backend.seek(target);
        }
    }

    pub fn nudge_knob(&mut self, knob: KnobId, delta: f32) {
        let value = self.state.knob_mut(knob);
        *value = knob.range().clamp(*value + delta);
        if knob == KnobId::Volume {
            self.backend.set_volume(self.state.volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::audio_api::{AudioBackend, EqBand};
    use crate::config::Config;
    use crate::player::test_backend::{loaded_player, tracks, FakeBackend};
    use crate::player::{KnobId, Player};

    #[test]
    fn start_preloads_without_playing() {
        let mut player = Player::new(FakeBackend::default(), tracks(4), &Config::default());
        player.start();
        assert_eq!(player.backend.requested.len(), 1);
        player.backend.complete(Ok(120.0));
        player.tick();
        assert!(player.backend.is_loaded());
        assert!(!player.state().is_playing);
        assert_eq!(player.backend.volume, 0.8);
    }

    #[test]
    fn toggle_play_needs_a_loaded_track() {
        let mut player = Player::new(FakeBackend::default(), tracks(2), &Config::default());
        player.toggle_play();
        assert!(!player.state().is_playing);
        assert_eq!(player.backend.plays, 0);
    }

    #[test]
    fn toggling_twice_is_a_no_op() {
        let mut player = loaded_player(4, 200.0);
        player.backend.seek(42.0);
        player.toggle_play();
        assert!(player.state().is_playing);
        player.toggle_play();
        player.toggle_play();
        assert!(player.state().is_playing);
        assert_eq!(player.backend.current_time(), 42.0);

        player.toggle_play();
        assert!(!player.state().is_playing);
        assert!(!player.backend.playing);
    }

    #[test]
    fn prev_then_next_wraps_back() {
        let mut player = loaded_player(4, 200.0);
        player.prev();
        assert_eq!(player.state().current_track, 3);
        player.next();
        assert_eq!(player.state().current_track, 0);

        for start in 0..4 {
            player.select_track(start);
            player.next();
            player.prev();
            assert_eq!(player.state().current_track, start);
        }
    }

    #[test]
    fn track_change_auto_plays_even_from_paused() {
        let mut player = loaded_player(4, 200.0);
        assert!(!player.state().is_playing);
        player.next();
        assert!(!player.backend.playing);
        assert_eq!(player.backend.stops, 1);

        player.backend.complete(Ok(90.0));
        player.tick();
        assert!(player.state().is_playing);
        assert!(player.backend.playing);
        assert_eq!(player.backend.requested.last(), Some(&player.tracks()[1].source));
    }

    #[test]
    fn autoplay_can_be_turned_off() {
        let config = Config { autoplay_on_track_change: false, ..Config::default() };
        let mut player = Player::new(FakeBackend::default(), tracks(3), &config);
        player.start();
        player.backend.complete(Ok(60.0));
        player.tick();
        player.next();
        player.backend.complete(Ok(60.0));
        player.tick();
        assert!(!player.state().is_playing);
    }

    #[test]
    fn failed_load_keeps_the_previous_track() {
        let mut player = loaded_player(4, 200.0);
        player.next();
        player.backend.complete(Err(()));
        player.tick();

        let ds = player.display_state();
        assert_eq!(ds.current_track, 0);
        assert!(!ds.loading);
        assert!(ds.status.as_deref().is_some_and(|s| s.contains("could not load")));
        assert!(player.backend.is_loaded());
        assert_eq!(player.backend.duration(), 200.0);
        // it was paused before the skip and stays paused
        assert!(!ds.playing);
        assert!(!player.backend.playing);
    }

    #[test]
    fn play_pressed_while_loading_waits_for_the_new_track() {
        let config = Config { autoplay_on_track_change: false, ..Config::default() };
        let mut player = Player::new(FakeBackend::default(), tracks(3), &config);
        player.start();
        player.backend.complete(Ok(60.0));
        player.tick();

        player.next();
        player.toggle_play();
        assert!(!player.state().is_playing);
        assert!(!player.backend.playing);
        assert_eq!(player.backend.plays, 0);

        player.backend.complete(Ok(90.0));
        player.tick();
        assert!(player.state().is_playing);
        assert!(player.backend.playing);
        assert_eq!(player.backend.duration(), 90.0);
    }

    #[test]
    fn play_toggled_twice_while_loading_cancels_autoplay() {
        let mut player = loaded_player(3, 60.0);
        player.next();
        player.toggle_play();
        player.backend.complete(Ok(90.0));
        player.tick();
        assert!(!player.state().is_playing);
        assert!(!player.backend.playing);
    }

    #[test]
    fn failed_load_resumes_the_previous_track_where_it_was() {
        let mut player = loaded_player(4, 200.0);
        player.toggle_play();
        player.backend.seek(90.0);

        player.next();
        player.backend.complete(Err(()));
        player.tick();
        assert_eq!(player.state().current_track, 0);
        assert!(player.state().is_playing);
        assert!(player.backend.playing);
        assert_eq!(player.backend.current_time(), 90.0);
    }

    #[test]
    fn failed_load_after_two_skips_restores_the_first_track() {
        let mut player = loaded_player(4, 200.0);
        player.toggle_play();
        player.backend.seek(42.0);

        player.next();
        player.next();
        player.backend.complete(Err(()));
        player.tick();
        assert_eq!(player.state().current_track, 0);
        assert!(player.state().is_playing);
        assert_eq!(player.backend.current_time(), 42.0);
    }

    #[test]
    fn end_queued_before_a_skip_does_not_skip_again() {
        let mut player = loaded_player(4, 200.0);
        player.toggle_play();
        player.backend.ended += 1;

        player.next();
        player.tick();
        assert_eq!(player.state().current_track, 1);
        assert_eq!(player.backend.requested.len(), 2);
    }

    #[test]
    fn end_reported_while_loading_is_ignored() {
        let mut player = loaded_player(4, 200.0);
        player.next();
        player.backend.ended += 1;
        player.tick();
        assert_eq!(player.state().current_track, 1);

        player.backend.complete(Ok(100.0));
        player.tick();
        assert_eq!(player.state().current_track, 1);
        assert!(player.state().is_playing);
    }

    #[test]
    fn end_with_loop_restarts_and_keeps_playing() {
        let mut player = loaded_player(4, 200.0);
        player.toggle_loop();
        assert!(player.backend.looping);
        player.toggle_play();
        player.backend.seek(200.0);

        player.backend.ended += 1;
        player.tick();
        assert_eq!(player.state().current_track, 0);
        assert!(player.state().is_playing);
        assert_eq!(player.backend.current_time(), 0.0);
        assert_eq!(player.backend.requested.len(), 1);
    }

    #[test]
    fn end_without_loop_advances() {
        let mut player = loaded_player(4, 200.0);
        player.select_track(3);
        player.backend.complete(Ok(200.0));
        player.tick();
        assert!(player.state().is_playing);

        player.backend.ended += 1;
        player.tick();
        assert_eq!(player.state().current_track, 0);
        assert!(player.display_state().loading);
        player.backend.complete(Ok(100.0));
        player.tick();
        assert!(player.state().is_playing);
    }

    #[test]
    fn repeated_end_signal_is_ignored() {
        let mut player = loaded_player(4, 200.0);
        player.toggle_play();
        player.backend.seek(199.9);

        player.on_track_end();
        player.on_track_end();
        player.backend.ended += 1;
        player.tick();
        assert_eq!(player.state().current_track, 1);
        assert_eq!(player.backend.requested.len(), 2);
    }

    #[test]
    fn repeated_end_after_loop_restart_restarts_once() {
        let mut player = loaded_player(4, 200.0);
        player.toggle_loop();
        player.toggle_play();
        player.backend.seek(200.0);

        player.backend.ended += 1;
        player.tick();
        let seeks = player.backend.seeks.len();

        // still inside the same end window
        player.on_track_end();
        assert_eq!(player.backend.seeks.len(), seeks);

        // the next tick sees playback clear of the end, so a new end counts
        player.tick();
        player.backend.seek(200.0);
        player.backend.ended += 1;
        player.tick();
        assert_eq!(player.backend.current_time(), 0.0);
        assert_eq!(player.backend.seeks.len(), seeks + 2);
    }

    #[test]
    fn seek_fraction_reads_back() {
        let mut player = loaded_player(4, 180.0);
        for p in [0.0, 0.25, 0.5, 1.0] {
            player.seek_fraction(p);
            assert!((player.backend.current_time() - p * 180.0).abs() < 1e-9);
        }
        player.seek_fraction(3.0);
        assert_eq!(player.backend.current_time(), 180.0);
    }

    #[test]
    fn seeks_are_ignored_before_anything_loads() {
        let mut player = Player::new(FakeBackend::default(), tracks(2), &Config::default());
        player.seek_fraction(0.5);
        player.seek_by(10.0);
        assert!(player.backend.seeks.is_empty());
        let ds = player.display_state();
        assert_eq!(ds.progress, 0.0);
        assert_eq!(ds.duration, 0.0);
    }

    #[test]
    fn knob_nudges_stay_in_range() {
        let mut player = loaded_player(4, 180.0);
        for _ in 0..50 {
            player.nudge_knob(KnobId::Volume, 0.3);
            player.nudge_knob(KnobId::Low, -0.3);
        }
        assert_eq!(player.state().volume, 1.0);
        assert_eq!(player.state().eq.low, -1.0);
        assert_eq!(player.backend.volume, 1.0);

        player.tick();
        assert_eq!(player.backend.cutoffs[&EqBand::Low], 80.0);
        assert_eq!(player.backend.cutoffs[&EqBand::High], 6250.0);
    }

    #[test]
    fn eq_is_reapplied_every_tick() {
        let mut player = loaded_player(4, 180.0);
        let before = player.backend.cutoff_calls;
        player.tick();
        player.tick();
        assert_eq!(player.backend.cutoff_calls, before + 6);
    }

    #[test]
    fn disc_spins_only_while_playing() {
        let mut player = loaded_player(4, 180.0);
        player.tick();
        assert_eq!(player.display_state().disc_angle, 0.0);
        player.toggle_play();
        player.tick();
        assert!((player.display_state().disc_angle - 0.02).abs() < 1e-6);
    }
}
