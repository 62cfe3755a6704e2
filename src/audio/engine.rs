use std::sync::Arc;
use std::sync::atomic::Ordering;

use crossbeam_channel::{Receiver, Sender};

use super::PlaybackAtomics;
use super::filter::ThreeBandEq;
use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use crate::audio_api::{AudioCommand, AudioEvent};

// Single-track transport that runs inside the audio callback. It never
// blocks: commands come in through the callback, events and the analysis
// tap go out through try_send.
pub struct Engine {
    track: Option<SampleBuffer>,
    pos: f64, // in frames, fractional while the rate isn't 1.0
    rate: f64,
    volume: f32,
    playing: bool,
    looping: bool,
    eq: ThreeBandEq,
    atomics: Arc<PlaybackAtomics>,
    events_tx: Sender<AudioEvent>,
    tap_tx: Sender<Vec<f32>>,
    spare_rx: Receiver<Vec<f32>>, // tap blocks the analyzer is done with
}

impl Engine {
    pub fn new(
        sample_rate: u32,
        atomics: Arc<PlaybackAtomics>,
        events_tx: Sender<AudioEvent>,
        tap_tx: Sender<Vec<f32>>,
        spare_rx: Receiver<Vec<f32>>,
    ) -> Self {
        Self {
            track: None,
            pos: 0.0,
            rate: 1.0,
            volume: 1.0,
            playing: false,
            looping: false,
            eq: ThreeBandEq::new(sample_rate as f32),
            atomics,
            events_tx,
            tap_tx,
            spare_rx,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::LoadTrack(buffer) => {
                self.track = Some(buffer);
                self.pos = 0.0;
                self.playing = false;
            }
            AudioCommand::Play => self.playing = self.track.is_some(),
            AudioCommand::Pause => self.playing = false,
            AudioCommand::Stop => {
                self.playing = false;
                self.pos = 0.0;
            }
            AudioCommand::Seek { frame } => {
                let len = self.track.as_ref().map_or(0, SampleBuffer::len) as f64;
                self.pos = frame.clamp(0.0, len);
            }
            AudioCommand::SetVolume(v) => self.volume = v.clamp(0.0, 1.0),
            AudioCommand::SetRate(r) => self.rate = r.max(0.0) as f64,
            AudioCommand::SetLoop(l) => self.looping = l,
            AudioCommand::SetCutoff { band, hz } => self.eq.set_cutoff(band, hz),
        }
        self.publish();
    }

    fn publish(&self) {
        self.atomics.position.store(self.pos.to_bits(), Ordering::Relaxed);
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());

        if let (true, Some(track)) = (self.playing, self.track.as_ref()) {
            let len = track.len();
            for frame in out.iter_mut() {
                if len == 0 {
                    break;
                }
                if self.pos >= len as f64 {
                    if self.looping {
                        self.pos %= len as f64;
                    } else {
                        self.pos = len as f64;
                        self.playing = false;
                        let _ = self.events_tx.try_send(AudioEvent::Ended);
                        break;
                    }
                }
                let i = self.pos as usize;
                let frac = (self.pos - i as f64) as f32;
                let s0 = track.data[i];
                let s1 = track.data.get(i + 1).copied().unwrap_or(s0);
                *frame = s0.lerp(s1, frac);
                self.pos += self.rate;
            }
        }

        self.eq.process(out);
        for frame in out.iter_mut() {
            *frame = frame.scaled(self.volume);
        }

        // only allocates while the spare pool is empty
        let mut tap = self.spare_rx.try_recv().unwrap_or_default();
        tap.clear();
        tap.extend(out.iter().map(|f| f.mono()));
        let _ = self.tap_tx.try_send(tap);
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (Engine, Arc<PlaybackAtomics>, Receiver<AudioEvent>) {
        let atomics = Arc::new(PlaybackAtomics::default());
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let (tap_tx, _tap_rx) = crossbeam_channel::bounded(1);
        let (_spare_tx, spare_rx) = crossbeam_channel::bounded(1);
        let engine = Engine::new(1000, atomics.clone(), events_tx, tap_tx, spare_rx);
        (engine, atomics, events_rx)
    }

    fn track(frames: usize) -> SampleBuffer {
        let data = (0..frames)
            .map(|i| StereoFrame { left: i as f32, right: i as f32 })
            .collect();
        SampleBuffer::from_frames(data, 1000)
    }

    fn position(atomics: &PlaybackAtomics) -> f64 {
        f64::from_bits(atomics.position.load(Ordering::Relaxed))
    }

    #[test]
    fn silent_until_played() {
        let (mut engine, atomics, _events) = engine();
        engine.handle_cmd(AudioCommand::LoadTrack(track(100)));
        let mut out = vec![StereoFrame { left: 1.0, right: 1.0 }; 32];
        engine.render_block(&mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
        assert_eq!(position(&atomics), 0.0);
    }

    #[test]
    fn natural_end_fires_once_and_stops() {
        let (mut engine, atomics, events) = engine();
        engine.handle_cmd(AudioCommand::LoadTrack(track(100)));
        engine.handle_cmd(AudioCommand::Play);

        let mut out = vec![StereoFrame::zero(); 64];
        for _ in 0..4 {
            engine.render_block(&mut out);
        }
        assert_eq!(events.try_iter().count(), 1);
        assert!(!engine.playing);
        assert_eq!(position(&atomics), 100.0);
    }

    #[test]
    fn looping_wraps_without_an_end_event() {
        let (mut engine, atomics, events) = engine();
        engine.handle_cmd(AudioCommand::LoadTrack(track(100)));
        engine.handle_cmd(AudioCommand::SetLoop(true));
        engine.handle_cmd(AudioCommand::Play);

        let mut out = vec![StereoFrame::zero(); 64];
        for _ in 0..3 {
            engine.render_block(&mut out);
        }
        assert_eq!(events.try_iter().count(), 0);
        assert!(engine.playing);
        assert_eq!(position(&atomics), 92.0);
    }

    #[test]
    fn seek_is_clamped_to_the_track() {
        let (mut engine, atomics, _events) = engine();
        engine.handle_cmd(AudioCommand::LoadTrack(track(100)));
        engine.handle_cmd(AudioCommand::Seek { frame: 5000.0 });
        assert_eq!(position(&atomics), 100.0);
        engine.handle_cmd(AudioCommand::Seek { frame: -3.0 });
        assert_eq!(position(&atomics), 0.0);
    }

    #[test]
    fn rate_scales_progress() {
        let (mut engine, atomics, _events) = engine();
        engine.handle_cmd(AudioCommand::LoadTrack(track(1000)));
        engine.handle_cmd(AudioCommand::SetRate(0.5));
        engine.handle_cmd(AudioCommand::Play);
        let mut out = vec![StereoFrame::zero(); 100];
        engine.render_block(&mut out);
        assert_eq!(position(&atomics), 50.0);
    }

    #[test]
    fn play_without_a_track_stays_stopped() {
        let (mut engine, _atomics, _events) = engine();
        engine.handle_cmd(AudioCommand::Play);
        assert!(!engine.playing);
    }

    #[test]
    fn tap_reuses_blocks_handed_back() {
        let atomics = Arc::new(PlaybackAtomics::default());
        let (events_tx, _events_rx) = crossbeam_channel::unbounded();
        let (tap_tx, tap_rx) = crossbeam_channel::bounded(4);
        let (spare_tx, spare_rx) = crossbeam_channel::bounded(4);
        let mut engine = Engine::new(1000, atomics, events_tx, tap_tx, spare_rx);

        let spare: Vec<f32> = Vec::with_capacity(256);
        let spare_ptr = spare.as_ptr();
        spare_tx.send(spare).unwrap();

        let mut out = vec![StereoFrame::zero(); 32];
        engine.render_block(&mut out);
        let block = tap_rx.try_recv().unwrap();
        assert_eq!(block.len(), 32);
        assert_eq!(block.as_ptr(), spare_ptr);
    }
}
