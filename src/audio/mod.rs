use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::{AudioBackend, AudioCommand, AudioEvent, EqBand, LoadError, LoadedTrack};
use crate::loader::sample_loader::{self, LoadResult};

mod analyzer;
mod engine;
mod filter;
mod frame;
mod sample_buffer;

pub use analyzer::Analyzer;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;

use engine::Engine;

// written by the audio callback, read by the UI thread
#[derive(Debug, Default)]
pub struct PlaybackAtomics {
    pub position: AtomicU64, // f64 bits, in frames
}

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    events_rx: Receiver<AudioEvent>,
    tap_rx: Receiver<Vec<f32>>,
    spare_tx: Sender<Vec<f32>>,
    load_tx: Sender<LoadResult>,
    load_rx: Receiver<LoadResult>,
    atomics: Arc<PlaybackAtomics>,
    sample_rate: u32,
    latest_request: u64,
    duration: Option<f64>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    // Reads the engine's output tap and hands each block back for reuse.
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.tap_rx.clone(), self.spare_tx.clone())
    }
}

impl AudioBackend for AudioHandle {
    fn load(&mut self, path: &Path) {
        self.latest_request += 1;
        if let Err(e) = sample_loader::spawn_load(path, self.sample_rate, self.latest_request, self.load_tx.clone()) {
            log::error!("{e:#}");
            let _ = self.load_tx.try_send(LoadResult {
                request: self.latest_request,
                path: path.to_path_buf(),
                outcome: Err(e),
            });
        }
    }

    fn poll_load(&mut self) -> Option<Result<LoadedTrack, LoadError>> {
        while let Ok(result) = self.load_rx.try_recv() {
            if result.request != self.latest_request {
                log::debug!("dropping superseded load of {}", result.path.display());
                continue;
            }
            return Some(match result.outcome {
                Ok(buffer) => {
                    let duration = buffer.duration_secs();
                    self.duration = Some(duration);
                    self.atomics.position.store(0f64.to_bits(), Ordering::Relaxed);
                    self.send(AudioCommand::LoadTrack(buffer));
                    Ok(LoadedTrack { duration })
                }
                Err(e) => Err(LoadError::LoadFailed {
                    path: result.path,
                    reason: format!("{e:#}"),
                }),
            });
        }
        None
    }

    fn is_loaded(&self) -> bool {
        self.duration.is_some()
    }

    fn play(&mut self) {
        self.send(AudioCommand::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn stop(&mut self) {
        self.atomics.position.store(0f64.to_bits(), Ordering::Relaxed);
        self.send(AudioCommand::Stop);
    }

    fn seek(&mut self, secs: f64) {
        let secs = secs.clamp(0.0, self.duration());
        let frame = secs * self.sample_rate as f64;
        // reads straight after a seek should see it, not the last callback
        self.atomics.position.store(frame.to_bits(), Ordering::Relaxed);
        self.send(AudioCommand::Seek { frame });
    }

    fn current_time(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        f64::from_bits(self.atomics.position.load(Ordering::Relaxed)) / self.sample_rate as f64
    }

    fn duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCommand::SetVolume(volume));
    }

    fn set_rate(&mut self, rate: f32) {
        self.send(AudioCommand::SetRate(rate));
    }

    fn set_loop(&mut self, looping: bool) {
        self.send(AudioCommand::SetLoop(looping));
    }

    fn set_band_cutoff(&mut self, band: EqBand, hz: f32) {
        self.send(AudioCommand::SetCutoff { band, hz });
    }

    fn take_ended(&mut self) -> bool {
        self.events_rx.try_iter().filter(|e| *e == AudioEvent::Ended).count() > 0
    }
}

// tap blocks in circulation between the callback and the analyzer
const TAP_BLOCKS: usize = 64;
const TAP_BLOCK_CAPACITY: usize = 4096;

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
    let (events_tx, events_rx) = crossbeam_channel::bounded::<AudioEvent>(16);
    let (tap_tx, tap_rx) = crossbeam_channel::bounded::<Vec<f32>>(TAP_BLOCKS);
    let (spare_tx, spare_rx) = crossbeam_channel::bounded::<Vec<f32>>(TAP_BLOCKS);
    for _ in 0..TAP_BLOCKS {
        let _ = spare_tx.try_send(Vec::with_capacity(TAP_BLOCK_CAPACITY));
    }
    let (load_tx, load_rx) = crossbeam_channel::unbounded::<LoadResult>();

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    let atomics = Arc::new(PlaybackAtomics::default());

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::new(sample_rate, atomics.clone(), events_tx, tap_tx, spare_rx);
            let output_stream = build_output_stream_f32(&device, &config.into(), rx, engine, channels)?;
            output_stream.play().context("failed to play output stream")?;
            log::info!("audio output running at {sample_rate} Hz, {channels} channel(s)");

            Ok(AudioHandle {
                tx,
                events_rx,
                tap_rx,
                spare_tx,
                load_tx,
                load_rx,
                atomics,
                sample_rate,
                latest_request: 0,
                duration: None,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut block: Vec<StereoFrame> = Vec::with_capacity(4096);

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            block.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut block);

            for (out, frame) in data.chunks_exact_mut(channels.max(1)).zip(&block) {
                match out {
                    [mono] => *mono = frame.mono(),
                    [left, right, rest @ ..] => {
                        *left = frame.left;
                        *right = frame.right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
