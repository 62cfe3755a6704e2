use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

pub const FFT_SIZE: usize = 1024;
pub const NUM_BINS: usize = FFT_SIZE / 2;

const SMOOTHING: f32 = 0.7;
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Turns the engine's output tap into a byte-scaled magnitude spectrum
/// (0..=255 per bin, low to high frequency), smoothed over time.
pub struct Analyzer {
    tap_rx: Receiver<Vec<f32>>,
    spare_tx: Sender<Vec<f32>>,
    recent: VecDeque<f32>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<f32>,
}

impl Analyzer {
    pub fn new(tap_rx: Receiver<Vec<f32>>, spare_tx: Sender<Vec<f32>>) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let window = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (FFT_SIZE as f32 - 1.0)).cos())
            })
            .collect();
        Self {
            tap_rx,
            spare_tx,
            recent: VecDeque::from(vec![0.0; FFT_SIZE]),
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; NUM_BINS],
            bytes: vec![0.0; NUM_BINS],
        }
    }

    fn drain_tap(&mut self) {
        while let Ok(block) = self.tap_rx.try_recv() {
            self.recent.extend(block.iter().copied());
            let _ = self.spare_tx.try_send(block);
        }
        let excess = self.recent.len().saturating_sub(FFT_SIZE);
        self.recent.drain(..excess);
    }

    pub fn analyze(&mut self) -> &[f32] {
        self.drain_tap();

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(&self.recent).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (i, c) in self.scratch[..NUM_BINS].iter().enumerate() {
            let magnitude = c.norm() / FFT_SIZE as f32;
            self.smoothed[i] = SMOOTHING * self.smoothed[i] + (1.0 - SMOOTHING) * magnitude;
            let db = 20.0 * self.smoothed[i].max(1e-12).log10();
            self.bytes[i] = ((db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0).clamp(0.0, 255.0);
        }
        &self.bytes
    }
}
