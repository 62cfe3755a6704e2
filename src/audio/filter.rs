// RBJ cookbook biquads and the three-band tone stage built from them.
use std::f32::consts::PI;

use super::frame::StereoFrame;
use crate::audio_api::EqBand;

const BUTTERWORTH_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;
const BAND_Q: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    BandPass,
    HighPass,
}

#[derive(Clone, Copy, Debug, Default)]
struct ChannelState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

#[derive(Clone, Debug)]
pub struct Biquad {
    kind: FilterKind,
    sample_rate: f32,
    cutoff: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    left: ChannelState,
    right: ChannelState,
}

impl Biquad {
    pub fn new(kind: FilterKind, sample_rate: f32, cutoff: f32) -> Self {
        let mut f = Self {
            kind,
            sample_rate,
            cutoff: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            left: ChannelState::default(),
            right: ChannelState::default(),
        };
        f.set_cutoff(cutoff);
        f
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    // Cheap to call every frame: coefficients only move when the cutoff does.
    pub fn set_cutoff(&mut self, hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        let hz = hz.clamp(10.0, nyquist * 0.99);
        if hz == self.cutoff {
            return;
        }
        self.cutoff = hz;

        let q = match self.kind {
            FilterKind::BandPass => BAND_Q,
            _ => BUTTERWORTH_Q,
        };
        let omega = 2.0 * PI * hz / self.sample_rate;
        let (sn, cs) = omega.sin_cos();
        let alpha = sn / (2.0 * q);

        let (b0, b1, b2) = match self.kind {
            FilterKind::LowPass => ((1.0 - cs) / 2.0, 1.0 - cs, (1.0 - cs) / 2.0),
            FilterKind::HighPass => ((1.0 + cs) / 2.0, -(1.0 + cs), (1.0 + cs) / 2.0),
            FilterKind::BandPass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = -2.0 * cs / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    #[inline]
    fn step(&self, s: &mut ChannelState, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * s.x1 + self.b2 * s.x2 - self.a1 * s.y1 - self.a2 * s.y2;
        s.x2 = s.x1;
        s.x1 = x;
        s.y2 = s.y1;
        s.y1 = y;
        y
    }

    pub fn process(&mut self, input: StereoFrame) -> StereoFrame {
        let mut left = self.left;
        let mut right = self.right;
        let out = StereoFrame {
            left: self.step(&mut left, input.left),
            right: self.step(&mut right, input.right),
        };
        self.left = left;
        self.right = right;
        out
    }
}

// Low-pass, band-pass and high-pass stages fed the same input and summed.
// Each knob slides its stage's cutoff, so the three act like a movable
// crossover rather than a series chain that would cancel itself out.
#[derive(Clone, Debug)]
pub struct ThreeBandEq {
    low: Biquad,
    mid: Biquad,
    high: Biquad,
}

impl ThreeBandEq {
    pub fn new(sample_rate: f32) -> Self {
        let centre = |band: EqBand| {
            let (lo, hi) = band.cutoff_range();
            (lo + hi) * 0.5
        };
        Self {
            low: Biquad::new(FilterKind::LowPass, sample_rate, centre(EqBand::Low)),
            mid: Biquad::new(FilterKind::BandPass, sample_rate, centre(EqBand::Mid)),
            high: Biquad::new(FilterKind::HighPass, sample_rate, centre(EqBand::High)),
        }
    }

    pub fn set_cutoff(&mut self, band: EqBand, hz: f32) {
        self.stage_mut(band).set_cutoff(hz);
    }

    pub fn cutoff(&self, band: EqBand) -> f32 {
        match band {
            EqBand::Low => self.low.cutoff(),
            EqBand::Mid => self.mid.cutoff(),
            EqBand::High => self.high.cutoff(),
        }
    }

    fn stage_mut(&mut self, band: EqBand) -> &mut Biquad {
        match band {
            EqBand::Low => &mut self.low,
            EqBand::Mid => &mut self.mid,
            EqBand::High => &mut self.high,
        }
    }

    pub fn process(&mut self, buf: &mut [StereoFrame]) {
        for f in buf.iter_mut() {
            let l = self.low.process(*f);
            let m = self.mid.process(*f);
            let h = self.high.process(*f);
            *f = StereoFrame {
                left: l.left + m.left + h.left,
                right: l.right + m.right + h.right,
            };
        }
    }
}
