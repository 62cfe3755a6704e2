use std::f32::consts::PI;

use crate::audio_api::EqBand;

// sweep of the knob indicator either side of twelve o'clock
const SWEEP: f32 = PI * 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnobId {
    Low,
    Mid,
    High,
    Volume,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnobRange {
    /// [0, 1], used for volume.
    Unit,
    /// [-1, 1] with 0 meaning "leave the band alone".
    Bipolar,
}

impl KnobRange {
    pub fn bounds(self) -> (f32, f32) {
        match self {
            KnobRange::Unit => (0.0, 1.0),
            KnobRange::Bipolar => (-1.0, 1.0),
        }
    }

    pub fn clamp(self, value: f32) -> f32 {
        let (lo, hi) = self.bounds();
        value.clamp(lo, hi)
    }

    /// Position of `value` across the range, in [0, 1].
    pub fn normalize(self, value: f32) -> f32 {
        let (lo, hi) = self.bounds();
        (self.clamp(value) - lo) / (hi - lo)
    }
}

impl KnobId {
    pub const ALL: [KnobId; 4] = [KnobId::Low, KnobId::Mid, KnobId::High, KnobId::Volume];

    pub fn range(self) -> KnobRange {
        match self {
            KnobId::Volume => KnobRange::Unit,
            _ => KnobRange::Bipolar,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KnobId::Low => "LOW",
            KnobId::Mid => "MID",
            KnobId::High => "HIGH",
            KnobId::Volume => "VOL",
        }
    }

    /// Indicator angle in radians, 0 pointing straight up.
    pub fn angle(self, value: f32) -> f32 {
        -SWEEP + self.range().normalize(value) * 2.0 * SWEEP
    }
}

/// Linear map from a bipolar knob value to the band's cutoff.
pub fn cutoff_hz(band: EqBand, value: f32) -> f32 {
    let (lo, hi) = band.cutoff_range();
    lo + KnobRange::Bipolar.normalize(value) * (hi - lo)
}
