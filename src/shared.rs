// Types shared between the player core and the terminal front end.
//
// Keyboard:
//   Space         //  TogglePlay
//   n / Right     //  Next
//   p / Left      //  Prev
//   l             //  ToggleLoop
//   , / .         //  SeekBy(-5.0 / 5.0)
//   q / a         //  NudgeKnob(Low, + / -)
//   w / s         //  NudgeKnob(Mid, + / -)
//   e / d         //  NudgeKnob(High, + / -)
//   + / -         //  NudgeKnob(Volume, + / -)
//   Esc           //  Quit
//
// Mouse: press/drag/release become PointerDown/PointerDrag/PointerUp in
// canvas units (see hit.rs), the wheel becomes Wheel.
//
// Each frame the TUI asks the player for a `DisplayState` and draws only
// that; it never reaches into player state directly.

use crate::hit::Point;
use crate::player::KnobId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    // pointer
    PointerDown(Point),
    PointerDrag(Point),
    PointerUp,
    Wheel { at: Point, delta: isize },

    // keyboard shortcuts
    TogglePlay,
    Next,
    Prev,
    ToggleLoop,
    SeekBy(f64),
    NudgeKnob(KnobId, f32),

    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub titles: Vec<String>,
    pub current_track: usize,
    pub playing: bool,
    pub loading: bool, // a load is in flight
    pub loop_mode: bool,
    pub scratching: bool,
    pub elapsed: f64,
    pub duration: f64, // 0.0 until something is loaded
    pub progress: f64, // elapsed / duration, in [0, 1]
    pub disc_angle: f32,
    pub knobs: [(KnobId, f32); 4],
    pub playlist_scroll: usize,
    pub status: Option<String>,
}

impl DisplayState {
    pub fn current_title(&self) -> &str {
        self.titles.get(self.current_track).map_or("", String::as_str)
    }
}

/// `mm:ss`, minutes are not wrapped into hours.
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs.floor() as u64 } else { 0 };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.99), "00:59");
        assert_eq!(format_time(61.0), "01:01");
        assert_eq!(format_time(3725.0), "62:05");
    }

    #[test]
    fn junk_times_read_as_zero() {
        assert_eq!(format_time(-3.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
    }
}
