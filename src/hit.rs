// Screen geometry for pointer interaction. Everything here is in canvas units:
// x counts terminal columns, y counts rows scaled by the cell aspect, so a
// circle in canvas units looks round on screen.

use crate::player::KnobId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    Circle { center: Point, radius: f32 },
    Rect { x: f32, y: f32, w: f32, h: f32 },
}

impl Region {
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            Region::Circle { center, radius } => p.distance(center) < radius,
            Region::Rect { x, y, w, h } => p.x >= x && p.x < x + w && p.y >= y && p.y < y + h,
        }
    }

    /// Horizontal position of `p` across the region, clamped to [0, 1].
    pub fn fraction_x(&self, p: Point) -> f32 {
        let (left, width) = match *self {
            Region::Circle { center, radius } => (center.x - radius, radius * 2.0),
            Region::Rect { x, w, .. } => (x, w),
        };
        if width <= 0.0 {
            return 0.0;
        }
        ((p.x - left) / width).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Prev,
    TogglePlay,
    Next,
    ToggleLoop,
}

impl ButtonAction {
    pub const ALL: [ButtonAction; 4] = [
        ButtonAction::Prev,
        ButtonAction::TogglePlay,
        ButtonAction::Next,
        ButtonAction::ToggleLoop,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    Button(ButtonAction),
    Disc,
    SeekBar,
    Knob(KnobId),
    PlaylistRow(usize),
    Playlist { visible: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub region: Region,
    pub control: Control,
}

// rebuilt from the layout every frame; earlier registrations win on overlap
#[derive(Clone, Debug, Default)]
pub struct HitRegistry {
    entries: Vec<Hit>,
}

impl HitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, region: Region, control: Control) {
        self.entries.push(Hit { region, control });
    }

    pub fn hit(&self, p: Point) -> Option<Hit> {
        self.entries.iter().copied().find(|h| h.region.contains(p))
    }

    // every region under `p`, in registration order
    pub fn hits(&self, p: Point) -> impl Iterator<Item = Hit> + '_ {
        self.entries.iter().copied().filter(move |h| h.region.contains(p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
