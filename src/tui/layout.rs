// Screen geometry, recomputed from the terminal size every frame. The view
// draws into these rects and the hit registry is built from the same numbers,
// so what is clicked is always what is drawn.

use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

use crate::hit::{ButtonAction, Control, HitRegistry, Point, Region};
use crate::player::KnobId;

/// Rows are roughly twice as tall as columns are wide.
pub const CELL_ASPECT: f32 = 2.0;

/// Centre of a terminal cell in canvas units.
pub fn cell_point(col: u16, row: u16) -> Point {
    Point::new(col as f32 + 0.5, (row as f32 + 0.5) * CELL_ASPECT)
}

pub fn rect_region(r: Rect) -> Region {
    Region::Rect {
        x: r.x as f32,
        y: r.y as f32 * CELL_ASPECT,
        w: r.width as f32,
        h: r.height as f32 * CELL_ASPECT,
    }
}

// largest circle that fits inside `r`, in canvas units
fn inscribed_circle(r: Rect) -> (Point, f32) {
    let w = r.width as f32;
    let h = r.height as f32 * CELL_ASPECT;
    let center = Point::new(r.x as f32 + w / 2.0, r.y as f32 * CELL_ASPECT + h / 2.0);
    (center, (w.min(h) / 2.0 - 0.5).max(0.5))
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenLayout {
    pub disc_panel: Rect,
    pub disc_center: Point,
    pub disc_radius: f32,
    pub title: Rect,
    pub playlist: Rect,
    pub playlist_rows: Rect, // inside the border, one track per row
    pub spectrum: Rect,
    pub progress: Rect,
    pub time: Rect,
    pub buttons: [Rect; 4],
    pub knobs: [Rect; 4],
    pub status: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect) -> Self {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // panels
                Constraint::Length(1), // status line
            ])
            .split(area);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // title
                Constraint::Min(3),    // playlist
                Constraint::Length(7), // spectrum
                Constraint::Length(1), // progress bar
                Constraint::Length(1), // mm:ss / mm:ss
                Constraint::Length(3), // transport buttons
                Constraint::Length(6), // knobs
            ])
            .split(panels[1]);

        let quarters = |r: Rect| {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 4); 4])
                .split(r);
            [cols[0], cols[1], cols[2], cols[3]]
        };

        let disc_panel = panels[0];
        let (disc_center, disc_radius) = inscribed_circle(disc_panel.inner(Margin::new(1, 1)));

        Self {
            disc_panel,
            disc_center,
            disc_radius,
            title: right[0],
            playlist: right[1],
            playlist_rows: right[1].inner(Margin::new(1, 1)),
            spectrum: right[2],
            progress: right[3],
            time: right[4],
            buttons: quarters(right[5]),
            knobs: quarters(right[6]),
            status: outer[1],
        }
    }

    pub fn knob_circle(&self, index: usize) -> (Point, f32) {
        inscribed_circle(self.knobs[index])
    }

    pub fn visible_rows(&self) -> usize {
        self.playlist_rows.height as usize
    }

    /// Hit regions for the frame just drawn. Rows map to track indices
    /// through the current playlist scroll.
    pub fn hit_registry(&self, scroll: usize, n_tracks: usize) -> HitRegistry {
        let mut reg = HitRegistry::new();

        for (rect, action) in self.buttons.iter().zip(ButtonAction::ALL) {
            reg.register(rect_region(*rect), Control::Button(action));
        }
        for (i, knob) in KnobId::ALL.into_iter().enumerate() {
            let (center, radius) = self.knob_circle(i);
            reg.register(Region::Circle { center, radius }, Control::Knob(knob));
        }
        reg.register(rect_region(self.progress), Control::SeekBar);
        reg.register(
            Region::Circle { center: self.disc_center, radius: self.disc_radius },
            Control::Disc,
        );

        let rows = self.playlist_rows;
        for i in 0..self.visible_rows() {
            let track = scroll + i;
            if track >= n_tracks {
                break;
            }
            let row = Rect::new(rows.x, rows.y + i as u16, rows.width, 1);
            reg.register(rect_region(row), Control::PlaylistRow(track));
        }
        reg.register(
            rect_region(self.playlist),
            Control::Playlist { visible: self.visible_rows() },
        );
        reg
    }
}
