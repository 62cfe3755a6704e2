use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use super::layout::cell_point;
use crate::player::KnobId;
use crate::shared::InputEvent;

const KNOB_STEP: f32 = 0.05;
const SEEK_STEP_SECS: f64 = 5.0;

// Wait up to `timeout` for input, then drain whatever else is queued so a
// fast drag doesn't lag a frame per motion event.
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    if !event::poll(timeout)? {
        return Ok(events);
    }
    loop {
        if let Some(e) = map_event(event::read()?) {
            events.push(e);
        }
        if !event::poll(Duration::ZERO)? {
            return Ok(events);
        }
    }
}

fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let nudge = |knob, delta| Some(InputEvent::NudgeKnob(knob, delta));
    match key.code {
        KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char(' ') => Some(InputEvent::TogglePlay),
        KeyCode::Char('n') | KeyCode::Right => Some(InputEvent::Next),
        KeyCode::Char('p') | KeyCode::Left => Some(InputEvent::Prev),
        KeyCode::Char('l') => Some(InputEvent::ToggleLoop),
        KeyCode::Char(',') => Some(InputEvent::SeekBy(-SEEK_STEP_SECS)),
        KeyCode::Char('.') => Some(InputEvent::SeekBy(SEEK_STEP_SECS)),

        // knobs: top row turns up, home row turns down
        KeyCode::Char('q') => nudge(KnobId::Low, KNOB_STEP),
        KeyCode::Char('a') => nudge(KnobId::Low, -KNOB_STEP),
        KeyCode::Char('w') => nudge(KnobId::Mid, KNOB_STEP),
        KeyCode::Char('s') => nudge(KnobId::Mid, -KNOB_STEP),
        KeyCode::Char('e') => nudge(KnobId::High, KNOB_STEP),
        KeyCode::Char('d') => nudge(KnobId::High, -KNOB_STEP),
        KeyCode::Char('+' | '=') => nudge(KnobId::Volume, KNOB_STEP),
        KeyCode::Char('-') => nudge(KnobId::Volume, -KNOB_STEP),
        _ => None,
    }
}

fn map_mouse(mouse: MouseEvent) -> Option<InputEvent> {
    let at = cell_point(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerDown(at)),
        MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::PointerDrag(at)),
        MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::PointerUp),
        MouseEventKind::ScrollDown => Some(InputEvent::Wheel { at, delta: 1 }),
        MouseEventKind::ScrollUp => Some(InputEvent::Wheel { at, delta: -1 }),
        _ => None,
    }
}
