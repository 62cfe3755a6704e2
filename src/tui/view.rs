use std::f32::consts::TAU;

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as Segment};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};
use ratatui::Frame;

use super::layout::{ScreenLayout, CELL_ASPECT};
use crate::hit::Point;
use crate::player::KnobId;
use crate::shared::{format_time, DisplayState};

const GROOVES: [f32; 6] = [1.0, 0.92, 0.84, 0.76, 0.68, 0.6];
const LABEL: f32 = 0.35;
const HELP: &str = "space play  n/p track  l loop  ,/. seek  q/a w/s e/d eq  +/- vol  esc quit";

pub fn render(frame: &mut Frame, layout: &ScreenLayout, ds: &DisplayState, spectrum: &[f32]) {
    draw_disc(frame, layout, ds);
    draw_title(frame, layout.title, ds);
    draw_playlist(frame, layout, ds);
    draw_spectrum(frame, layout.spectrum, spectrum);
    draw_progress(frame, layout, ds);
    draw_buttons(frame, layout, ds);
    draw_knobs(frame, layout, ds);
    draw_status(frame, layout.status, ds);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
}

// Canvases are given bounds in the same units as the hit regions. ratatui's
// y axis points up, ours points down, so y is negated on the way in.
fn canvas_bounds(r: Rect) -> ([f64; 2], [f64; 2]) {
    let x = [r.x as f64, (r.x + r.width) as f64];
    let top = r.y as f64 * CELL_ASPECT as f64;
    let bottom = (r.y + r.height) as f64 * CELL_ASPECT as f64;
    (x, [-bottom, -top])
}

fn plot(p: Point) -> (f64, f64) {
    (p.x as f64, -(p.y as f64))
}

// A spoke at `angle` radians, clockwise from twelve o'clock.
fn spoke(ctx: &mut Context, center: Point, angle: f32, from: f32, to: f32, color: Color) {
    let (s, c) = angle.sin_cos();
    let (x1, y1) = plot(Point::new(center.x + s * from, center.y - c * from));
    let (x2, y2) = plot(Point::new(center.x + s * to, center.y - c * to));
    ctx.draw(&Segment::new(x1, y1, x2, y2, color));
}

fn draw_disc(frame: &mut Frame, layout: &ScreenLayout, ds: &DisplayState) {
    let block = panel("Disc");
    let (x_bounds, y_bounds) = canvas_bounds(block.inner(layout.disc_panel));
    let center = layout.disc_center;
    let radius = layout.disc_radius;
    let (cx, cy) = plot(center);
    let angle = ds.disc_angle;
    let label_color = if ds.scratching { Color::Yellow } else { Color::LightRed };

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for (i, k) in GROOVES.iter().enumerate() {
                let color = if i == 0 { Color::Gray } else { Color::DarkGray };
                ctx.draw(&Circle { x: cx, y: cy, radius: (radius * k) as f64, color });
            }
            for k in [LABEL, LABEL * 0.7, LABEL * 0.4] {
                ctx.draw(&Circle { x: cx, y: cy, radius: (radius * k) as f64, color: label_color });
            }
            ctx.draw(&Circle { x: cx, y: cy, radius: 0.5, color: Color::White });
            ctx.layer();
            spoke(ctx, center, angle, radius * LABEL, radius * 0.97, Color::White);
            spoke(ctx, center, angle + TAU / 2.0, radius * 0.1, radius * LABEL, label_color);
        });
    frame.render_widget(canvas, layout.disc_panel);
}

fn draw_title(frame: &mut Frame, area: Rect, ds: &DisplayState) {
    let state = if ds.loading {
        Span::styled("loading", Style::default().fg(Color::Yellow))
    } else if ds.playing {
        Span::styled("playing", Style::default().fg(Color::Green))
    } else {
        Span::styled("paused", Style::default().fg(Color::DarkGray))
    };
    let mut spans = vec![
        Span::styled(ds.current_title().to_owned(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        state,
    ];
    if ds.loop_mode {
        spans.push(Span::styled("  loop", Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).block(panel("Now Playing")), area);
}

fn draw_playlist(frame: &mut Frame, layout: &ScreenLayout, ds: &DisplayState) {
    let lines: Vec<Line> = ds
        .titles
        .iter()
        .enumerate()
        .skip(ds.playlist_scroll)
        .take(layout.visible_rows())
        .map(|(i, title)| {
            if i == ds.current_track {
                Line::from(Span::styled(
                    format!("> {title}"),
                    Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {title}"))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel("Playlist")), layout.playlist);
}

fn draw_spectrum(frame: &mut Frame, area: Rect, bins: &[f32]) {
    let block = panel("Spectrum");
    let inner = block.inner(area);
    let width = inner.width.max(1) as f64;
    // low half of the spectrum on a log axis, that's where the music is
    let max_bin = (bins.len() / 2).max(2);
    let points = (inner.width as usize * 2).max(2);
    let trace: Vec<(f64, f64)> = if bins.is_empty() {
        Vec::new()
    } else {
        (0..points)
            .map(|i| {
                let frac = i as f64 / (points - 1) as f64;
                let bin = ((max_bin as f64).powf(frac) as usize).min(bins.len() - 1);
                (frac * width, bins[bin] as f64)
            })
            .collect()
    };

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, 255.0])
        .paint(move |ctx| {
            for pair in trace.windows(2) {
                let [(x1, y1), (x2, y2)] = [pair[0], pair[1]];
                ctx.draw(&Segment::new(x1, y1, x2, y2, Color::Cyan));
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_progress(frame: &mut Frame, layout: &ScreenLayout, ds: &DisplayState) {
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::LightRed).bg(Color::DarkGray))
        .ratio(ds.progress.clamp(0.0, 1.0))
        .label("");
    frame.render_widget(gauge, layout.progress);

    let time = format!("{} / {}", format_time(ds.elapsed), format_time(ds.duration));
    frame.render_widget(Paragraph::new(time).alignment(Alignment::Center), layout.time);
}

fn draw_buttons(frame: &mut Frame, layout: &ScreenLayout, ds: &DisplayState) {
    let play = if ds.playing { "||" } else { ">" };
    let labels = [("|<<", false), (play, ds.playing), (">>|", false), ("LOOP", ds.loop_mode)];
    for (rect, (label, lit)) in layout.buttons.iter().zip(labels) {
        let style = if lit {
            Style::default().fg(Color::Black).bg(Color::LightRed)
        } else {
            Style::default()
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
        frame.render_widget(button, *rect);
    }
}

fn draw_knobs(frame: &mut Frame, layout: &ScreenLayout, ds: &DisplayState) {
    for (i, (knob, value)) in ds.knobs.into_iter().enumerate() {
        let rect = layout.knobs[i];
        let (center, radius) = layout.knob_circle(i);
        let (x_bounds, y_bounds) = canvas_bounds(rect);
        let (cx, cy) = plot(center);
        let color = if knob == KnobId::Volume { Color::Green } else { Color::Cyan };
        let label = knob.label();

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(move |ctx| {
                ctx.draw(&Circle { x: cx, y: cy, radius: radius as f64, color: Color::Gray });
                spoke(ctx, center, knob.angle(value), 0.0, radius * 0.9, color);
                ctx.print(x_bounds[0], y_bounds[0], label);
            });
        frame.render_widget(canvas, rect);
    }
}

fn draw_status(frame: &mut Frame, area: Rect, ds: &DisplayState) {
    let line = match &ds.status {
        Some(msg) => Span::styled(msg.clone(), Style::default().fg(Color::Red)),
        None => Span::styled(HELP, Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(Line::from(line)), area);
}
