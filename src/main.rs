mod audio;
mod audio_api;
mod config;
mod hit;
mod loader;
mod player;
mod shared;
mod tui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use player::Player;
use shared::InputEvent;
use tui::ScreenLayout;

fn main() {
    if let Err(e) = run() {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    init_logging(&dir)?;
    log::info!("turntty starting in {}", dir.display());

    let config = config::load_config(&dir)?;
    let tracks = config::resolve_tracks(&config, &dir)?;
    log::info!("{} tracks", tracks.len());

    let audio = audio::start_audio()?;
    let mut analyzer = audio.analyzer();
    let mut player = Player::new(audio, tracks, &config);
    player.start();

    terminal::enable_raw_mode()?;
    let _guard = TerminalGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_time = Duration::from_millis(config.frame_ms.max(1));
    let mut layout = ScreenLayout::compute(Rect::default());

    loop {
        player.tick();
        let ds = player.display_state();
        let bins = analyzer.analyze();

        term.draw(|frame| {
            layout = ScreenLayout::compute(frame.area());
            tui::view::render(frame, &layout, &ds, bins);
        })?;

        // regions match what was just drawn
        let registry = layout.hit_registry(ds.playlist_scroll, ds.titles.len());
        for event in tui::input::poll_input(frame_time)? {
            if event == InputEvent::Quit {
                log::info!("quit");
                return Ok(());
            }
            player.handle_input(event, &registry);
        }
    }
}

// The TUI owns the terminal, so logs go to <dir>/.turntty/turntty.log.
fn init_logging(dir: &Path) -> anyhow::Result<()> {
    let state_dir = config::state_dir(dir);
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("creating {}", state_dir.display()))?;
    let path = state_dir.join(config::LOG_FILE);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

struct TerminalGuard;
impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
