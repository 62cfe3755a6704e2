// Read on startup: <dir>/.turntty/config.json, every field optional.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::loader::sample_loader;
use crate::player::Track;

const TURNTTY_DIR: &str = ".turntty";
const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "turntty.log";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub title: String,
    pub path: PathBuf,
}

/// What happens to playback while the disc is held.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ScratchPolicy {
    /// Pause while held, resume on release if it was playing.
    Pause,
    /// Keep playing at a reduced rate, back to 1.0 on release.
    Slow { rate: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracks: Vec<TrackEntry>,
    pub volume: f32,
    pub autoplay_on_track_change: bool,
    pub scratch: ScratchPolicy,
    pub scratch_seconds_per_unit: f64,
    pub scratch_radians_per_unit: f32,
    pub knob_sensitivity: f32,
    pub disc_speed: f32, // radians per frame
    pub frame_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            volume: 0.8,
            autoplay_on_track_change: true,
            scratch: ScratchPolicy::Pause,
            scratch_seconds_per_unit: 0.25,
            scratch_radians_per_unit: 0.1,
            knob_sensitivity: 0.1,
            disc_speed: 0.02,
            frame_ms: 16, // ~60fps
        }
    }
}

// <dir>/.turntty
pub fn state_dir(dir: &Path) -> PathBuf {
    dir.join(TURNTTY_DIR)
}

fn config_file_path(dir: &Path) -> PathBuf {
    state_dir(dir).join(CONFIG_FILE)
}

pub fn load_config(dir: &Path) -> anyhow::Result<Config> {
    let path = config_file_path(dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

// Configured tracks if there are any, otherwise every WAV in `dir`.
pub fn resolve_tracks(config: &Config, dir: &Path) -> anyhow::Result<Vec<Track>> {
    let tracks: Vec<Track> = if config.tracks.is_empty() {
        sample_loader::index_wav_in_dir(dir)?
            .into_iter()
            .map(|path| Track {
                title: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                source: path,
            })
            .collect()
    } else {
        config
            .tracks
            .iter()
            .map(|t| Track {
                title: t.title.clone(),
                source: if t.path.is_absolute() { t.path.clone() } else { dir.join(&t.path) },
            })
            .collect()
    };

    if tracks.is_empty() {
        anyhow::bail!(
            "no tracks: add WAV files to {} or list them in {}",
            dir.display(),
            config_file_path(dir).display()
        );
    }
    Ok(tracks)
}
