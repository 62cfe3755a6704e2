use std::path::{Path, PathBuf};

use anyhow::Context;
use crossbeam_channel::Sender;

use crate::audio::SampleBuffer;

#[derive(Debug)]
pub struct LoadResult {
    pub request: u64,
    pub path: PathBuf,
    pub outcome: anyhow::Result<SampleBuffer>,
}

// Decode off the UI thread; the result comes back tagged with `request` so
// the receiver can drop anything that has been superseded.
pub fn spawn_load(path: &Path, target_rate: u32, request: u64, tx: Sender<LoadResult>) -> anyhow::Result<()> {
    let path = path.to_path_buf();
    std::thread::Builder::new()
        .name(format!("track-loader-{request}"))
        .spawn(move || {
            let outcome = SampleBuffer::load_wav(&path, target_rate);
            let _ = tx.send(LoadResult { request, path, outcome });
        })
        .context("spawning loader thread")?;
    Ok(())
}

// All *.wav files directly inside `dir`, sorted by file name
pub fn index_wav_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_only_wav_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.wav", "a.WAV", "notes.txt", "c.mp3"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.wav")).unwrap();

        let found = index_wav_in_dir(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.WAV", "b.wav"]);
    }

    #[test]
    fn failed_decode_still_reports_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not a wav").unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_load(&path, 44100, 7, tx).unwrap();
        let result = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(result.request, 7);
        assert_eq!(result.path, path);
        assert!(result.outcome.is_err());
    }
}
