use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};

const HEADER: &str = "#EXTM3U";
const MUSIC_DIR: &str = "Music/";

/// Drops everything up to and including each `Music/` that has at least one
/// character in front of it.
fn strip_music_prefix(mut rest: &str) -> &str {
    loop {
        let Some(first) = rest.chars().next() else {
            return rest;
        };
        let skip = first.len_utf8();
        match rest[skip..].find(MUSIC_DIR) {
            Some(idx) => rest = &rest[skip + idx + MUSIC_DIR.len()..],
            None => return rest,
        }
    }
}

/// Rewritten form of a single playlist line, `None` for lines that are dropped.
pub(crate) fn rewrite_line(line: &str) -> Option<String> {
    if line.contains(HEADER) {
        return None;
    }
    Some(strip_music_prefix(line).replace("%20", " "))
}

fn sibling(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Rewrites `path` in place so that entries are relative to the `Music/`
/// directory. The untouched playlist is kept next to it as
/// `<name> Original.m3u`, whose path is returned. An existing original is
/// never replaced.
pub(crate) fn rewrite_playlist(path: &Path) -> Result<PathBuf> {
    if path.extension() != Some(OsStr::new("m3u")) {
        return Err(Error::UnsupportedPlaylist(path.display().to_string()));
    }
    let original = sibling(&path.with_extension(""), " Original.m3u");
    if original.exists() {
        return Err(Error::OriginalExists(original));
    }
    info!("Opening {}", path.display());

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let reader = BufReader::new(File::open(path)?);
    // Removed on drop unless persisted, so a failed rewrite leaves nothing behind.
    let mut rewritten = tempfile::Builder::new()
        .prefix(".playlist")
        .suffix(".m3u")
        .tempfile_in(dir)?;

    let mut kept = 0;
    for line in reader.lines() {
        if let Some(line) = rewrite_line(&line?) {
            writeln!(rewritten, "{}", line)?;
            kept += 1;
        }
    }
    rewritten.flush()?;
    debug!("wrote {} entries to {}", kept, rewritten.path().display());

    fs::rename(path, &original)?;
    rewritten.persist(path).map_err(|e| e.error)?;
    info!("Original kept as {}", original.display());

    Ok(original)
}
