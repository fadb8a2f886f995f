use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("register width must be between 1 and {max}, got {width}")]
    InvalidWidth { width: usize, max: usize },

    #[error("tap {tap} is out of range for a {width} bit register")]
    TapOutOfRange { tap: usize, width: usize },

    #[error("invalid bit {0:?}, expected 0 or 1")]
    InvalidBit(char),

    #[error("invalid tap list: {0}")]
    InvalidTaps(String),

    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("this playlist format is not supported, use m3u: {0}")]
    UnsupportedPlaylist(String),

    #[error("{} already exists, refusing to overwrite it", .0.display())]
    OriginalExists(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
