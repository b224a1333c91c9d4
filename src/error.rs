use std::path::PathBuf;

use thiserror::Error;

/// Problems detected before the render loop starts. None of these are
/// retried; the process exits with [`SetupError::EXIT_CODE`].
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to load font {}: {reason}", .path.display())]
    Font { path: PathBuf, reason: String },

    #[error("Failed to load background image {}: {reason}", .path.display())]
    Image { path: PathBuf, reason: String },

    #[error("Failed to load audio {}: {reason}", .path.display())]
    Audio { path: PathBuf, reason: String },

    #[error("Audio buffer is empty")]
    EmptyAudio,

    #[error("Audio buffer is malformed: {0}")]
    MalformedAudio(String),

    #[error("Analysis frame size must be at least 2, got {0}")]
    FrameSize(usize),

    #[error("Cannot draw {bars} bars from {bins} magnitude bins")]
    TooManyBars { bars: usize, bins: usize },

    #[error("Invalid control '{0}', expected SECONDS:KEY with KEY one of z, x, c")]
    Control(String),

    #[error("Invalid setting: {0}")]
    Setting(String),
}

impl SetupError {
    pub const EXIT_CODE: u8 = 2;
}
