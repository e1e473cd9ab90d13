// Error types for the log bot
// Nothing here ever reaches the host - callers turn these into "skip this" decisions

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayLogError {
    /// The log file could not be opened in append mode
    #[error("Could not open log file {path}: {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Appending or flushing a record failed
    #[error("Write error: {0}")]
    Write(#[from] io::Error),

    /// Someone else holds the live track right now
    #[error("Track info is busy")]
    TrackBusy,

    /// Host has no current track
    #[error("No current track")]
    NoTrack,

    #[error("Config error: {0}")]
    Config(String),

    /// A replay script line could not be understood
    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, PlayLogError>;
