use crate::error::{PlayLogError, Result};
use crate::track::TrackRecord;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// asctime() layout, minus the trailing newline
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// One line of the play log:
/// `Tue Jan  2 15:04:05 2024;"Artist";"Title";"Album";3:07`
pub struct LogLine<'a> {
    pub timestamp: NaiveDateTime,
    pub record: &'a TrackRecord,
}

impl fmt::Display for LogLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};\"{}\";\"{}\";\"{}\";{}:{:02}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.record.artist,
            self.record.title,
            self.record.album,
            self.record.minutes,
            self.record.seconds
        )
    }
}

/// The append-only play log. Opened once, never truncated.
pub struct PlayLog {
    path: PathBuf,
    file: Option<File>,
}

impl PlayLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| PlayLogError::OpenLog {
                path: path.clone(),
                source,
            })?;

        info!("Logging to {}", path.display());
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append a record stamped with the current local time.
    /// Returns `Ok(false)` when there was nothing to write.
    pub fn append(&mut self, record: &TrackRecord) -> Result<bool> {
        self.append_at(record, Local::now().naive_local())
    }

    pub fn append_at(&mut self, record: &TrackRecord, timestamp: NaiveDateTime) -> Result<bool> {
        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };
        if !record.is_loggable() {
            debug!("Skipping track without audio channels: {}", record.title);
            return Ok(false);
        }

        // Build the whole line first so it hits the file in a single write
        let line = format!("{}\n", LogLine { timestamp, record });
        file.write_all(line.as_bytes())?;
        file.flush()?;

        debug!("Logged: {} - {}", record.artist, record.title);
        Ok(true)
    }

    /// Flush to disk and let go of the file. Further appends are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            debug!("Closing {}", self.path.display());
            file.sync_all()?;
        }
        Ok(())
    }
}
