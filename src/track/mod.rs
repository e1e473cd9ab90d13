// Track metadata - the host's live track object and our frozen copy of it
// The host keeps mutating its track while decoding, so we only ever log a snapshot

use crate::error::{PlayLogError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// Metadata for the track the host is currently playing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackInfo {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub file_name: String,
    pub length_secs: u32,
    pub channels: u16,
    pub samplerate: u32,
    pub bitrate: u32,
}

impl TrackInfo {
    pub fn length_minutes(&self) -> u32 {
        self.length_secs / 60
    }

    /// Seconds part of the length, 0..=59
    pub fn length_seconds(&self) -> u32 {
        self.length_secs % 60
    }
}

/// The host-owned, shared track object.
///
/// Access goes through [`LiveTrack::try_acquire`], which never waits: if the
/// host is in the middle of an update we get `TrackBusy` and move on.
#[derive(Debug, Default)]
pub struct LiveTrack {
    inner: Mutex<TrackInfo>,
}

impl LiveTrack {
    pub fn new(info: TrackInfo) -> Self {
        Self {
            inner: Mutex::new(info),
        }
    }

    /// Scoped, non-blocking acquisition. The lock is released when the guard drops.
    pub fn try_acquire(&self) -> Result<MutexGuard<'_, TrackInfo>> {
        match self.inner.try_lock() {
            Ok(guard) => Ok(guard),
            // A poisoned lock means a writer died halfway through - don't trust it
            Err(TryLockError::Poisoned(_)) | Err(TryLockError::WouldBlock) => {
                Err(PlayLogError::TrackBusy)
            }
        }
    }

    /// Host-side write access. Blocks until the lock is free.
    pub fn lock_for_update(&self) -> MutexGuard<'_, TrackInfo> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn replace(&self, info: TrackInfo) {
        *self.lock_for_update() = info;
    }
}

/// Frozen copy of a track's metadata, taken at track change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub minutes: u32,
    pub seconds: u32,
    channels: u16,
}

impl TrackRecord {
    /// Copy everything we need out of a live track (caller holds the lock).
    pub fn snapshot(info: &TrackInfo) -> Self {
        Self {
            artist: info.artist.clone(),
            title: info.title.clone(),
            album: info.album.clone(),
            minutes: info.length_minutes(),
            seconds: info.length_seconds(),
            channels: info.channels,
        }
    }

    /// Entries without audio channels (errors, non-audio playlist items) never get logged
    pub fn is_loggable(&self) -> bool {
        self.channels > 0
    }
}
