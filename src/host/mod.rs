// Host interface - what the playback host exposes to its plugins
// Read-only accessors plus the notification enum; the host owns all of it

pub mod sim; // in-process host for tests and script replays

pub use sim::SimHost;

use crate::config::ConfigFile;
use crate::track::LiveTrack;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
    Other,
}

/// Lifecycle notifications the host broadcasts to every plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    Quit,
    TrackInfoChange,
    PlaybackStateChange,
    PlaylistChange,
    PlaymodeChange,
    VolumeChange,
    Buffering,
    BufferingDone,
    BufferingFailed,
    Error,
}

pub trait Host {
    fn status(&self) -> PlaybackStatus;

    /// Position in the current track, milliseconds
    fn playback_time_ms(&self) -> u64;

    /// Total length of the current track, seconds
    fn current_track_length(&self) -> u32;

    fn current_track(&self) -> Option<&LiveTrack>;

    /// Shared config store. Plugins lock it around their init-time reads.
    fn config(&self) -> &Mutex<ConfigFile>;
}
