use super::{Host, HostEvent, PlaybackStatus};
use crate::config::ConfigFile;
use crate::error::{PlayLogError, Result};
use crate::plugin::Plugin;
use crate::track::{LiveTrack, TrackInfo};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// A tiny stand-in for the real player: holds a status, a position and a
/// current track, and hands events to a plugin when told to.
pub struct SimHost {
    status: PlaybackStatus,
    position_ms: u64,
    track: Option<LiveTrack>,
    config: Mutex<ConfigFile>,
    busy_next: bool,
}

impl SimHost {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            position_ms: 0,
            track: None,
            config: Mutex::new(config),
            busy_next: false,
        }
    }

    /// New track starts from the top
    pub fn load_track(&mut self, info: TrackInfo) {
        match &self.track {
            Some(live) => live.replace(info),
            None => self.track = Some(LiveTrack::new(info)),
        }
        self.position_ms = 0;
    }

    pub fn clear_track(&mut self) {
        self.track = None;
    }

    pub fn seek(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
    }

    pub fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
    }

    /// Hold the track lock during the next delivered event, like a host that
    /// is still writing tags when it sends the notification.
    pub fn hold_track_on_next_event(&mut self) {
        self.busy_next = true;
    }

    pub fn deliver(&mut self, plugin: &mut dyn Plugin, event: HostEvent) {
        let busy = std::mem::take(&mut self.busy_next);
        let _held = if busy {
            self.track.as_ref().map(LiveTrack::lock_for_update)
        } else {
            None
        };
        plugin.handle_event(&*self, event);
    }

    /// Apply one script step and deliver whatever event it implies.
    pub fn apply(&mut self, plugin: &mut dyn Plugin, step: Step) {
        debug!("Replaying {:?}", step);
        match step {
            Step::Load { track } => {
                self.load_track(track);
                self.deliver(plugin, HostEvent::TrackInfoChange);
            }
            Step::Seek { ms } => self.seek(ms),
            Step::Status { status } => {
                self.set_status(status);
                self.deliver(plugin, HostEvent::PlaybackStateChange);
            }
            Step::Event { event } => self.deliver(plugin, event),
            Step::Busy => self.hold_track_on_next_event(),
        }
    }
}

impl Host for SimHost {
    fn status(&self) -> PlaybackStatus {
        self.status
    }

    fn playback_time_ms(&self) -> u64 {
        self.position_ms
    }

    fn current_track_length(&self) -> u32 {
        // Lock is only held for the read; a busy track reads as unknown length
        self.track
            .as_ref()
            .and_then(|t| t.try_acquire().ok().map(|info| info.length_secs))
            .unwrap_or(0)
    }

    fn current_track(&self) -> Option<&LiveTrack> {
        self.track.as_ref()
    }

    fn config(&self) -> &Mutex<ConfigFile> {
        &self.config
    }
}

/// One line of a replay script (JSON lines).
///
/// ```text
/// {"step":"load","track":{"artist":"A","title":"T","album":"X","length_secs":20,"channels":2}}
/// {"step":"seek","ms":12000}
/// {"step":"status","status":"stopped"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Load { track: TrackInfo },
    Seek { ms: u64 },
    Status { status: PlaybackStatus },
    Event { event: HostEvent },
    Busy,
}

/// Blank lines and `#` comments are skipped.
pub fn parse_script(content: &str) -> Result<Vec<Step>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| PlayLogError::Script {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}
