use super::{PlayLog, SessionState, Thresholds};
use crate::host::{Host, HostEvent, PlaybackStatus};
use tracing::{debug, warn};

/// Turns host notifications into log entries.
///
/// A track can end two ways: the host swaps in the next track's metadata, or
/// playback stops. Both paths run the gate, and the stop path clears the
/// snapshot so the following track change can't log it a second time.
pub struct PlayTracker {
    thresholds: Thresholds,
    session: SessionState,
    log: PlayLog,
}

impl PlayTracker {
    pub fn new(log: PlayLog, thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            session: SessionState::new(),
            log,
        }
    }

    pub fn handle_event(&mut self, host: &dyn Host, event: HostEvent) {
        match event {
            HostEvent::TrackInfoChange => self.on_track_change(host),
            HostEvent::PlaybackStateChange => self.on_state_change(host),
            _ => {}
        }
    }

    fn on_track_change(&mut self, host: &dyn Host) {
        // Judge the outgoing track on the counters we recorded for it,
        // not on whatever the host reports for the new one
        if self.session.qualifies(&self.thresholds) {
            self.save_current();
        }
        self.session.capture(host.current_track());
    }

    fn on_state_change(&mut self, host: &dyn Host) {
        let elapsed = u32::try_from(host.playback_time_ms() / 1000).unwrap_or(u32::MAX);
        let length = host.current_track_length();
        self.session
            .record_elapsed(elapsed, length, self.thresholds.min_percent);

        let status = host.status();
        debug!(
            "Playback state {:?}: {}s of {}s (floor {}s)",
            status,
            elapsed,
            length,
            self.session.floor_secs()
        );

        if status == PlaybackStatus::Stopped && self.session.qualifies(&self.thresholds) {
            self.save_current();
            self.session.clear();
        }
    }

    fn save_current(&mut self) {
        let Some(record) = self.session.record() else {
            return;
        };
        // A failed write loses this one entry, playback carries on
        if let Err(e) = self.log.append(record) {
            warn!("Failed to write play log entry: {}", e);
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn close(&mut self) {
        if let Err(e) = self.log.close() {
            warn!("Failed to close {}: {}", self.log.path().display(), e);
        }
    }
}
