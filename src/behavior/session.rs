use super::{meets_thresholds, percent_floor, Thresholds};
use crate::error::{PlayLogError, Result};
use crate::track::{LiveTrack, TrackRecord};
use tracing::{debug, warn};

/// Everything we remember between host events.
///
/// - `record` is replaced on every track-info change and cleared once logged
/// - `elapsed_secs`, `floor_secs` and `length_secs` are refreshed on every
///   playback-state change and are what the gate looks at
#[derive(Debug, Default)]
pub struct SessionState {
    record: Option<TrackRecord>,
    elapsed_secs: u32,
    floor_secs: u64,
    length_secs: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the host's current track. Any failure leaves the record empty,
    /// never stale.
    pub fn capture(&mut self, live: Option<&LiveTrack>) {
        match Self::copy_from(live) {
            Ok(record) => {
                debug!("Captured track info: {} - {}", record.artist, record.title);
                self.record = Some(record);
            }
            Err(e) => {
                warn!("Could not capture track info: {}", e);
                self.record = None;
            }
        }
    }

    fn copy_from(live: Option<&LiveTrack>) -> Result<TrackRecord> {
        let live = live.ok_or(PlayLogError::NoTrack)?;
        let guard = live.try_acquire()?;
        Ok(TrackRecord::snapshot(&guard))
        // guard dropped here, lock released
    }

    pub fn record_elapsed(&mut self, seconds: u32, length: u32, percent: u32) {
        self.elapsed_secs = seconds;
        self.length_secs = length;
        self.floor_secs = percent_floor(length, percent);
    }

    /// Gate check against the last recorded counters.
    pub fn qualifies(&self, thresholds: &Thresholds) -> bool {
        meets_thresholds(
            self.elapsed_secs,
            self.floor_secs,
            self.length_secs,
            thresholds.min_seconds,
        )
    }

    pub fn clear(&mut self) {
        self.record = None;
    }

    pub fn record(&self) -> Option<&TrackRecord> {
        self.record.as_ref()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn floor_secs(&self) -> u64 {
        self.floor_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackInfo;

    fn live(title: &str) -> LiveTrack {
        LiveTrack::new(TrackInfo {
            artist: "Artist".to_string(),
            title: title.to_string(),
            album: "Album".to_string(),
            length_secs: 200,
            channels: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_capture_copies_metadata() {
        let mut session = SessionState::new();
        let track = live("First");
        session.capture(Some(&track));

        let record = session.record().unwrap();
        assert_eq!(record.title, "First");
        assert_eq!((record.minutes, record.seconds), (3, 20));
        // lock was released
        assert!(track.try_acquire().is_ok());
    }

    #[test]
    fn test_failed_acquisition_clears_record() {
        let mut session = SessionState::new();
        session.capture(Some(&live("First")));
        assert!(session.record().is_some());

        let busy = live("Second");
        let _held = busy.lock_for_update();
        session.capture(Some(&busy));

        assert!(session.record().is_none());
    }

    #[test]
    fn test_no_track_clears_record() {
        let mut session = SessionState::new();
        session.capture(Some(&live("First")));
        session.capture(None);
        assert!(session.record().is_none());
    }

    #[test]
    fn test_record_elapsed_computes_floor() {
        let mut session = SessionState::new();
        session.record_elapsed(12, 20, 50);
        assert_eq!(session.elapsed_secs(), 12);
        assert_eq!(session.floor_secs(), 10);
        assert!(session.qualifies(&Thresholds::new(10, 50)));

        session.record_elapsed(40, 100, 50);
        assert!(!session.qualifies(&Thresholds::new(10, 50)));
    }
}
