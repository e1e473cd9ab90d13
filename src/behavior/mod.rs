// Behavior tracking - deciding what counts as "actually listened to"
// A track only makes it into the log if it played long enough by both measures

pub mod log_writer; // append-only play log on disk
pub mod session;    // snapshot of the track being judged + its counters
pub mod tracker;    // reacts to host events, ties it all together

pub use log_writer::{LogLine, PlayLog};
pub use session::SessionState;
pub use tracker::PlayTracker;

/// The two minimum-playtime knobs, already normalized (both > 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_seconds: u32,
    pub min_percent: u32,
}

impl Thresholds {
    pub fn new(min_seconds: u32, min_percent: u32) -> Self {
        Self {
            min_seconds,
            min_percent,
        }
    }

    pub fn qualifies(&self, elapsed_seconds: u32, track_length_seconds: u32) -> bool {
        qualifies(
            elapsed_seconds,
            track_length_seconds,
            self.min_seconds,
            self.min_percent,
        )
    }
}

/// Minimum elapsed seconds to cover `percent` of the track, rounded down.
pub fn percent_floor(track_length_seconds: u32, percent: u32) -> u64 {
    u64::from(track_length_seconds) * u64::from(percent) / 100
}

/// The playtime gate.
///
/// A track qualifies when it reached the percent floor AND either played for
/// `min_seconds` or is shorter than `min_seconds` altogether. Without that last
/// part a 20 second jingle could never be logged with a 30 second minimum.
pub fn qualifies(
    elapsed_seconds: u32,
    track_length_seconds: u32,
    min_seconds: u32,
    min_percent: u32,
) -> bool {
    meets_thresholds(
        elapsed_seconds,
        percent_floor(track_length_seconds, min_percent),
        track_length_seconds,
        min_seconds,
    )
}

/// Same check with the floor already computed (the session keeps it around).
pub(crate) fn meets_thresholds(
    elapsed_seconds: u32,
    floor: u64,
    track_length_seconds: u32,
    min_seconds: u32,
) -> bool {
    u64::from(elapsed_seconds) >= floor
        && (elapsed_seconds >= min_seconds || min_seconds > track_length_seconds)
}
