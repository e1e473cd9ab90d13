// PlayLog Library - the "log bot" plugin for the player
// Writes down every track you actually listened to, skips the ones you skipped

pub mod behavior; // playtime gate, session, log writer, event handling
pub mod config;   // host config store + our settings
pub mod error;    // error types
pub mod host;     // what the host gives us (and a simulated one)
pub mod plugin;   // the hooks the host calls
pub mod track;    // track metadata + snapshots

// Export the stuff other modules actually use
pub use behavior::{qualifies, PlayLog, PlayTracker, SessionState, Thresholds};
pub use config::{ConfigFile, LogSettings};
pub use error::PlayLogError;
pub use host::{Host, HostEvent, PlaybackStatus, SimHost};
pub use plugin::{register, LogBot, Plugin};
pub use track::{LiveTrack, TrackInfo, TrackRecord};
