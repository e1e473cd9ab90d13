// Plugin contract - the four hooks the host calls
// The log bot is a thin shell: config in, PlayTracker does the real work

use crate::behavior::{PlayLog, PlayTracker};
use crate::config::LogSettings;
use crate::host::{Host, HostEvent};
use std::sync::PoisonError;
use tracing::{debug, info, warn};

pub trait Plugin {
    /// Short identifier the host files the plugin under
    fn id(&self) -> &'static str;

    /// Human readable name
    fn name(&self) -> &'static str;

    /// Returns whether the plugin is active. Must never take the host down.
    fn init(&mut self, host: &dyn Host) -> bool;

    fn shut_down(&mut self);

    fn handle_event(&mut self, host: &dyn Host, event: HostEvent);
}

/// Entry point for the host's plugin loader
pub fn register() -> Box<dyn Plugin> {
    Box::new(LogBot::new())
}

/// Logs every track that was genuinely played.
#[derive(Default)]
pub struct LogBot {
    // None whenever logging is off: disabled in config, log didn't open, or shut down
    tracker: Option<PlayTracker>,
    settings: Option<LogSettings>,
}

impl LogBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn settings(&self) -> Option<&LogSettings> {
        self.settings.as_ref()
    }

    pub fn tracker(&self) -> Option<&PlayTracker> {
        self.tracker.as_ref()
    }

    fn read_settings(host: &dyn Host) -> LogSettings {
        // One lock around the whole batch; a poisoned store is still readable
        let mut config = host
            .config()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        LogSettings::register(&mut config);
        LogSettings::from_config(&config)
    }
}

impl Plugin for LogBot {
    fn id(&self) -> &'static str {
        "logbot"
    }

    fn name(&self) -> &'static str {
        "Gmu Log Bot v0.1"
    }

    fn init(&mut self, host: &dyn Host) -> bool {
        let settings = Self::read_settings(host);

        self.tracker = if settings.enabled {
            info!("Initializing logger");
            match PlayLog::open(&settings.file) {
                Ok(log) => Some(PlayTracker::new(log, settings.thresholds())),
                Err(e) => {
                    warn!("{} - logging disabled", e);
                    None
                }
            }
        } else {
            info!("Logging has been disabled");
            None
        };

        debug!(
            "Minimum playtime: {}s / {}%",
            settings.min_playtime_secs, settings.min_playtime_percent
        );
        self.settings = Some(settings);
        self.is_active()
    }

    fn shut_down(&mut self) {
        if let Some(mut tracker) = self.tracker.take() {
            debug!("Closing file");
            tracker.close();
            sync_filesystems();
        }
    }

    fn handle_event(&mut self, host: &dyn Host, event: HostEvent) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.handle_event(host, event);
        }
    }
}

#[cfg(unix)]
fn sync_filesystems() {
    // SAFETY: sync(2) takes no arguments and cannot fail
    unsafe { libc::sync() };
}

#[cfg(not(unix))]
fn sync_filesystems() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, KEY_ENABLE, KEY_FILE, KEY_MIN_PLAYTIME_PERCENT, KEY_MIN_PLAYTIME_SEC};
    use crate::host::{PlaybackStatus, SimHost};
    use crate::track::TrackInfo;
    use std::fs;
    use std::path::Path;

    fn host_with(enable: &str, file: &Path) -> SimHost {
        let mut config = ConfigFile::new();
        config.set(KEY_ENABLE, enable);
        config.set(KEY_MIN_PLAYTIME_SEC, "10");
        config.set(KEY_MIN_PLAYTIME_PERCENT, "50");
        config.set(KEY_FILE, file.to_string_lossy().to_string());
        SimHost::new(config)
    }

    fn track(title: &str, length_secs: u32) -> TrackInfo {
        TrackInfo {
            artist: "Artist".to_string(),
            title: title.to_string(),
            album: "Album".to_string(),
            length_secs,
            channels: 2,
            ..Default::default()
        }
    }

    fn play_and_stop(host: &mut SimHost, bot: &mut LogBot, info: TrackInfo, stop_secs: u64) {
        host.load_track(info);
        host.deliver(bot, HostEvent::TrackInfoChange);
        host.set_status(PlaybackStatus::Playing);
        host.deliver(bot, HostEvent::PlaybackStateChange);
        host.seek(stop_secs * 1000);
        host.set_status(PlaybackStatus::Stopped);
        host.deliver(bot, HostEvent::PlaybackStateChange);
    }

    #[test]
    fn test_identity() {
        let bot = register();
        assert_eq!(bot.id(), "logbot");
        assert_eq!(bot.name(), "Gmu Log Bot v0.1");
    }

    #[test]
    fn test_full_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let mut host = host_with("yes", &path);
        let mut bot = LogBot::new();

        assert!(bot.init(&host));
        let settings = bot.settings().unwrap();
        assert_eq!(settings.min_playtime_secs, 10);
        assert_eq!(settings.min_playtime_percent, 50);

        play_and_stop(&mut host, &mut bot, track("A", 20), 12);
        play_and_stop(&mut host, &mut bot, track("B", 100), 40);
        bot.shut_down();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(";\"Artist\";\"A\";\"Album\";0:20"));
        assert!(!bot.is_active());
    }

    #[test]
    fn test_disabled_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let mut host = SimHost::new(ConfigFile::new());
        host.config().lock().unwrap().set(KEY_FILE, path.to_string_lossy().to_string());
        let mut bot = LogBot::new();

        assert!(!bot.init(&host));
        play_and_stop(&mut host, &mut bot, track("A", 20), 20);

        // never even created
        assert!(!path.exists());
        // our keys got registered for the settings UI
        let config = host.config().lock().unwrap();
        assert_eq!(config.get_str(KEY_ENABLE), Some("no"));
        assert_eq!(config.presets(KEY_ENABLE), ["yes", "no"]);
    }

    #[test]
    fn test_unopenable_log_degrades_to_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("test.log");
        let mut host = host_with("yes", &path);
        let mut bot = LogBot::new();

        assert!(!bot.init(&host));
        assert!(bot.settings().unwrap().enabled);
        play_and_stop(&mut host, &mut bot, track("A", 20), 20);
        bot.shut_down();
        assert!(!path.exists());
    }

    #[test]
    fn test_nothing_logged_after_shut_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let mut host = host_with("yes", &path);
        let mut bot = LogBot::new();

        assert!(bot.init(&host));
        bot.shut_down();
        bot.shut_down(); // second call is harmless
        play_and_stop(&mut host, &mut bot, track("A", 20), 20);

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_demo_script_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let mut config = ConfigFile::from_toml_str(include_str!("../../demos/config.toml")).unwrap();
        config.set(KEY_FILE, path.to_string_lossy().to_string());

        let mut host = SimHost::new(config);
        let mut bot = LogBot::new();
        assert!(bot.init(&host));

        let steps = crate::host::sim::parse_script(include_str!("../../demos/session.jsonl")).unwrap();
        for step in steps {
            host.apply(&mut bot, step);
        }
        bot.shut_down();

        let titles: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| l.split(';').nth(2).unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["\"A\"", "\"C\""]);
    }

    #[test]
    fn test_busy_track_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let mut host = host_with("yes", &path);
        let mut bot = LogBot::new();
        assert!(bot.init(&host));

        host.load_track(track("A", 20));
        host.hold_track_on_next_event();
        host.deliver(&mut bot, HostEvent::TrackInfoChange);

        let session = bot.tracker().unwrap().session();
        assert!(session.record().is_none());
    }
}
