// Configuration for the log bot
// The host owns a flat key/value store; we register our keys in it and read them once at init

use crate::behavior::Thresholds;
use crate::error::{PlayLogError, Result};
use dirs::config_dir;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_ENABLE: &str = "Log.Enable";
pub const KEY_MIN_PLAYTIME_SEC: &str = "Log.MinimumPlaytimeSec";
pub const KEY_MIN_PLAYTIME_PERCENT: &str = "Log.MinimumPlaytimePercent";
pub const KEY_FILE: &str = "Log.File";

pub const DEFAULT_LOG_FILE: &str = "gmutracks.log";
/// Used when the configured value is zero, negative or garbage
pub const FALLBACK_MIN_PLAYTIME_SEC: u32 = 30;
pub const FALLBACK_MIN_PLAYTIME_PERCENT: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ConfigEntry {
    value: String,
    presets: Vec<String>,
}

/// The host's key/value config store. Values are always strings; presets are
/// just hints for a settings UI, any value is accepted.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    entries: BTreeMap<String, ConfigEntry>,
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML file. Both `"Log.Enable" = "yes"` and a `[Log]` table work.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PlayLogError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| PlayLogError::Config(e.to_string()))?;

        let mut config = Self::new();
        config.merge_table("", &table)?;
        Ok(config)
    }

    fn merge_table(&mut self, prefix: &str, table: &toml::Table) -> Result<()> {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            let text = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => (if *b { "yes" } else { "no" }).to_string(),
                toml::Value::Table(nested) => {
                    self.merge_table(&full_key, nested)?;
                    continue;
                }
                other => {
                    return Err(PlayLogError::Config(format!(
                        "unsupported value for {}: {}",
                        full_key,
                        other.type_str()
                    )))
                }
            };
            self.set(&full_key, text);
        }
        Ok(())
    }

    /// Add a key with its default value. Existing values are left alone.
    pub fn add_key(&mut self, key: &str, default: &str) {
        self.entries.entry(key.to_string()).or_insert_with(|| ConfigEntry {
            value: default.to_string(),
            presets: Vec::new(),
        });
    }

    pub fn add_presets(&mut self, key: &str, presets: &[&str]) {
        if let Some(entry) = self.entries.get_mut(key) {
            for preset in presets {
                if !entry.presets.iter().any(|p| p == preset) {
                    entry.presets.push(preset.to_string());
                }
            }
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.entry(key.to_string()).or_default().value = value.into();
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    /// Missing keys and anything that isn't a "yes" read as false
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_str(key)
            .map(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "yes" | "true" | "1" | "on"
                )
            })
            .unwrap_or(false)
    }

    /// C-style integer read: leading digits count, anything else is 0
    pub fn get_int(&self, key: &str) -> i64 {
        self.get_str(key).map(parse_leading_int).unwrap_or(0)
    }

    pub fn presets(&self, key: &str) -> &[String] {
        self.entries
            .get(key)
            .map(|e| e.presets.as_slice())
            .unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `$XDG_CONFIG_HOME/playlog/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("playlog").join("config.toml"))
    }
}

fn parse_leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative {
        -value
    } else {
        value
    }
}

/// What the log bot actually runs with, after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    pub min_playtime_secs: u32,
    pub min_playtime_percent: u32,
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_playtime_secs: FALLBACK_MIN_PLAYTIME_SEC,
            min_playtime_percent: FALLBACK_MIN_PLAYTIME_PERCENT,
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LogSettings {
    /// Register our keys (with defaults and UI presets) in the host's store.
    pub fn register(config: &mut ConfigFile) {
        config.add_key(KEY_ENABLE, "no");
        config.add_presets(KEY_ENABLE, &["yes", "no"]);
        config.add_key(KEY_MIN_PLAYTIME_SEC, "10");
        config.add_presets(KEY_MIN_PLAYTIME_SEC, &["5", "10", "30", "60", "90"]);
        config.add_key(KEY_MIN_PLAYTIME_PERCENT, "10");
        config.add_presets(KEY_MIN_PLAYTIME_PERCENT, &["1", "10", "25", "50", "75"]);
        config.add_key(KEY_FILE, DEFAULT_LOG_FILE);
    }

    pub fn from_config(config: &ConfigFile) -> Self {
        let file = config
            .get_str(KEY_FILE)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_LOG_FILE);

        Self {
            enabled: config.get_bool(KEY_ENABLE),
            min_playtime_secs: positive_or(
                config.get_int(KEY_MIN_PLAYTIME_SEC),
                FALLBACK_MIN_PLAYTIME_SEC,
            ),
            min_playtime_percent: positive_or(
                config.get_int(KEY_MIN_PLAYTIME_PERCENT),
                FALLBACK_MIN_PLAYTIME_PERCENT,
            ),
            file: PathBuf::from(file),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.min_playtime_secs, self.min_playtime_percent)
    }
}

fn positive_or(value: i64, fallback: u32) -> u32 {
    if value <= 0 {
        fallback
    } else {
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}
