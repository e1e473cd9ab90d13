// PlayLog - drive the log bot without the real player
// Replays a scripted listening session through the plugin, handy for checking thresholds

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playlog::{
    config::{KEY_ENABLE, KEY_FILE},
    host::sim::parse_script,
    ConfigFile, LogBot, LogSettings, Plugin, SimHost,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playlog")]
#[command(about = "Play-history logger - replay a listening session through the log bot")]
struct Args {
    /// Config file (defaults to ~/.config/playlog/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable developer logging (stderr instead of logs/playlog.log)
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed a JSON-lines script of host steps to the log bot
    Replay {
        script: PathBuf,

        /// Write the play log here instead of the configured Log.File
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Turn logging on regardless of Log.Enable
        #[arg(long)]
        enable: bool,
    },
    /// Show the log bot's config keys, current values and presets
    Keys,
}

fn init_logging(dev: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,playlog=debug"));

    if dev {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_env_filter(filter)
            .init();
        return Ok(None);
    }

    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&log_dir, "playlog.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    Ok(Some(guard))
}

fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return ConfigFile::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    match ConfigFile::default_path() {
        Some(default) if default.exists() => ConfigFile::load(&default)
            .with_context(|| format!("Failed to load config {}", default.display())),
        _ => Ok(ConfigFile::new()),
    }
}

fn replay(mut config: ConfigFile, script: &Path, log_file: Option<PathBuf>, enable: bool) -> Result<()> {
    let content = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps = parse_script(&content)?;

    if let Some(file) = log_file {
        config.set(KEY_FILE, file.to_string_lossy().to_string());
    }
    if enable {
        config.set(KEY_ENABLE, "yes");
    }

    let mut host = SimHost::new(config);
    let mut bot = LogBot::new();
    let active = bot.init(&host);
    info!("{} ({}) active: {}", bot.name(), bot.id(), active);

    let step_count = steps.len();
    for step in steps {
        host.apply(&mut bot, step);
    }
    bot.shut_down();

    match bot.settings() {
        Some(settings) if active => println!(
            "Replayed {} steps, play log at {}",
            step_count,
            settings.file.display()
        ),
        _ => println!("Replayed {} steps, logging was not active", step_count),
    }
    Ok(())
}

fn show_keys(mut config: ConfigFile) {
    LogSettings::register(&mut config);
    for key in config.keys().filter(|k| k.starts_with("Log.")) {
        let value = config.get_str(key).unwrap_or_default();
        let presets = config.presets(key);
        if presets.is_empty() {
            println!("{} = {}", key, value);
        } else {
            println!("{} = {}    [{}]", key, value, presets.join(", "));
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.dev)?;

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Replay {
            script,
            log_file,
            enable,
        } => replay(config, &script, log_file, enable)?,
        Command::Keys => show_keys(config),
    }

    Ok(())
}
