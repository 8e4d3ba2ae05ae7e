use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use piwx_core::{find_config_file, load_config, ConfigSource, DEFAULT_STATION_PORT};
use std::env;

use crate::auth::DEFAULT_CREDENTIAL_DIGEST;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "piwx - weather station observation server and query API"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $PIWX_CONFIG, ./station.toml,
    /// $XDG_CONFIG_HOME/piwx/station.toml, /etc/piwx/station.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "PIWX_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "PIWX_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PIWX_PORT")]
    pub port: Option<String>,

    /// Directory for the observation database
    #[arg(short, long, env = "PIWX_DB_DIR")]
    pub db_dir: Option<String>,

    /// Initial display timezone (IANA name); position updates replace it
    #[arg(short, long, env = "PIWX_TIMEZONE")]
    pub timezone: Option<String>,

    /// SHA-1 hex digest of the sensor shared secret
    #[arg(short = 'S', long, env = "PIWX_CREDENTIAL_DIGEST")]
    pub credential_digest: Option<String>,

    /// Lookback for the current-conditions window, in hours
    #[arg(short = 'w', long, env = "PIWX_CURRENT_WINDOW_HOURS")]
    pub current_window_hours: Option<i64>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_STATION_PORT.to_string())
    }

    pub fn db_dir(&self) -> String {
        self.db_dir.clone().unwrap_or_else(|| "./wxdata".to_string())
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        self.timezone
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or(chrono_tz::America::New_York)
    }

    pub fn credential_digest(&self) -> String {
        self.credential_digest
            .clone()
            .unwrap_or_else(|| DEFAULT_CREDENTIAL_DIGEST.to_string())
    }

    pub fn current_window_hours(&self) -> i64 {
        self.current_window_hours
            .unwrap_or(piwx_core::DEFAULT_CURRENT_WINDOW_HOURS)
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("PIWX_CONFIG", "station.toml")
    };

    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        domain: cli_args.domain.or(file_config.domain),
        port: cli_args.port.or(file_config.port),
        db_dir: cli_args.db_dir.or(file_config.db_dir),
        timezone: cli_args.timezone.or(file_config.timezone),
        credential_digest: cli_args.credential_digest.or(file_config.credential_digest),
        current_window_hours: cli_args
            .current_window_hours
            .or(file_config.current_window_hours),
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                chrono::Utc::now().to_rfc3339(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
