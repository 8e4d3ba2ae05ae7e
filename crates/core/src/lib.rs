//! Shared utilities for the piwx station service:
//! - Configuration loading (XDG-compliant)
//! - File system helpers
//! - Common constants

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{create_dir_all, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "piwx";

/// Default station server port
pub const DEFAULT_STATION_PORT: u16 = 9700;

/// Default lookback for the current-conditions window, in hours
pub const DEFAULT_CURRENT_WINDOW_HOURS: i64 = 4;

/// Default width of a historical query window when a bound is missing, in days
pub const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 14;
