//! Configuration file loading
//!
//! Read-only: the visualizer never writes preferences back to disk.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Default config file location
///
/// Returns: `<config dir>/vap-viz/config.yaml` (falls back to the home
/// directory, then the working directory)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("vap-viz")
        .join("config.yaml")
}

/// Parse configuration from YAML text
pub fn parse_config<T>(yaml: &str) -> Result<T, serde_yaml::Error>
where
    T: DeserializeOwned,
{
    serde_yaml::from_str(yaml)
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return T::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_config::<T>(&contents) {
            Ok(config) => {
                log::info!("load_config: Successfully loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("load_config: Failed to parse config: {}, using defaults", e);
                T::default()
            }
        },
        Err(e) => {
            log::warn!(
                "load_config: Failed to read config file: {}, using defaults",
                e
            );
            T::default()
        }
    }
}
