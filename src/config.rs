use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize)]
#[allow(unused)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub data_dir: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let blueprint_path = match std::env::var("CARGO_MANIFEST_DIR") {
            Ok(manifest_dir) => {
                let mut path = PathBuf::from(manifest_dir);
                path.push("spacedash.toml");
                path
            }
            Err(_) => {
                // Fallback for release builds or when not using Cargo.
                // Assumes spacedash.toml is in the current working directory.
                PathBuf::from("spacedash.toml")
            }
        };

        let user_config_path = get_user_config_path();

        // If the user config doesn't exist, create it from the blueprint `spacedash.toml`
        if !user_config_path.exists() {
            if let Ok(blueprint_content) = fs::read_to_string(&blueprint_path) {
                if let Some(parent) = user_config_path.parent() {
                    fs::create_dir_all(parent).expect("Could not create config directory");
                }
                fs::write(&user_config_path, blueprint_content)
                    .expect("Could not write user config file from blueprint");
            }
            // If spacedash.toml doesn't exist at blueprint_path, builder will fail. This is intended.
        }

        let s = Config::builder()
            // 1. Load project defaults from spacedash.toml (blueprint). Required.
            .add_source(File::from(blueprint_path).required(true))
            // 2. Merge user's global config. Required as we just created it if it was missing.
            .add_source(File::from(user_config_path).required(true))
            // 3. Merge local spacedash.toml from CWD. Optional override.
            .add_source(File::with_name("spacedash.toml").required(false))
            .build()?;

        s.try_deserialize()
    }

    /// Directory holding the filter slot and the log file. `data_dir` from the
    /// config wins (tilde-expanded), otherwise the config directory is reused.
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            None => get_user_config_path()
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

pub fn get_user_config_path() -> PathBuf {
    let mut path = dirs::home_dir().expect("Failed to get home directory");
    path.push(".config");
    path.push("spacedash");
    path.push("spacedash.toml");
    path
}
