use std::path::PathBuf;
use thiserror::Error;

pub const APP_DIR_NAME: &str = "simple-todo";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Could not determine home directory")]
    NoHomeDir,
}

fn validate_data_dir(path: &str) -> Result<PathBuf, ConfigError> {
    if path.contains('\0') {
        return Err(ConfigError::InvalidConfig(
            "Path contains invalid characters".to_string(),
        ));
    }
    if path.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "Path cannot be empty".to_string(),
        ));
    }

    let path = shellexpand::tilde(path);
    Ok(PathBuf::from(path.as_ref()))
}

/// Picks the data directory: an explicit override, else
/// `$XDG_DATA_HOME/simple-todo`, else `~/.local/share/simple-todo`.
/// An empty `XDG_DATA_HOME` counts as unset.
pub fn resolve_data_dir(
    explicit: Option<&str>,
    xdg_data_home: Option<&str>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return validate_data_dir(path);
    }

    let base = match xdg_data_home.filter(|p| !p.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => home
            .ok_or(ConfigError::NoHomeDir)?
            .join(".local")
            .join("share"),
    };
    Ok(base.join(APP_DIR_NAME))
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data_dir: Option<String>,
}

impl Config {
    pub fn with_data_dir(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
        }
    }

    /// The data directory for this configuration, consulting the process
    /// environment when no override is set.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        let xdg = std::env::var("XDG_DATA_HOME").ok();
        resolve_data_dir(self.data_dir.as_deref(), xdg.as_deref(), dirs::home_dir())
    }
}
