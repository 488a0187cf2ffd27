//! Locating and reading the classmap TOML configuration.
//!
//! A file named with `--config` always wins. Without one, the project file
//! `classmap/config.toml` under the working directory is tried, then
//! `config.toml` in the per-user config directory. When neither exists the
//! built-in [`AppConfig`] defaults apply.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use classmap::{ClassmapError, config::AppConfig};

const PROJECT_CONFIG: &str = "classmap/config.toml";

/// Failures reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for ClassmapError {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::Parse { .. } => io::ErrorKind::InvalidData,
            ConfigError::MissingFile(_) => io::ErrorKind::NotFound,
        };
        ClassmapError::Io(io::Error::new(kind, err))
    }
}

/// Where the active configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Named on the command line; must exist.
    Explicit(PathBuf),
    /// `classmap/config.toml` below the working directory.
    Project(PathBuf),
    /// `config.toml` in the per-user config directory.
    User(PathBuf),
    Defaults,
}

impl ConfigOrigin {
    /// Returns the file to read, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigOrigin::Explicit(path) | ConfigOrigin::Project(path) | ConfigOrigin::User(path) => {
                Some(path)
            }
            ConfigOrigin::Defaults => None,
        }
    }

    /// Reads the configuration this origin points at.
    ///
    /// # Errors
    ///
    /// Fails when the file is gone, unreadable, or not a valid
    /// [`AppConfig`] document.
    pub fn load(&self) -> Result<AppConfig, ClassmapError> {
        match self.path() {
            Some(path) => read_config(path),
            None => Ok(AppConfig::default()),
        }
    }
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Explicit(_) => f.write_str("command line"),
            ConfigOrigin::Project(_) => f.write_str("project"),
            ConfigOrigin::User(_) => f.write_str("user"),
            ConfigOrigin::Defaults => f.write_str("defaults"),
        }
    }
}

/// Picks the configuration to use without reading it.
pub fn locate_config(explicit: Option<&Path>) -> ConfigOrigin {
    if let Some(path) = explicit {
        return ConfigOrigin::Explicit(path.to_path_buf());
    }

    let project = PathBuf::from(PROJECT_CONFIG);
    if project.is_file() {
        return ConfigOrigin::Project(project);
    }

    match ProjectDirs::from("com", "classmap", "classmap") {
        Some(dirs) => {
            let user = dirs.config_dir().join("config.toml");
            if user.is_file() {
                return ConfigOrigin::User(user);
            }
            debug!(path = user.display().to_string(); "No user configuration file");
        }
        None => debug!("No per-user config directory on this platform"),
    }

    ConfigOrigin::Defaults
}

/// Locates and reads the configuration for this run.
///
/// # Errors
///
/// An explicit path that does not exist is an error; so is any located file
/// that fails to parse.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ClassmapError> {
    let origin = locate_config(explicit);
    match origin.path() {
        Some(path) => {
            info!(origin = origin.to_string(), path = path.display().to_string(); "Loading configuration")
        }
        None => debug!("Using default configuration"),
    }
    origin.load()
}

fn read_config(path: &Path) -> Result<AppConfig, ClassmapError> {
    let content = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ConfigError::MissingFile(path.to_path_buf()).into(),
        _ => ClassmapError::Io(err),
    })?;

    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}
