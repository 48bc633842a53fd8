//! Project configuration (`next-affected.config.json`).
//!
//! The file is optional. When it is absent the built-in defaults cover the
//! usual Next.js layouts (`pages`, `src/pages`, `app`, `src/app`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "next-affected.config.json";

/// Error type for configuration loading and writing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("Config I/O error at {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON of the expected shape.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Analysis configuration for a project.
///
/// Serialized with camelCase keys:
///
/// ```json
/// {
///   "pagesDirectories": ["pages", "src/pages", "app", "src/app"],
///   "excludedExtensions": [".css", ".scss", ".less", ".svg", ".png", ".jpg"],
///   "excludedPaths": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAffectedConfig {
    /// Page roots relative to the project directory. Order is priority:
    /// the first root that prefixes a module decides its route.
    pub pages_directories: Vec<String>,
    /// Extensions (with leading dot) whose modules are ignored.
    pub excluded_extensions: Vec<String>,
    /// Directories or files, relative to the project directory, that are ignored.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Default for NextAffectedConfig {
    fn default() -> Self {
        Self {
            pages_directories: ["pages", "src/pages", "app", "src/app"]
                .into_iter()
                .map(String::from)
                .collect(),
            excluded_extensions: [".css", ".scss", ".less", ".svg", ".png", ".jpg"]
                .into_iter()
                .map(String::from)
                .collect(),
            excluded_paths: Vec::new(),
        }
    }
}

impl NextAffectedConfig {
    /// Create a config from explicit lists.
    pub fn new(
        pages_directories: Vec<String>,
        excluded_extensions: Vec<String>,
        excluded_paths: Vec<String>,
    ) -> Self {
        Self {
            pages_directories,
            excluded_extensions,
            excluded_paths,
        }
    }

    /// Render the config the way `init` writes it (two-space indented JSON).
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Load the project config, falling back to defaults when the file is absent.
pub fn load_config(project_dir: impl AsRef<Path>) -> Result<NextAffectedConfig, ConfigError> {
    let path = project_dir.as_ref().join(CONFIG_FILE_NAME);

    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(NextAffectedConfig::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Outcome of [`init_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new config file was written.
    Created(PathBuf),
    /// A config file was already present and left untouched.
    AlreadyExists(PathBuf),
}

/// Write the default config into `dir` unless one already exists.
pub fn init_config(dir: impl AsRef<Path>) -> Result<InitOutcome, ConfigError> {
    let path = dir.as_ref().join(CONFIG_FILE_NAME);

    if path.exists() {
        info!("{CONFIG_FILE_NAME} already exists.");
        return Ok(InitOutcome::AlreadyExists(path));
    }

    let json = NextAffectedConfig::default()
        .to_pretty_json()
        .map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
    fs::write(&path, json).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    info!("Created {CONFIG_FILE_NAME} with default settings.");
    Ok(InitOutcome::Created(path))
}
