//! TOML configuration file loading.
//!
//! The client runs without any file: a missing path yields
//! [`ClientConfig::default`].  When a file exists, every field in it is
//! optional and missing fields take their defaults (see
//! [`crate::domain::config`] for the layout).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::ClientConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads the client configuration from `path`.
///
/// Returns the default configuration when the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
/// [`ConfigError::Parse`] if its content is not valid TOML for
/// [`ClientConfig`].
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ClientConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
