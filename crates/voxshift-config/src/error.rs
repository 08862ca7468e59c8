//! Error types for preset storage.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// What was being done to a preset file when I/O failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    /// Reading a preset file.
    Read,
    /// Writing a preset file.
    Write,
    /// Creating the directory a preset lives in.
    CreateDir,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "read",
            IoAction::Write => "write",
            IoAction::CreateDir => "create directory",
        })
    }
}

/// Errors from loading, saving or resolving presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem access failed.
    #[error("could not {action} '{path}': {source}")]
    Io {
        /// The operation that failed.
        action: IoAction,
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A preset file is not valid preset TOML.
    #[error("invalid preset: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A preset could not be encoded.
    #[error("could not encode preset: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No factory or user preset has this name.
    #[error("preset not found: {0}")]
    PresetNotFound(String),
}

impl ConfigError {
    pub(crate) fn io(action: IoAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn not_found() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone")
    }

    #[test]
    fn io_errors_name_action_and_path() {
        let msg = ConfigError::io(IoAction::Read, "/a/b.toml", not_found()).to_string();
        assert_eq!(msg, "could not read '/a/b.toml': gone");

        let msg = ConfigError::io(IoAction::CreateDir, "/a", not_found()).to_string();
        assert!(msg.starts_with("could not create directory"), "got: {msg}");
    }

    #[test]
    fn only_io_errors_carry_a_source() {
        assert!(
            ConfigError::io(IoAction::Write, "/x", not_found())
                .source()
                .is_some()
        );
        assert!(ConfigError::PresetNotFound("p".into()).source().is_none());
    }
}
