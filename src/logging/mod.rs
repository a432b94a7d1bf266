//! Tracing subscriber setup.
//!
//! The simulator prints its directive trace on stdout, so diagnostics go to
//! a log file instead. `RUST_LOG` selects the level; the default is `info`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to set up file logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("cannot create log directory {path:?}: {source}")]
    DirectoryCreation {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The path has no usable file name.
    #[error("log path has no file name: {0:?}")]
    InvalidPath(PathBuf),

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split a log path into its directory and file name.
///
/// A bare file name logs into the current directory.
pub fn split_log_path(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, file_name.to_string()))
}

/// Install a global file-backed subscriber writing to `log_path`.
///
/// Creates the parent directory when missing. The directory is created
/// before the subscriber is installed, so it exists even when installation
/// fails with [`LoggingError::SubscriberAlreadySet`].
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let (directory, file_name) = split_log_path(log_path)?;
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(&directory, file_name);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}
