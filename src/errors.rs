use std::{io, path::PathBuf};

use crate::models::ExitStatusLike;

/// Error type shared by every trash bin operation.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// File system I/O failure.
    #[error("I/O error while accessing {}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    /// An admit target does not exist. `moved` items before it stay in the trash.
    #[error("'{}' does not exist.", .path.display())]
    PathNotFound { path: PathBuf, moved: usize },

    /// An admit batch failed after `moved` items were already in the trash.
    #[error("admit stopped after {moved} item(s) were moved to trash bin")]
    AdmitAborted {
        moved: usize,
        #[source]
        source: Box<CoreError>,
    },

    /// The restore index was not a number or was out of range.
    #[error("{0}")]
    InvalidSelection(String),

    /// The log references an object that is gone from the store.
    #[error("'{}' does not exist in trash bin.", .0.display())]
    StoreInconsistency(PathBuf),

    /// The operator declined a confirmation or interrupted a prompt.
    #[error("Aborted by user.")]
    UserAborted,

    /// A path is invalid for the current operation.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An operation was rejected due to configuration/argument issues.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required input is missing.
    #[error("missing required value: {0}")]
    MissingValue(String),

    /// A conflict prevented the operation from proceeding.
    #[error("resource conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath(message.into())
    }

    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingValue(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn admit_aborted(moved: usize, source: CoreError) -> Self {
        Self::AdmitAborted {
            moved,
            source: Box::new(source),
        }
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }

    /// True for the "no effect" outcome that callers report apart from real failures.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::UserAborted)
    }

    pub fn exit_status(&self) -> ExitStatusLike {
        match self {
            Self::UserAborted => ExitStatusLike::Ok,
            Self::PathNotFound { moved, .. } | Self::AdmitAborted { moved, .. } if *moved > 0 => {
                ExitStatusLike::Warning
            }
            _ => ExitStatusLike::Error,
        }
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_is_not_a_failure() {
        assert!(CoreError::UserAborted.is_abort());
        assert_eq!(CoreError::UserAborted.exit_status().as_code(), 0);
    }

    #[test]
    fn partial_admit_maps_to_warning() {
        let partial = CoreError::PathNotFound {
            path: PathBuf::from("/nope"),
            moved: 2,
        };
        let untouched = CoreError::PathNotFound {
            path: PathBuf::from("/nope"),
            moved: 0,
        };
        assert_eq!(partial.exit_status().as_code(), 2);
        assert_eq!(untouched.exit_status().as_code(), 1);

        let aborted = CoreError::admit_aborted(1, CoreError::conflict("taken"));
        assert_eq!(aborted.exit_status().as_code(), 2);
        assert_eq!(
            std::error::Error::source(&aborted).map(ToString::to_string),
            Some("resource conflict: taken".to_string())
        );
    }

    #[test]
    fn messages_name_the_path() {
        let err = CoreError::PathNotFound {
            path: PathBuf::from("/tmp/missing.txt"),
            moved: 0,
        };
        assert_eq!(err.to_string(), "'/tmp/missing.txt' does not exist.");

        let err = CoreError::StoreInconsistency(PathBuf::from("/trash/abc.txt"));
        assert_eq!(err.to_string(), "'/trash/abc.txt' does not exist in trash bin.");
    }
}
