//! Shared utility helpers for timestamps and path handling.

use chrono::{DateTime, Local, NaiveDateTime};
use std::env;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use crate::errors::CoreError;

/// Deletion time format stored in the metadata log (microsecond precision).
pub const DELETED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S:%6f";

/// Deletion time format shown to the operator.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder rendered when a stored deletion time cannot be parsed.
pub const UNKNOWN_DELETION_DATE: &str = "????-??-?? ??:??:??";

/// Serializes a wall-clock time into the metadata log format, in local time.
pub fn serialize_system_time(time: SystemTime) -> String {
    let dt = DateTime::<Local>::from(time);
    dt.format(DELETED_AT_FORMAT).to_string()
}

/// Parses a deletion time as written by [`serialize_system_time`].
pub fn parse_deleted_at(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DELETED_AT_FORMAT).ok()
}

/// Renders a stored deletion time without its fractional component.
pub fn display_deleted_at(value: &str) -> String {
    parse_deleted_at(value)
        .map(|dt| dt.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DELETION_DATE.to_string())
}

/// Returns a user-safe, trimmed path string that can be used in logs and messages.
pub fn sanitize_user_path(path: &Path) -> String {
    path.display().to_string().trim().to_string()
}

/// Joins `path` onto `cwd` when relative and drops `.`/`..` segments lexically.
///
/// Symlinks are not resolved: trashing a link must move the link itself.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// [`absolutize`] against the process working directory.
pub fn absolute_path(path: &Path) -> crate::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(absolutize(path, Path::new("/")));
    }
    let cwd = env::current_dir().map_err(|err| CoreError::io(path, err))?;
    Ok(absolutize(path, &cwd))
}
