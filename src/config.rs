//! Locations and pacing of the trash bin.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::CoreError;

/// Pause between successive moves of one admit batch.
pub const DEFAULT_MOVE_DELAY: Duration = Duration::from_millis(125);

/// Overrides the trash store directory.
pub const TRASH_DIR_VAR: &str = "TRASHBIN_DIR";
/// Overrides the metadata log path.
pub const METADATA_VAR: &str = "TRASHBIN_METADATA";
/// Overrides the inter-move delay, in milliseconds.
pub const MOVE_DELAY_VAR: &str = "TRASHBIN_MOVE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashConfig {
    /// Directory holding trashed objects.
    pub trash_dir: PathBuf,
    /// Metadata log file.
    pub metadata_path: PathBuf,
    pub move_delay: Duration,
}

impl TrashConfig {
    pub fn new(trash_dir: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            trash_dir: trash_dir.into(),
            metadata_path: metadata_path.into(),
            move_delay: DEFAULT_MOVE_DELAY,
        }
    }

    pub fn with_move_delay(mut self, move_delay: Duration) -> Self {
        self.move_delay = move_delay;
        self
    }

    /// Builds the configuration from environment variables.
    ///
    /// Defaults are `$HOME/.local/share/trashbin` for the store and
    /// `$HOME/.cache/trashbin/metadata` for the log.
    pub fn from_environ(environ: &HashMap<String, String>) -> crate::Result<Self> {
        let home = environ
            .get("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from);

        let trash_dir = match environ.get(TRASH_DIR_VAR).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => home
                .as_ref()
                .map(|home| home.join(".local").join("share").join("trashbin"))
                .ok_or_else(|| CoreError::missing("HOME"))?,
        };

        let metadata_path = match environ.get(METADATA_VAR).filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => home
                .as_ref()
                .map(|home| home.join(".cache").join("trashbin").join("metadata"))
                .ok_or_else(|| CoreError::missing("HOME"))?,
        };

        let move_delay = match environ.get(MOVE_DELAY_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    CoreError::invalid_input(format!(
                        "{MOVE_DELAY_VAR} must be milliseconds, got '{value}'"
                    ))
                })?,
            None => DEFAULT_MOVE_DELAY,
        };

        Ok(Self::new(trash_dir, metadata_path).with_move_delay(move_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environ(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_follow_home() {
        let config = TrashConfig::from_environ(&environ(&[("HOME", "/home/op")])).unwrap();
        assert_eq!(config.trash_dir, PathBuf::from("/home/op/.local/share/trashbin"));
        assert_eq!(config.metadata_path, PathBuf::from("/home/op/.cache/trashbin/metadata"));
        assert_eq!(config.move_delay, DEFAULT_MOVE_DELAY);
    }

    #[test]
    fn overrides_win_over_home() {
        let config = TrashConfig::from_environ(&environ(&[
            ("HOME", "/home/op"),
            (TRASH_DIR_VAR, "/srv/trash"),
            (METADATA_VAR, "/srv/meta/log"),
            (MOVE_DELAY_VAR, "0"),
        ]))
        .unwrap();
        assert_eq!(config.trash_dir, PathBuf::from("/srv/trash"));
        assert_eq!(config.metadata_path, PathBuf::from("/srv/meta/log"));
        assert_eq!(config.move_delay, Duration::ZERO);
    }

    #[test]
    fn missing_home_without_overrides_fails() {
        let err = TrashConfig::from_environ(&environ(&[])).unwrap_err();
        assert!(matches!(err, CoreError::MissingValue(ref v) if v == "HOME"));

        let config = TrashConfig::from_environ(&environ(&[
            (TRASH_DIR_VAR, "/t"),
            (METADATA_VAR, "/m"),
        ]))
        .unwrap();
        assert_eq!(config.trash_dir, PathBuf::from("/t"));
    }

    #[test]
    fn bad_delay_is_rejected() {
        let err = TrashConfig::from_environ(&environ(&[("HOME", "/h"), (MOVE_DELAY_VAR, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(MOVE_DELAY_VAR));
    }
}
