use chrono::NaiveDateTime;
use std::path::{Component, Path, PathBuf};

use crate::helpers::{display_deleted_at, parse_deleted_at};

/// Field separator used by metadata log lines.
pub const LOG_FIELD_SEPARATOR: char = '|';

/// True when `identifier` is a single plain file name, usable inside the store.
pub fn is_plain_identifier(identifier: &str) -> bool {
    let mut components = Path::new(identifier).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == identifier
    )
}

/// Operation being driven by the command line collaborator.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandKind {
    Admit,
    List,
    Restore,
    Purge,
    Audit,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admit => "admit",
            Self::List => "list",
            Self::Restore => "restore",
            Self::Purge => "purge",
            Self::Audit => "audit",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record of the metadata log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    /// Name of the object in the trash store.
    pub identifier: String,
    /// Deletion time, exactly as stored (`YYYY-MM-DD HH:MM:SS:ffffff`).
    pub deleted_at: String,
    /// Absolute path the item was removed from.
    pub original_path: PathBuf,
}

impl TrashEntry {
    pub fn new(identifier: String, deleted_at: String, original_path: PathBuf) -> Self {
        Self {
            identifier,
            deleted_at,
            original_path,
        }
    }

    /// Parses one log line. Anything but three fields whose identifier is a
    /// plain file name is rejected.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split(LOG_FIELD_SEPARATOR);
        let identifier = fields.next()?;
        let deleted_at = fields.next()?;
        let original_path = fields.next()?;
        if fields.next().is_some() || !is_plain_identifier(identifier) {
            return None;
        }
        Some(Self::new(
            identifier.to_string(),
            deleted_at.to_string(),
            PathBuf::from(original_path),
        ))
    }

    /// Serializes the entry as a newline-terminated log line.
    pub fn to_line(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}\n",
            self.identifier,
            self.deleted_at,
            self.original_path.display(),
            sep = LOG_FIELD_SEPARATOR
        )
    }

    pub fn deletion_date(&self) -> Option<NaiveDateTime> {
        parse_deleted_at(&self.deleted_at)
    }

    pub fn display_deleted_at(&self) -> String {
        display_deleted_at(&self.deleted_at)
    }

    /// Base name of the original path, used when reporting a restore.
    pub fn file_name(&self) -> String {
        self.original_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.original_path.display().to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdmitReport {
    pub admitted: Vec<TrashEntry>,
}

impl AdmitReport {
    pub fn moved(&self) -> usize {
        self.admitted.len()
    }
}

#[derive(Debug, Clone)]
pub enum RestoreOutcome {
    Empty,
    Restored(TrashEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Empty,
    Shredded(usize),
}

/// Differences between the metadata log and the trash store.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Log entries whose object is gone from the store.
    pub missing_objects: Vec<TrashEntry>,
    /// Store objects that no log entry names.
    pub orphan_objects: Vec<String>,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.missing_objects.is_empty() && self.orphan_objects.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatusLike {
    Ok,
    Warning,
    Error,
}

impl ExitStatusLike {
    pub fn as_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 2,
            Self::Error => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_accepts_three_fields() {
        let entry =
            TrashEntry::parse_line("abc.txt|2024-01-02 03:04:05:000006|/tmp/a.txt\n").unwrap();
        assert_eq!(entry.identifier, "abc.txt");
        assert_eq!(entry.deleted_at, "2024-01-02 03:04:05:000006");
        assert_eq!(entry.original_path, PathBuf::from("/tmp/a.txt"));
        assert_eq!(entry.display_deleted_at(), "2024-01-02 03:04:05");
        assert_eq!(entry.file_name(), "a.txt");
    }

    #[test]
    fn parse_line_rejects_wrong_field_counts() {
        assert!(TrashEntry::parse_line("").is_none());
        assert!(TrashEntry::parse_line("only|two").is_none());
        assert!(TrashEntry::parse_line("a|b|c|d").is_none());
        assert!(TrashEntry::parse_line("|2024-01-02 03:04:05:000006|/tmp/a").is_none());
    }

    #[test]
    fn parse_line_rejects_identifiers_outside_the_store() {
        for identifier in [".", "..", "x/y", "/etc", "./x", "a/"] {
            let line = format!("{identifier}|2024-01-01 00:00:00:000000|/tmp/q");
            assert!(TrashEntry::parse_line(&line).is_none(), "{identifier:?}");
        }
        assert!(is_plain_identifier("abc.tar.gz"));
    }

    #[test]
    fn to_line_parses_back() {
        let entry = TrashEntry::new(
            "deadbeef".into(),
            "2024-01-02 03:04:05:000006".into(),
            PathBuf::from("/srv/data dir"),
        );
        let line = entry.to_line();
        assert_eq!(line, "deadbeef|2024-01-02 03:04:05:000006|/srv/data dir\n");
        assert_eq!(TrashEntry::parse_line(&line), Some(entry));
    }

    #[test]
    fn command_kind_names() {
        assert_eq!(CommandKind::Purge.to_string(), "purge");
        assert_eq!(CommandKind::Admit.as_str(), "admit");
    }
}
