//! Flat-file metadata log: one `identifier|deleted_at|original_path` line per
//! trashed item, oldest first. It is the authoritative index of the trash.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::models::{TrashEntry, LOG_FIELD_SEPARATOR};

#[derive(Debug, Clone)]
pub struct MetadataLog<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> MetadataLog<F> {
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry, creating the log and its directory on first use.
    pub fn append(&self, entry: &TrashEntry) -> crate::Result<()> {
        self.ensure_parent()?;
        self.fs.append(&self.path, entry.to_line().as_bytes())?;
        tracing::debug!(identifier = %entry.identifier, "appended metadata entry");
        Ok(())
    }

    /// Reads every well-formed entry in insertion order. Malformed lines are skipped.
    pub fn scan(&self) -> crate::Result<Vec<TrashEntry>> {
        if !self.fs.exists(&self.path) {
            return Ok(Vec::new());
        }

        let content = self.fs.read(&self.path)?;
        let mut entries = Vec::new();
        for (index, line) in content.split(|byte| *byte == b'\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            match std::str::from_utf8(line).ok().and_then(TrashEntry::parse_line) {
                Some(entry) => entries.push(entry),
                None => tracing::debug!(
                    path = %self.path.display(),
                    line = index + 1,
                    "skipping malformed metadata line"
                ),
            }
        }
        Ok(entries)
    }

    /// Drops every line naming `identifier` and returns how many were dropped.
    /// Lines that do not parse are carried over byte for byte.
    ///
    /// The rewritten log goes to a sibling temporary file that then replaces
    /// the log in a single rename, so readers see either version in full.
    pub fn remove(&self, identifier: &str) -> crate::Result<usize> {
        if self.is_empty()? {
            return Ok(0);
        }

        let content = self.fs.read(&self.path)?;
        let mut kept = Vec::with_capacity(content.len());
        let mut removed = 0;
        for line in content.split_inclusive(|byte| *byte == b'\n') {
            if line_identifier(line) == Some(identifier.as_bytes()) {
                removed += 1;
            } else {
                kept.extend_from_slice(line);
            }
        }

        let temp_path = self.temp_path();
        self.fs.write(&temp_path, &kept)?;
        self.fs.rename(&temp_path, &self.path)?;

        tracing::debug!(identifier, removed, "rewrote metadata log");
        Ok(removed)
    }

    /// Truncates the log to zero length.
    pub fn clear(&self) -> crate::Result<()> {
        self.ensure_parent()?;
        self.fs.write(&self.path, b"")
    }

    /// True when the log is missing or has zero length.
    pub fn is_empty(&self) -> crate::Result<bool> {
        if !self.fs.exists(&self.path) {
            return Ok(true);
        }
        Ok(self.fs.metadata(&self.path)?.len() == 0)
    }

    fn ensure_parent(&self) -> crate::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.fs.create_dir_all(parent),
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn line_identifier(line: &[u8]) -> Option<&[u8]> {
    let separator = LOG_FIELD_SEPARATOR as u8;
    line.iter()
        .position(|byte| *byte == separator)
        .map(|at| &line[..at])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use std::fs;
    use tempfile::tempdir;

    fn entry(identifier: &str, path: &str) -> TrashEntry {
        TrashEntry::new(
            identifier.to_string(),
            "2024-01-01 10:00:00:000001".to_string(),
            PathBuf::from(path),
        )
    }

    #[test]
    fn append_creates_parent_directories() {
        let tmp = tempdir().unwrap();
        let log = MetadataLog::new(RealFileSystem, tmp.path().join("cache/trashbin/metadata"));

        assert!(log.is_empty().unwrap());
        log.append(&entry("aaa.txt", "/tmp/a.txt")).unwrap();

        assert!(!log.is_empty().unwrap());
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "aaa.txt|2024-01-01 10:00:00:000001|/tmp/a.txt\n"
        );
    }

    #[test]
    fn scan_returns_insertion_order() {
        let tmp = tempdir().unwrap();
        let log = MetadataLog::new(RealFileSystem, tmp.path().join("metadata"));
        log.append(&entry("first", "/a")).unwrap();
        log.append(&entry("second", "/b")).unwrap();
        log.append(&entry("third", "/c")).unwrap();

        let ids: Vec<String> = log.scan().unwrap().into_iter().map(|e| e.identifier).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn scan_skips_malformed_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("metadata");
        fs::write(
            &path,
            "one|2024-01-01 10:00:00:000001|/a\n\
             garbage without separators\n\
             \n\
             two|too|many|fields\n\
             three|2024-01-01 10:00:00:000003|/c\n",
        )
        .unwrap();
        let log = MetadataLog::new(RealFileSystem, path);

        let ids: Vec<String> = log.scan().unwrap().into_iter().map(|e| e.identifier).collect();
        assert_eq!(ids, ["one", "three"]);
    }

    #[test]
    fn scan_skips_lines_that_are_not_utf8() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("metadata");
        let mut content = b"one|2024-01-01 10:00:00:000001|/a\n".to_vec();
        content.extend_from_slice(b"\xff\xfe garbage\n");
        content.extend_from_slice(b"two|2024-01-01 10:00:00:000002|/b\n");
        fs::write(&path, &content).unwrap();
        let log = MetadataLog::new(RealFileSystem, &path);

        let ids: Vec<String> = log.scan().unwrap().into_iter().map(|e| e.identifier).collect();
        assert_eq!(ids, ["one", "two"]);

        assert_eq!(log.remove("one").unwrap(), 1);
        assert_eq!(
            fs::read(&path).unwrap(),
            b"\xff\xfe garbage\ntwo|2024-01-01 10:00:00:000002|/b\n"
        );
    }

    #[test]
    fn scan_of_missing_log_is_empty() {
        let tmp = tempdir().unwrap();
        let log = MetadataLog::new(RealFileSystem, tmp.path().join("nothing-here"));
        assert!(log.scan().unwrap().is_empty());
    }

    #[test]
    fn remove_rewrites_without_matching_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("metadata");
        fs::write(
            &path,
            "keep|t|/a\n\
             drop|t|/b\n\
             malformed line\n\
             dropped|t|/c\n",
        )
        .unwrap();
        let log = MetadataLog::new(RealFileSystem, &path);

        assert_eq!(log.remove("drop").unwrap(), 1);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "keep|t|/a\nmalformed line\ndropped|t|/c\n"
        );
        assert!(!tmp.path().join("metadata.tmp").exists());
    }

    #[test]
    fn remove_unknown_identifier_keeps_content() {
        let tmp = tempdir().unwrap();
        let log = MetadataLog::new(RealFileSystem, tmp.path().join("metadata"));
        log.append(&entry("only", "/a")).unwrap();

        assert_eq!(log.remove("other").unwrap(), 0);
        assert_eq!(log.scan().unwrap().len(), 1);
    }

    #[test]
    fn clear_truncates() {
        let tmp = tempdir().unwrap();
        let log = MetadataLog::new(RealFileSystem, tmp.path().join("metadata"));
        log.append(&entry("x", "/x")).unwrap();

        log.clear().unwrap();

        assert!(log.is_empty().unwrap());
        assert!(log.path().exists());
    }
}
