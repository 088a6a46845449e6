//! Admit, list, restore, purge and audit over the log and the store.
//!
//! Each operation runs to completion on its own; nothing is cached between
//! calls. Log and store are kept in step: an object is moved first and its
//! entry appended after; an entry is dropped only once its object is back.

use std::collections::BTreeSet;
use std::path::Path;
use std::thread;

use crate::config::TrashConfig;
use crate::errors::CoreError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::helpers::{absolute_path, serialize_system_time};
use crate::identifier::generate_identifier;
use crate::log::MetadataLog;
use crate::models::{
    AdmitReport, AuditReport, PurgeOutcome, RestoreOutcome, TrashEntry, LOG_FIELD_SEPARATOR,
};
use crate::prompt::{parse_selection, Prompt};
use crate::store::TrashStore;

#[derive(Debug, Clone)]
pub struct TrashBin<F = RealFileSystem> {
    config: TrashConfig,
    fs: F,
    log: MetadataLog<F>,
    store: TrashStore<F>,
}

impl TrashBin<RealFileSystem> {
    pub fn open(config: TrashConfig) -> Self {
        Self::new(config, RealFileSystem)
    }
}

impl<F: FileSystem + Clone> TrashBin<F> {
    pub fn new(config: TrashConfig, fs: F) -> Self {
        let log = MetadataLog::new(fs.clone(), config.metadata_path.clone());
        let store = TrashStore::new(fs.clone(), config.trash_dir.clone());
        Self {
            config,
            fs,
            log,
            store,
        }
    }

    pub fn config(&self) -> &TrashConfig {
        &self.config
    }

    pub fn log(&self) -> &MetadataLog<F> {
        &self.log
    }

    pub fn store(&self) -> &TrashStore<F> {
        &self.store
    }

    /// Creates the store directory and the log's directory. Safe to repeat.
    pub fn setup(&self) -> crate::Result<()> {
        self.fs.create_dir_all(&self.config.trash_dir)?;
        if let Some(parent) = self.config.metadata_path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Moves every path into the trash, in order.
    ///
    /// Paths the log cannot record, or that overlap the trash bin, are
    /// rejected before anything moves. After that, the first missing path
    /// aborts the batch with `PathNotFound`; items moved before it stay in
    /// the trash. Any other failure after a move is reported as
    /// `AdmitAborted` carrying the count.
    pub fn admit<P: AsRef<Path>>(&self, paths: &[P]) -> crate::Result<AdmitReport> {
        let mut targets = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let original = absolute_path(path)?;
            self.check_admissible(&original)?;
            targets.push((path, original));
        }

        let mut report = AdmitReport::default();
        for (path, original) in targets {
            if !self.fs.exists(&original) {
                tracing::warn!(
                    path = %path.display(),
                    moved = report.moved(),
                    "admit target does not exist, aborting batch"
                );
                return Err(CoreError::PathNotFound {
                    path: path.to_path_buf(),
                    moved: report.moved(),
                });
            }

            if report.moved() > 0 && !self.config.move_delay.is_zero() {
                thread::sleep(self.config.move_delay);
            }

            let entry = match self.admit_one(&original) {
                Ok(entry) => entry,
                Err(CoreError::PathNotFound { path, .. }) => {
                    return Err(CoreError::PathNotFound {
                        path,
                        moved: report.moved(),
                    })
                }
                Err(err) if report.moved() > 0 => {
                    tracing::warn!(
                        path = %path.display(),
                        moved = report.moved(),
                        error = %err,
                        "admit failed mid-batch"
                    );
                    return Err(CoreError::admit_aborted(report.moved(), err));
                }
                Err(err) => return Err(err),
            };
            report.admitted.push(entry);
        }

        tracing::info!(moved = report.moved(), "admit finished");
        Ok(report)
    }

    fn admit_one(&self, original: &Path) -> crate::Result<TrashEntry> {
        let deleted_at = serialize_system_time(self.fs.now());
        let identifier = generate_identifier(&self.fs, original, &deleted_at)?;

        self.store.admit(original, &identifier)?;
        let entry = TrashEntry::new(identifier, deleted_at, original.to_path_buf());
        self.log.append(&entry)?;
        Ok(entry)
    }

    /// Rejects paths the log cannot represent and paths overlapping the
    /// trash bin's own files.
    fn check_admissible(&self, original: &Path) -> crate::Result<()> {
        let text = original.to_str().ok_or_else(|| {
            CoreError::invalid_path(format!("'{}' is not valid UTF-8", original.display()))
        })?;
        if text.contains([LOG_FIELD_SEPARATOR, '\n', '\r']) {
            return Err(CoreError::invalid_path(format!(
                "'{text}' contains a character the metadata log cannot store"
            )));
        }

        for own in [&self.config.trash_dir, &self.config.metadata_path] {
            let own = absolute_path(own)?;
            if own.starts_with(original) || original.starts_with(&own) {
                return Err(CoreError::invalid_path(format!(
                    "refusing to trash '{text}', it overlaps the trash bin at '{}'",
                    own.display()
                )));
            }
        }
        Ok(())
    }

    /// Entries in the trash, oldest first. Empty when the log is empty.
    pub fn list(&self) -> crate::Result<Vec<TrashEntry>> {
        if self.log.is_empty()? {
            return Ok(Vec::new());
        }
        self.log.scan()
    }

    /// Lets `prompt` pick one entry and moves it back to its original path.
    pub fn restore<P: Prompt + ?Sized>(&self, prompt: &mut P) -> crate::Result<RestoreOutcome> {
        let entries = self.list()?;
        if entries.is_empty() {
            return Ok(RestoreOutcome::Empty);
        }

        let answer = prompt.select(&entries)?;
        let index = parse_selection(&answer, entries.len())?;
        let entry = &entries[index];
        self.restore_entry(entry)?;
        Ok(RestoreOutcome::Restored(entry.clone()))
    }

    /// Moves `entry`'s object back, then drops its log line.
    ///
    /// A missing object leaves the log untouched so the entry stays visible.
    pub fn restore_entry(&self, entry: &TrashEntry) -> crate::Result<()> {
        if let Err(err) = self.store.restore(&entry.identifier, &entry.original_path) {
            if matches!(err, CoreError::StoreInconsistency(_)) {
                tracing::warn!(
                    identifier = %entry.identifier,
                    "log entry has no object in the trash store"
                );
            }
            return Err(err);
        }
        self.log.remove(&entry.identifier)?;
        Ok(())
    }

    /// Permanently deletes everything after `prompt` confirms.
    pub fn purge<P: Prompt + ?Sized>(&self, prompt: &mut P) -> crate::Result<PurgeOutcome> {
        if self.log.is_empty()? {
            return Ok(PurgeOutcome::Empty);
        }
        if !prompt.confirm()? {
            tracing::info!("purge declined");
            return Err(CoreError::UserAborted);
        }

        let entries = self.log.scan()?;
        let mut shredded = 0;
        for entry in &entries {
            match self.store.purge_one(&entry.identifier) {
                Ok(true) => shredded += 1,
                Ok(false) => {
                    tracing::debug!(identifier = %entry.identifier, "object already absent")
                }
                Err(err) => tracing::warn!(
                    identifier = %entry.identifier,
                    error = %err,
                    "could not shred trash object, skipping"
                ),
            }
        }
        self.log.clear()?;

        tracing::info!(entries = entries.len(), shredded, "trash emptied");
        Ok(PurgeOutcome::Shredded(entries.len()))
    }

    /// Compares log identifiers with store object names. Read-only.
    pub fn audit(&self) -> crate::Result<AuditReport> {
        let entries = self.log.scan()?;
        let objects = self.store.objects()?;
        let named: BTreeSet<&str> = entries.iter().map(|e| e.identifier.as_str()).collect();

        let orphan_objects = objects
            .iter()
            .filter(|name| !named.contains(name.as_str()))
            .cloned()
            .collect();
        let missing_objects = entries
            .into_iter()
            .filter(|entry| !objects.contains(&entry.identifier))
            .collect();

        Ok(AuditReport {
            missing_objects,
            orphan_objects,
        })
    }
}
