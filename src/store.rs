//! Directory holding trashed objects, each named by its identifier.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::fs::FileSystem;
use crate::models::is_plain_identifier;

#[derive(Debug, Clone)]
pub struct TrashStore<F> {
    fs: F,
    root: PathBuf,
}

impl<F: FileSystem> TrashStore<F> {
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `identifier` inside the store.
    ///
    /// Only a single plain file name is accepted, so a corrupt log line can
    /// never address anything outside the store.
    pub fn object_path(&self, identifier: &str) -> crate::Result<PathBuf> {
        if !is_plain_identifier(identifier) {
            return Err(CoreError::invalid_path(format!(
                "'{identifier}' is not a valid trash identifier"
            )));
        }
        Ok(self.root.join(identifier))
    }

    /// Moves `source` into the store as `identifier`.
    pub fn admit(&self, source: &Path, identifier: &str) -> crate::Result<PathBuf> {
        if !self.fs.exists(source) {
            return Err(CoreError::PathNotFound {
                path: source.to_path_buf(),
                moved: 0,
            });
        }

        let destination = self.object_path(identifier)?;
        if self.fs.exists(&destination) {
            return Err(CoreError::conflict(format!(
                "trash object {} already exists",
                destination.display()
            )));
        }

        self.fs.move_path(source, &destination)?;
        tracing::info!(
            source = %source.display(),
            object = %destination.display(),
            "moved item into trash"
        );
        Ok(destination)
    }

    /// Moves `identifier` back out of the store to `destination`.
    pub fn restore(&self, identifier: &str, destination: &Path) -> crate::Result<()> {
        let object = self.object_path(identifier)?;
        if !self.fs.exists(&object) {
            return Err(CoreError::StoreInconsistency(object));
        }
        if self.fs.exists(destination) {
            return Err(CoreError::conflict(format!(
                "refusing to overwrite {}",
                destination.display()
            )));
        }

        if let Some(parent) = destination.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent)?;
            }
        }

        self.fs.move_path(&object, destination)?;
        tracing::info!(
            object = %object.display(),
            destination = %destination.display(),
            "restored item from trash"
        );
        Ok(())
    }

    /// Permanently deletes `identifier`. Returns false when it was already gone.
    pub fn purge_one(&self, identifier: &str) -> crate::Result<bool> {
        let object = self.object_path(identifier)?;
        let metadata = match self.fs.symlink_metadata(&object) {
            Ok(metadata) => metadata,
            Err(_) if !self.fs.exists(&object) => return Ok(false),
            Err(err) => return Err(err),
        };

        if metadata.is_dir() {
            self.fs.remove_dir_all(&object)?;
        } else {
            self.fs.remove_file(&object)?;
        }
        tracing::debug!(object = %object.display(), "shredded trash object");
        Ok(true)
    }

    /// Names of every object currently in the store.
    pub fn objects(&self) -> crate::Result<BTreeSet<String>> {
        if !self.fs.exists(&self.root) {
            return Ok(BTreeSet::new());
        }

        Ok(self
            .fs
            .list_dir(&self.root)?
            .into_iter()
            .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .collect())
    }
}
