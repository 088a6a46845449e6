use crate::errors::CoreError;
use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Filesystem abstraction boundary for the trash bin components.
///
/// The log, the store and the identifier generator only touch disk through
/// this trait, which keeps the wall clock and the move primitive replaceable
/// in tests.
pub trait FileSystem: Send + Sync {
    /// Returns the current time in wall-clock format.
    fn now(&self) -> SystemTime;

    /// Returns true when path exists. Dangling symlinks exist.
    fn exists(&self, path: &Path) -> bool;

    /// Reads file metadata.
    fn metadata(&self, path: &Path) -> crate::Result<Metadata>;

    /// Reads symlink metadata.
    fn symlink_metadata(&self, path: &Path) -> crate::Result<Metadata>;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Opens a file for streaming reads.
    fn open(&self, path: &Path) -> crate::Result<Box<dyn Read>>;

    /// Appends raw bytes, creating the file when missing.
    fn append(&self, path: &Path, data: &[u8]) -> crate::Result<()>;

    /// Writes raw bytes (truncate + write).
    fn write(&self, path: &Path, data: &[u8]) -> crate::Result<()>;

    /// Reads the whole file as raw bytes.
    fn read(&self, path: &Path) -> crate::Result<Vec<u8>>;

    /// Removes a file or symlink.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Removes a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Renames a path. Both ends must be on the same volume.
    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Moves a path, falling back to copy + delete across volumes.
    fn move_path(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn metadata(&self, path: &Path) -> crate::Result<Metadata> {
        fs::metadata(path).map_err(|err| CoreError::io(path, err))
    }

    fn symlink_metadata(&self, path: &Path) -> crate::Result<Metadata> {
        fs::symlink_metadata(path).map_err(|err| CoreError::io(path, err))
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn open(&self, path: &Path) -> crate::Result<Box<dyn Read>> {
        let file = fs::File::open(path).map_err(|err| CoreError::io(path, err))?;
        Ok(Box::new(file))
    }

    fn append(&self, path: &Path, data: &[u8]) -> crate::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| CoreError::io(path, err))?;
        file.write_all(data).map_err(|err| CoreError::io(path, err))
    }

    fn write(&self, path: &Path, data: &[u8]) -> crate::Result<()> {
        fs::write(path, data).map_err(|err| CoreError::io(path, err))
    }

    fn read(&self, path: &Path) -> crate::Result<Vec<u8>> {
        fs::read(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        fs::rename(from, to).map_err(|err| CoreError::io(from, err))
    }

    fn move_path(&self, from: &Path, to: &Path) -> crate::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if is_cross_device(&err) => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "rename crossed devices, copying instead"
                );
                copy_tree(from, to).map_err(|err| CoreError::io(to, err))?;
                remove_tree(from).map_err(|err| CoreError::io(from, err))
            }
            Err(err) => Err(CoreError::io(from, err)),
        }
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .map_err(|err| CoreError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| CoreError::io(path, err))
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Copies a file, symlink or directory tree without following symlinks.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    let mut directories = Vec::new();

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let target = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else if file_type.is_dir() {
            fs::create_dir(&target)?;
            directories.push((target, entry.metadata()?.permissions()));
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    // Read-only directories only get their mode once their children exist.
    for (directory, permissions) in directories.into_iter().rev() {
        fs::set_permissions(directory, permissions)?;
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, _to: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot copy symlink {} across volumes", from.display()),
    ))
}

fn remove_tree(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
