//! Content- and time-derived names for trashed objects.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

use crate::errors::CoreError;
use crate::fs::FileSystem;

/// Read size used while hashing file contents.
pub const CHUNK_SIZE: usize = 4096;

/// Derives the store name for `path` deleted at `deleted_at`.
///
/// `sha256(hex(sha256(content)) + hex(sha256(deleted_at)))`, followed by the
/// original extension for regular files. Directories and symlinks hash as
/// empty content and keep no extension.
pub fn generate_identifier<F>(fs: &F, path: &Path, deleted_at: &str) -> crate::Result<String>
where
    F: FileSystem + ?Sized,
{
    let is_file = fs.symlink_metadata(path)?.is_file();

    let content_hash = if is_file {
        hash_file(fs, path)?
    } else {
        format!("{:x}", Sha256::new().finalize())
    };
    let time_hash = hash_bytes(deleted_at.as_bytes());

    let mut identifier = hash_bytes(format!("{content_hash}{time_hash}").as_bytes());
    if is_file {
        if let Some(extension) = path.extension() {
            identifier.push('.');
            identifier.push_str(&extension.to_string_lossy());
        }
    }
    Ok(identifier)
}

fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

fn hash_file<F>(fs: &F, path: &Path) -> crate::Result<String>
where
    F: FileSystem + ?Sized,
{
    let mut reader = fs.open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|err| CoreError::io(path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
