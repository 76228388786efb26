//! Utilities for file operations with automatic parent directory creation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Write a file atomically, creating parent directories as needed.
///
/// The content goes to a temporary file in the destination directory, which
/// is synced and then renamed over `path`. Readers see either the old file or
/// the complete new one, never a partial write.
///
/// # Arguments
/// * `path` - Path to the file to write
/// * `content` - Content to write (anything that implements AsRef<[u8]>)
pub fn write_file_atomic<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_ref())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
