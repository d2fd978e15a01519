use std::fs::create_dir_all;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::error;

use crate::FileError;

fn path_error(
    path: &Path,
    source: std::io::Error,
) -> FileError {
    FileError::PathError {
        path: path.to_path_buf(),
        source,
    }
}

pub fn create_parent_dir_if_not_exist(path: &Path) -> Result<(), FileError> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.exists() {
            if let Err(e) = create_dir_all(parent_dir) {
                error!("Failed to create directory {:?}: {:?}", parent_dir, e);
                return Err(path_error(parent_dir, e));
            }
        }
    }
    Ok(())
}

pub fn open_file_for_append(path: &Path) -> Result<File, FileError> {
    create_parent_dir_if_not_exist(path)?;
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| path_error(path, e))
}

/// Reads a whole file, or `None` if it does not exist.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, FileError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(path_error(path, e)),
    }
}

/// Replaces `path` with `bytes` via a sibling temp file and a rename, so a
/// reader never sees a half-written file.
pub fn write_atomically(
    path: &Path,
    bytes: &[u8],
) -> Result<(), FileError> {
    create_parent_dir_if_not_exist(path)?;

    let tmp = tmp_path(path);
    let write = || -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    };

    write().map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        path_error(path, e)
    })?;
    debug!("wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

/// Removes `path`; a missing file is not an error.
pub fn delete_file(path: &Path) -> Result<(), FileError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(path_error(path, e)),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
