use std::path::Path;
use std::path::PathBuf;

use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;

use crate::utils::file_io::delete_file;
use crate::utils::file_io::read_if_exists;
use crate::utils::file_io::write_atomically;
use crate::HistoryError;
use crate::HistoryRecord;

/// Persistence for history lists, keyed by `history/{entryKey}`
#[cfg_attr(test, automock)]
pub trait HistoryStore: Send + Sync + 'static {
    /// Stored list, or an empty one if nothing is stored under `storage_key`.
    fn load(
        &self,
        storage_key: &str,
    ) -> Result<Vec<HistoryRecord>, HistoryError>;

    fn save(
        &self,
        storage_key: &str,
        records: &[HistoryRecord],
    ) -> Result<(), HistoryError>;

    fn remove(
        &self,
        storage_key: &str,
    ) -> Result<(), HistoryError>;
}

/// Process-local store; history is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    lists: DashMap<String, Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(
        &self,
        storage_key: &str,
    ) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(self.lists.get(storage_key).map(|l| l.clone()).unwrap_or_default())
    }

    fn save(
        &self,
        storage_key: &str,
        records: &[HistoryRecord],
    ) -> Result<(), HistoryError> {
        self.lists.insert(storage_key.to_string(), records.to_vec());
        Ok(())
    }

    fn remove(
        &self,
        storage_key: &str,
    ) -> Result<(), HistoryError> {
        self.lists.remove(storage_key);
        Ok(())
    }
}

/// One JSON file per list under `dir`
///
/// File names are the percent-encoded storage key plus `.json`, so
/// `history//Shooter/RPM` lands in `history%2F%2FShooter%2FRPM.json`.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(
        &self,
        storage_key: &str,
    ) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(storage_key)))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(
        &self,
        storage_key: &str,
    ) -> Result<Vec<HistoryRecord>, HistoryError> {
        let path = self.path_for(storage_key);
        match read_if_exists(&path)? {
            None => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| HistoryError::Corrupt { path, source }),
        }
    }

    fn save(
        &self,
        storage_key: &str,
        records: &[HistoryRecord],
    ) -> Result<(), HistoryError> {
        let bytes = serde_json::to_vec(records)?;
        write_atomically(&self.path_for(storage_key), &bytes)?;
        Ok(())
    }

    fn remove(
        &self,
        storage_key: &str,
    ) -> Result<(), HistoryError> {
        delete_file(&self.path_for(storage_key))?;
        Ok(())
    }
}
