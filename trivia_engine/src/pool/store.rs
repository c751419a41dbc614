//! JSON record files with atomic replacement.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::errors::PoolResult;

/// A JSON file holding an array of records.
///
/// The whole set is read on [`load`](Self::load) and rewritten on
/// [`save`](Self::save). Saving writes a temporary sibling first and renames
/// it over the target, so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct JsonRecordStore<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> JsonRecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record.
    ///
    /// A missing or blank file is an empty set.
    pub fn load(&self) -> PoolResult<Vec<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the file contents with `records`.
    pub fn save(&self, records: &[T]) -> PoolResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(records)?;

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        log::debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "records".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
