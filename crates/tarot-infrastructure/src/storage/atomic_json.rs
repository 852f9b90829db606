//! Atomic JSON file operations.
//!
//! Updates are all-or-nothing: data goes to a temporary file in the same
//! directory, is fsynced, then renamed over the target.

use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tarot_core::Result;
use tokio::io::AsyncWriteExt;

/// A handle to one JSON file holding a `T`.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file.
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub async fn load(&self) -> Result<Option<T>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Saves data atomically via tmp file + rename.
    pub async fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp_path = self.temp_path();
        let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
        tmp_file.write_all(json.as_bytes()).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Deletes the file. Returns whether it existed.
    pub async fn remove(&self) -> Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_missing_and_empty_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let file: AtomicJsonFile<BTreeMap<String, String>> =
            AtomicJsonFile::new(dir.path().join("draft.json"));
        assert!(file.load().await.unwrap().is_none());

        std::fs::write(file.path(), "  \n").unwrap();
        assert!(file.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("draft.json");
        let file = AtomicJsonFile::new(path.clone());
        let data = BTreeMap::from([("tarot_cardIds".to_string(), "3,7".to_string())]);

        file.save(&data).await.unwrap();
        assert_eq!(file.load().await.unwrap(), Some(data));
        assert!(!path.with_file_name("draft.json.tmp").exists());

        assert!(file.remove().await.unwrap());
        assert!(!file.remove().await.unwrap());
    }
}
