//! File-backed resume store.
//!
//! Each draft is a JSON object of storage keys in `resume/<resume_id>.json`.
//! Claimed checkout sessions are marker files in `resume/claimed/`, created
//! with `create_new` so two concurrent claims cannot both succeed.

use crate::paths::TarotPaths;
use crate::storage::AtomicJsonFile;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tarot_core::resume::{ResumeEntries, ResumeStore};
use tarot_core::{Result, TarotError};
use tokio::sync::Mutex;

pub struct FileResumeStore {
    resume_dir: PathBuf,
    claimed_dir: PathBuf,
    /// Serialises take/remove so a draft is handed out at most once.
    lock: Mutex<()>,
}

impl FileResumeStore {
    pub fn new(paths: &TarotPaths) -> Self {
        Self {
            resume_dir: paths.resume_dir(),
            claimed_dir: paths.claimed_dir(),
            lock: Mutex::new(()),
        }
    }

    fn draft_file(&self, resume_id: &str) -> Result<AtomicJsonFile<ResumeEntries>> {
        let id = checked_id(resume_id, "resume id")?;
        Ok(AtomicJsonFile::new(
            self.resume_dir.join(format!("{}.json", id)),
        ))
    }
}

/// Removes regular files in `dir` last modified at least `max_age` ago.
/// A missing directory holds nothing to remove.
async fn purge_dir(dir: &Path, max_age: Duration, extension: Option<&str>) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(ext) = extension {
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let age = now
            .duration_since(metadata.modified()?)
            .unwrap_or_default();
        if age >= max_age {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(removed)
}

/// Ids become file names; only ASCII alphanumerics, `-` and `_` are allowed.
fn checked_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let valid = !id.is_empty()
        && id.len() <= 200
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(TarotError::validation(format!("Invalid {}", what)))
    }
}

#[async_trait::async_trait]
impl ResumeStore for FileResumeStore {
    async fn save(&self, resume_id: &str, entries: &ResumeEntries) -> Result<()> {
        let file = self.draft_file(resume_id)?;
        let _guard = self.lock.lock().await;
        file.save(entries).await?;
        tracing::debug!("[ResumeStore] Saved draft {}", resume_id);
        Ok(())
    }

    async fn take(&self, resume_id: &str) -> Result<Option<ResumeEntries>> {
        let file = self.draft_file(resume_id)?;
        let _guard = self.lock.lock().await;
        let entries = file.load().await?;
        if entries.is_some() {
            file.remove().await?;
            tracing::debug!("[ResumeStore] Took draft {}", resume_id);
        }
        Ok(entries)
    }

    async fn remove(&self, resume_id: &str) -> Result<()> {
        let file = self.draft_file(resume_id)?;
        let _guard = self.lock.lock().await;
        file.remove().await?;
        Ok(())
    }

    async fn claim_session(&self, session_id: &str) -> Result<bool> {
        let id = checked_id(session_id, "session id")?;
        tokio::fs::create_dir_all(&self.claimed_dir).await?;
        let marker = self.claimed_dir.join(id);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&marker)
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn purge_older_than(&self, max_age: Duration) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let drafts = purge_dir(&self.resume_dir, max_age, Some("json")).await?;
        let claims = purge_dir(&self.claimed_dir, max_age, None).await?;
        if drafts + claims > 0 {
            tracing::info!(
                "[ResumeStore] Purged {} stale draft(s) and {} claim(s)",
                drafts,
                claims
            );
        }
        Ok(drafts + claims)
    }
}
