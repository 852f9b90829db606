//! In-memory resume store.
//!
//! Drafts are lost on restart. Used by `--memory-store` and in tests.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tarot_core::Result;
use tarot_core::resume::{ResumeEntries, ResumeStore};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryResumeStore {
    drafts: RwLock<HashMap<String, (ResumeEntries, Instant)>>,
    claimed: RwLock<HashMap<String, Instant>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drafts currently held.
    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.drafts.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn save(&self, resume_id: &str, entries: &ResumeEntries) -> Result<()> {
        self.drafts
            .write()
            .await
            .insert(resume_id.to_string(), (entries.clone(), Instant::now()));
        Ok(())
    }

    async fn take(&self, resume_id: &str) -> Result<Option<ResumeEntries>> {
        Ok(self
            .drafts
            .write()
            .await
            .remove(resume_id)
            .map(|(entries, _)| entries))
    }

    async fn remove(&self, resume_id: &str) -> Result<()> {
        self.drafts.write().await.remove(resume_id);
        Ok(())
    }

    async fn claim_session(&self, session_id: &str) -> Result<bool> {
        let mut claimed = self.claimed.write().await;
        if claimed.contains_key(session_id) {
            return Ok(false);
        }
        claimed.insert(session_id.to_string(), Instant::now());
        Ok(true)
    }

    async fn purge_older_than(&self, max_age: Duration) -> Result<usize> {
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        drafts.retain(|_, (_, saved)| saved.elapsed() < max_age);
        let mut removed = before - drafts.len();

        let mut claimed = self.claimed.write().await;
        let before = claimed.len();
        claimed.retain(|_, at| at.elapsed() < max_age);
        removed += before - claimed.len();
        Ok(removed)
    }
}
