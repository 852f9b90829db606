//! Carrying an in-progress reading across the checkout redirect.
//!
//! Before redirecting to checkout, the session is written to a [`ResumeStore`]
//! under a generated resume id; only that id travels through the payment
//! provider. On return the draft is taken (read and cleared) and merged with
//! whatever the return URL still carries, URL fields winning.

use crate::error::Result;
use crate::spread::SpreadType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const QUESTION_KEY: &str = "tarot_question";
pub const USER_INFO_KEY: &str = "tarot_userInfo";
pub const CARD_IDS_KEY: &str = "tarot_cardIds";
pub const READING_TYPE_KEY: &str = "tarot_readingType";

/// Stored key/value entries for one resume id.
pub type ResumeEntries = BTreeMap<String, String>;

/// The parts of a session that survive the redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDraft {
    pub question: String,
    pub user_info: String,
    pub spread_type: SpreadType,
    pub card_ids: Vec<u8>,
}

impl ResumeDraft {
    /// Flattens the draft into storage entries.
    pub fn to_entries(&self) -> ResumeEntries {
        let mut entries = ResumeEntries::new();
        entries.insert(QUESTION_KEY.to_string(), self.question.clone());
        entries.insert(USER_INFO_KEY.to_string(), self.user_info.clone());
        entries.insert(CARD_IDS_KEY.to_string(), join_card_ids(&self.card_ids));
        entries.insert(
            READING_TYPE_KEY.to_string(),
            self.spread_type.as_str().to_string(),
        );
        entries
    }
}

/// A draft with any field possibly missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialDraft {
    pub question: Option<String>,
    pub user_info: Option<String>,
    pub spread_type: Option<SpreadType>,
    pub card_ids: Option<Vec<u8>>,
}

impl PartialDraft {
    /// Reads whatever storage entries are present. Empty values count as absent.
    pub fn from_entries(entries: &ResumeEntries) -> Self {
        let get = |key: &str| {
            entries
                .get(key)
                .map(|v| v.to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            question: get(QUESTION_KEY),
            user_info: get(USER_INFO_KEY),
            spread_type: get(READING_TYPE_KEY).and_then(|v| v.parse().ok()),
            card_ids: get(CARD_IDS_KEY)
                .map(|v| parse_card_ids(&v))
                .filter(|ids| !ids.is_empty()),
        }
    }

    /// Field-wise merge; `self` wins where both are present.
    pub fn or(self, fallback: PartialDraft) -> PartialDraft {
        PartialDraft {
            question: self.question.or(fallback.question),
            user_info: self.user_info.or(fallback.user_info),
            spread_type: self.spread_type.or(fallback.spread_type),
            card_ids: self.card_ids.or(fallback.card_ids),
        }
    }

    /// Completes the draft. Without card ids there is nothing to resume.
    pub fn into_draft(self) -> Option<ResumeDraft> {
        let card_ids = self.card_ids?;
        Some(ResumeDraft {
            question: self.question.unwrap_or_default(),
            user_info: self.user_info.unwrap_or_default(),
            spread_type: self.spread_type.unwrap_or_default(),
            card_ids,
        })
    }
}

/// Query parameters of the resume URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeParams {
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_reading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(rename = "readingType", default, skip_serializing_if = "Option::is_none")]
    pub reading_type: Option<String>,
    #[serde(rename = "cardIds", default, skip_serializing_if = "Option::is_none")]
    pub card_ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(rename = "userInfo", default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<String>,
}

impl ResumeParams {
    /// `continue=true` was passed.
    pub fn wants_continue(&self) -> bool {
        self.continue_reading
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Non-empty checkout session id, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Non-empty resume id, if any.
    pub fn resume_id(&self) -> Option<&str> {
        self.resume_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Fields carried directly on the URL.
    pub fn to_partial(&self) -> PartialDraft {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        PartialDraft {
            question: non_empty(&self.question),
            user_info: non_empty(&self.user_info),
            spread_type: self.reading_type.as_deref().and_then(|v| v.parse().ok()),
            card_ids: self
                .card_ids
                .as_deref()
                .map(parse_card_ids)
                .filter(|ids| !ids.is_empty()),
        }
    }
}

/// Fresh correlation id for a draft awaiting payment.
pub fn new_resume_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parses `"3,7"` into `[3, 7]`, skipping anything that is not a card number.
pub fn parse_card_ids(value: &str) -> Vec<u8> {
    value
        .split(',')
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .collect()
}

pub fn join_card_ids(ids: &[u8]) -> String {
    ids.iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Durable storage for drafts awaiting payment.
#[async_trait::async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores the draft's entries under `resume_id`, replacing earlier ones.
    async fn save(&self, resume_id: &str, entries: &ResumeEntries) -> Result<()>;

    /// Returns and clears the entries under `resume_id`.
    async fn take(&self, resume_id: &str) -> Result<Option<ResumeEntries>>;

    /// Clears the entries under `resume_id` if present.
    async fn remove(&self, resume_id: &str) -> Result<()>;

    /// Records that a checkout session has been resumed.
    ///
    /// Returns `false` when the session had already been claimed.
    async fn claim_session(&self, session_id: &str) -> Result<bool>;

    /// Drops drafts and session claims older than `max_age`.
    ///
    /// Returns how many records were removed.
    async fn purge_older_than(&self, max_age: Duration) -> Result<usize>;
}
