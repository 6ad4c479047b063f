//! Per-user analysis history
//!
//! Records are created once per successful analysis and never changed
//! afterwards. Reads are always scoped to one owner and ordered newest first.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreHistoryStore;
pub use memory::InMemoryHistoryStore;

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Title shown for records that carry no question
pub const IMAGE_ONLY_TITLE: &str = "Binciken Hoto";

/// Persisted record of one completed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub owner_id: String,
    /// Inline data URI
    pub image_payload: Option<String>,
    pub question_text: Option<String>,
    pub result_text: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn has_image(&self) -> bool {
        self.image_payload.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// List title: the question, or a placeholder for image-only analyses
    pub fn title(&self) -> &str {
        self.question_text
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(IMAGE_ONLY_TITLE)
    }

    /// First `max_chars` characters of the result, with an ellipsis when cut
    pub fn snippet(&self, max_chars: usize) -> String {
        let mut chars = self.result_text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}…", head.trim_end())
        } else {
            head
        }
    }
}

/// A record about to be written; id and timestamp come from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub owner_id: String,
    pub image_payload: Option<String>,
    pub question_text: Option<String>,
    pub result_text: String,
}

/// A stored document that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedDocument {
    pub id: String,
    pub reason: String,
}

/// Result of one history query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    /// Newest first, all owned by the queried user
    pub records: Vec<HistoryRecord>,
    pub quarantined: Vec<QuarantinedDocument>,
}

impl HistoryPage {
    /// Build a page from ingested documents, enforcing owner scope and order
    pub fn from_candidates<I>(owner_id: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<HistoryRecord, QuarantinedDocument>>,
    {
        let mut page = HistoryPage::default();

        for candidate in candidates {
            match candidate {
                Ok(record) if record.owner_id == owner_id => page.records.push(record),
                Ok(record) => page.quarantined.push(QuarantinedDocument {
                    id: record.id,
                    reason: "owner mismatch".to_string(),
                }),
                Err(doc) => page.quarantined.push(doc),
            }
        }

        for doc in &page.quarantined {
            warn!("Quarantined history document {}: {}", doc.id, doc.reason);
        }

        sort_newest_first(&mut page.records);
        page
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Descending by creation time; stable for equal timestamps
pub fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Remote (or local) home of history records
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Write a record; returns the store-assigned id
    async fn append(&self, record: NewHistoryRecord) -> Result<String>;

    /// Records owned by `owner_id`, newest first
    async fn list_for_owner(&self, owner_id: &str) -> Result<HistoryPage>;
}
