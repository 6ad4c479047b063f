use super::{HistoryPage, HistoryRecord, HistoryStore, NewHistoryRecord};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Process-local history store, used offline and in tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<Vec<HistoryRecord>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fully-formed record (explicit id and timestamp)
    pub fn insert(&self, record: HistoryRecord) {
        self.records.write().push(record);
    }

    pub fn all(&self) -> Vec<HistoryRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, record: NewHistoryRecord) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.records.write().push(HistoryRecord {
            id: id.clone(),
            owner_id: record.owner_id,
            image_payload: record.image_payload,
            question_text: record.question_text,
            result_text: record.result_text,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<HistoryPage> {
        let owned: Vec<_> = self
            .records
            .read()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .map(Ok)
            .collect();
        Ok(HistoryPage::from_candidates(owner_id, owned))
    }
}
