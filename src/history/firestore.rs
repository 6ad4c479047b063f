use super::{HistoryPage, HistoryRecord, HistoryStore, NewHistoryRecord, QuarantinedDocument};
use crate::store::{FieldValue, FirestoreClient, RawDocument};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

const FIELD_OWNER: &str = "userId";
const FIELD_IMAGE: &str = "image";
const FIELD_QUESTION: &str = "question";
const FIELD_RESULT: &str = "result";
const FIELD_CREATED_AT: &str = "createdAt";

/// History records kept in a Firestore collection
#[derive(Clone)]
pub struct FirestoreHistoryStore {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreHistoryStore {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }
}

/// Validate a stored document and coerce it into a record
pub fn record_from_document(doc: &RawDocument) -> std::result::Result<HistoryRecord, QuarantinedDocument> {
    let quarantine = |reason: String| QuarantinedDocument {
        id: doc.id().to_string(),
        reason,
    };

    let owner_id = doc
        .string_field(FIELD_OWNER)
        .map_err(quarantine)?
        .filter(|o| !o.is_empty())
        .ok_or_else(|| quarantine(format!("missing `{}`", FIELD_OWNER)))?;

    let result_text = doc
        .string_field(FIELD_RESULT)
        .map_err(quarantine)?
        .ok_or_else(|| quarantine(format!("missing `{}`", FIELD_RESULT)))?;

    // Pending server timestamps are absent on freshly committed documents
    let created_at = doc
        .timestamp_field(FIELD_CREATED_AT)
        .map_err(quarantine)?
        .ok_or_else(|| quarantine(format!("missing `{}`", FIELD_CREATED_AT)))?;

    let image_payload = doc
        .string_field(FIELD_IMAGE)
        .map_err(quarantine)?
        .filter(|i| !i.is_empty());
    let question_text = doc
        .string_field(FIELD_QUESTION)
        .map_err(quarantine)?
        .filter(|q| !q.trim().is_empty());

    Ok(HistoryRecord {
        id: doc.id().to_string(),
        owner_id,
        image_payload,
        question_text,
        result_text,
        created_at,
    })
}

#[async_trait]
impl HistoryStore for FirestoreHistoryStore {
    async fn append(&self, record: NewHistoryRecord) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();

        let mut fields = BTreeMap::new();
        fields.insert(FIELD_OWNER.to_string(), FieldValue::string(record.owner_id));
        fields.insert(
            FIELD_IMAGE.to_string(),
            FieldValue::optional_string(record.image_payload),
        );
        fields.insert(
            FIELD_QUESTION.to_string(),
            FieldValue::optional_string(record.question_text),
        );
        fields.insert(FIELD_RESULT.to_string(), FieldValue::string(record.result_text));

        self.client
            .write(&self.collection, &id, fields, Some(FIELD_CREATED_AT), true)
            .await?;

        info!("History record {} stored", id);
        Ok(id)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<HistoryPage> {
        let documents = self
            .client
            .query_equal(&self.collection, FIELD_OWNER, owner_id, FIELD_CREATED_AT)
            .await?;

        Ok(HistoryPage::from_candidates(
            owner_id,
            documents.iter().map(record_from_document),
        ))
    }
}
