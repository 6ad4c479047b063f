//! Minimal Firestore REST v1 client: commit writes and structured queries

use crate::config::FirebaseConfig;
use crate::session::SessionReader;
use crate::{FarmerError, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A typed Firestore field value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    NullValue(()),
    BooleanValue(bool),
    /// Firestore encodes 64-bit integers as strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
}

impl FieldValue {
    pub fn string(value: impl Into<String>) -> Self {
        FieldValue::StringValue(value.into())
    }

    /// String value, or null when absent
    pub fn optional_string(value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => FieldValue::StringValue(v.into()),
            None => FieldValue::NullValue(()),
        }
    }
}

/// A document as returned by the REST API
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    pub create_time: Option<String>,
}

impl RawDocument {
    /// Last segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// `Ok(None)` when missing or null; `Err` on any other type
    pub fn string_field(&self, key: &str) -> std::result::Result<Option<String>, String> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(value) => match serde_json::from_value::<FieldValue>(value.clone()) {
                Ok(FieldValue::StringValue(s)) => Ok(Some(s)),
                Ok(FieldValue::NullValue(())) => Ok(None),
                _ => Err(format!("field `{}` is not a string", key)),
            },
        }
    }

    /// `Ok(None)` when missing or null; `Err` on any other type
    pub fn timestamp_field(&self, key: &str) -> std::result::Result<Option<DateTime<Utc>>, String> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(value) => match serde_json::from_value::<FieldValue>(value.clone()) {
                Ok(FieldValue::TimestampValue(ts)) => DateTime::parse_from_rfc3339(&ts)
                    .map(|t| Some(t.with_timezone(&Utc)))
                    .map_err(|e| format!("field `{}` is not a valid timestamp: {}", key, e)),
                Ok(FieldValue::NullValue(())) => Ok(None),
                _ => Err(format!("field `{}` is not a timestamp", key)),
            },
        }
    }
}

#[derive(Deserialize)]
struct QueryResult {
    document: Option<RawDocument>,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Authenticated Firestore access for the current session
#[derive(Clone)]
pub struct FirestoreClient {
    client: Client,
    /// `projects/<id>/databases/(default)/documents`
    root: String,
    base_url: String,
    session: SessionReader,
}

impl FirestoreClient {
    pub fn new(config: &FirebaseConfig, session: SessionReader) -> Self {
        Self {
            client: Client::new(),
            root: format!("projects/{}/databases/(default)/documents", config.project_id),
            base_url: config.firestore_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Full resource name of a document
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.root, collection, id)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1/{}:{}", self.base_url, self.root, method)
    }

    fn bearer(&self) -> Result<String> {
        self.session
            .current()
            .and_then(|s| s.id_token)
            .ok_or(FarmerError::NotSignedIn)
    }

    /// Write a document in one commit.
    ///
    /// `server_timestamp` names a field set to the commit time by the server.
    /// With `must_not_exist` the commit fails if the document is already there.
    pub async fn write(
        &self,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, FieldValue>,
        server_timestamp: Option<&str>,
        must_not_exist: bool,
    ) -> Result<()> {
        let token = self.bearer()?;
        self.write_as(&token, collection, id, fields, server_timestamp, must_not_exist)
            .await
    }

    /// [`Self::write`] with an explicit id token, for writes made before the
    /// session is published (e.g. the profile created at registration)
    pub async fn write_as(
        &self,
        id_token: &str,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, FieldValue>,
        server_timestamp: Option<&str>,
        must_not_exist: bool,
    ) -> Result<()> {
        let mut write = json!({
            "update": {
                "name": self.document_name(collection, id),
                "fields": fields,
            }
        });
        if let Some(field) = server_timestamp {
            write["updateTransforms"] = json!([
                { "fieldPath": field, "setToServerValue": "REQUEST_TIME" }
            ]);
        }
        if must_not_exist {
            write["currentDocument"] = json!({ "exists": false });
        }

        let body = json!({ "writes": [write] });
        debug!("Firestore commit {}/{}", collection, id);
        self.post(id_token, "commit", &body).await?;
        Ok(())
    }

    /// Documents of `collection` where `field == value`, ordered by
    /// `order_by` descending
    pub async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        order_by: &str,
    ) -> Result<Vec<RawDocument>> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": FieldValue::string(value),
                    }
                },
                "orderBy": [{
                    "field": { "fieldPath": order_by },
                    "direction": "DESCENDING",
                }],
            }
        });

        let token = self.bearer()?;
        let raw = self.post(&token, "runQuery", &body).await?;
        let results: Vec<QueryResult> = serde_json::from_value(raw)?;
        let documents: Vec<RawDocument> = results.into_iter().filter_map(|r| r.document).collect();
        debug!("Firestore query on {} returned {} documents", collection, documents.len());
        Ok(documents)
    }

    async fn post(&self, id_token: &str, method: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint(method))
            .bearer_auth(id_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        let message = serde_json::from_str::<GoogleErrorBody>(&text)
            .map(|b| format!("{} {}", b.error.status, b.error.message))
            .unwrap_or_else(|_| text.chars().take(200).collect());
        warn!("Firestore {} returned {}: {}", method, status, message.trim());

        Err(match status {
            StatusCode::UNAUTHORIZED => FarmerError::NotSignedIn,
            _ => FarmerError::StoreError(format!("HTTP {}: {}", status.as_u16(), message.trim())),
        })
    }
}
