//! Remote diagnosis endpoint
//!
//! The endpoint takes an optional base64 image and an optional question and
//! answers with free text.

pub mod client;

pub use client::HttpAnalysisClient;

use crate::capture::CaptureDraft;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `POST /analyze`.
///
/// Absent parts are sent as empty strings; the server rejects nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub image_data: String,
    pub text_query: String,
}

impl AnalysisRequest {
    pub fn new(image_data: Option<&str>, text_query: Option<&str>) -> Self {
        Self {
            image_data: image_data.unwrap_or_default().to_string(),
            text_query: text_query.map(str::trim).unwrap_or_default().to_string(),
        }
    }

    pub fn from_draft(draft: &CaptureDraft) -> Self {
        Self::new(draft.image_payload.as_deref(), Some(draft.question_text.as_str()))
    }

    pub fn has_image(&self) -> bool {
        !self.image_data.is_empty()
    }

    pub fn has_question(&self) -> bool {
        !self.text_query.trim().is_empty()
    }

    /// Nothing to analyze
    pub fn is_empty(&self) -> bool {
        !self.has_image() && !self.has_question()
    }
}

/// Successful response body
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisReply {
    pub analysis: String,
}

/// Failure response body; FastAPI sends either a string or a list of issues
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisFailure {
    pub detail: serde_json::Value,
}

impl AnalysisFailure {
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Anything that can turn a request into a diagnosis
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Returns the `analysis` text of a 2xx response
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;
}
