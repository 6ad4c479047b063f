//! reqwest client for the analysis endpoint

use super::{AnalysisFailure, AnalysisReply, AnalysisRequest, AnalysisService};
use crate::config::AnalysisConfig;
use crate::{FarmerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP implementation of [`AnalysisService`]
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
            timeout: None,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        let client = Self::new(config.base_url.clone());
        match config.timeout_secs {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => client,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let started = Instant::now();
        debug!(
            "POST {} (image: {} bytes, question: {} chars)",
            self.endpoint,
            request.image_data.len(),
            request.text_query.chars().count()
        );

        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<AnalysisFailure>(&body)
                .map(|failure| failure.detail_text())
                .unwrap_or_else(|_| body.chars().take(200).collect());
            warn!("Analysis endpoint returned {}: {}", status, detail);
            return Err(FarmerError::EndpointError {
                status: status.as_u16(),
                detail,
            });
        }

        let reply: AnalysisReply = serde_json::from_str(&body)?;
        info!(
            "Analysis completed in {}ms ({} chars)",
            started.elapsed().as_millis(),
            reply.analysis.len()
        );

        Ok(reply.analysis)
    }
}
