//! Async driver of the capture flow
//!
//! Owns the side effects around [`CaptureFlow`]: the picker, the analysis
//! call, the history write and narration. The flow lock is never held
//! across an await.

use super::draft::ImageSource;
use super::flow::{CaptureFlow, FlowSnapshot, SubmitTicket};
use super::picker::ImagePicker;
use crate::analysis::AnalysisService;
use crate::history::{HistoryStore, NewHistoryRecord};
use crate::session::SessionReader;
use crate::speech::{NarrationOptions, Narrator};
use crate::{FarmerError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// External capabilities the capture flow depends on
#[derive(Clone)]
pub struct CaptureServices {
    pub analysis: Arc<dyn AnalysisService>,
    pub history: Arc<dyn HistoryStore>,
    pub narrator: Arc<dyn Narrator>,
    pub picker: Arc<dyn ImagePicker>,
}

/// What a successful submission produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub request_id: Uuid,
    pub result_text: String,
    /// Id of the history record, when the write succeeded
    pub record_id: Option<String>,
}

/// A submission the endpoint has answered; its side effects are pending
#[derive(Debug)]
pub struct AnsweredSubmission {
    ticket: SubmitTicket,
    pub result_text: String,
}

#[derive(Clone)]
pub struct CaptureController {
    flow: Arc<Mutex<CaptureFlow>>,
    services: CaptureServices,
    session: SessionReader,
    narration: NarrationOptions,
}

impl CaptureController {
    pub fn new(services: CaptureServices, session: SessionReader) -> Self {
        Self {
            flow: Arc::new(Mutex::new(CaptureFlow::new())),
            services,
            session,
            narration: NarrationOptions::default(),
        }
    }

    pub fn with_narration(mut self, options: NarrationOptions) -> Self {
        self.narration = options;
        self
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.flow.lock().snapshot()
    }

    /// Ask the picker for an image. Cancellation leaves the flow unchanged.
    pub async fn pick(&self, source: ImageSource) -> Result<bool> {
        self.flow.lock().ensure_not_submitting("pick an image")?;

        let picked = self.services.picker.pick(source).await;

        let mut flow = self.flow.lock();
        match picked {
            Ok(Some(image)) => {
                flow.image_picked(image)?;
                Ok(true)
            }
            Ok(None) => {
                flow.pick_cancelled();
                Ok(false)
            }
            Err(e) => {
                warn!("Image pick from {} failed: {}", source, e);
                flow.record_error(e.clone());
                Err(e)
            }
        }
    }

    pub fn present(&self) -> Result<()> {
        self.flow.lock().present()
    }

    pub fn retake(&self) -> Result<()> {
        self.flow.lock().retake()
    }

    pub fn set_question(&self, text: impl Into<String>) -> Result<()> {
        self.flow.lock().set_question(text)
    }

    pub fn dismiss(&self) -> Result<()> {
        self.flow.lock().dismiss()
    }

    pub fn discard(&self) -> Result<()> {
        self.flow.lock().discard()
    }

    pub fn acknowledge_error(&self) {
        self.flow.lock().acknowledge_error();
    }

    /// Validate and enter `Submitting`; no network traffic yet
    pub fn begin_submit(&self) -> Result<SubmitTicket> {
        let ticket = self.flow.lock().begin_submit()?;
        info!(
            "Submission {} started (image: {}, question: {})",
            ticket.request_id,
            ticket.request.has_image(),
            ticket.request.has_question()
        );
        Ok(ticket)
    }

    /// Send a started submission to the analysis endpoint.
    ///
    /// On return the flow has already left `Submitting`: `ResultReady` on
    /// success, the pre-submit state on failure. The history write and
    /// narration are left to [`CaptureController::follow_up`].
    pub async fn analyze(&self, ticket: SubmitTicket) -> Result<AnsweredSubmission> {
        let started = Instant::now();
        let analyzed = self.services.analysis.analyze(&ticket.request).await;

        let result_text = match analyzed {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Submission {} failed after {}ms: {}",
                    ticket.request_id,
                    started.elapsed().as_millis(),
                    e
                );
                self.flow.lock().complete_failure(&ticket, e.clone())?;
                return Err(e);
            }
        };

        self.flow
            .lock()
            .complete_success(&ticket, result_text.clone())?;
        info!(
            "Submission {} answered in {}ms",
            ticket.request_id,
            started.elapsed().as_millis()
        );

        Ok(AnsweredSubmission {
            ticket,
            result_text,
        })
    }

    /// History write and narration for an answered submission.
    ///
    /// Both run concurrently and neither can fail the submission.
    pub async fn follow_up(&self, answered: AnsweredSubmission) -> SubmitOutcome {
        let AnsweredSubmission {
            ticket,
            result_text,
        } = answered;

        let (record_id, narrated) = tokio::join!(
            self.persist(&ticket, &result_text),
            self.services.narrator.narrate(&result_text, &self.narration)
        );

        if let Err(e) = narrated {
            warn!("Narration for {} failed: {}", ticket.request_id, e);
        }

        SubmitOutcome {
            request_id: ticket.request_id,
            result_text,
            record_id,
        }
    }

    /// Carry a started submission to completion, follow-up included
    pub async fn run_submission(&self, ticket: SubmitTicket) -> Result<SubmitOutcome> {
        let answered = self.analyze(ticket).await?;
        Ok(self.follow_up(answered).await)
    }

    /// Validate, then run the whole submission
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let ticket = self.begin_submit()?;
        self.run_submission(ticket).await
    }

    /// Speak the current result again
    pub async fn replay(&self) -> Result<()> {
        let text = self.flow.lock().result_text().map(str::to_string);
        match text {
            Some(text) => self.services.narrator.narrate(&text, &self.narration).await,
            None => Err(FarmerError::InvalidTransition(
                "no result to narrate".into(),
            )),
        }
    }

    /// Best-effort history write; failures are logged and swallowed
    async fn persist(&self, ticket: &SubmitTicket, result_text: &str) -> Option<String> {
        let Some(session) = self.session.current() else {
            warn!(
                "No session for submission {}; history record not written",
                ticket.request_id
            );
            return None;
        };

        let record = NewHistoryRecord {
            owner_id: session.user_id,
            image_payload: ticket.image_data_uri.clone(),
            question_text: ticket.question.clone(),
            result_text: result_text.to_string(),
        };

        match self.services.history.append(record).await {
            Ok(id) => {
                debug!("History record {} written for {}", id, ticket.request_id);
                Some(id)
            }
            Err(e) => {
                warn!(
                    "History write for submission {} failed: {}",
                    ticket.request_id, e
                );
                None
            }
        }
    }
}
