//! Capture flow state machine
//!
//! Pure state: no I/O happens here. The controller performs the network,
//! storage and narration side effects and reports back through
//! [`CaptureFlow::complete_success`] / [`CaptureFlow::complete_failure`].
//!
//! At most one submission is in flight. It is identified by a request id;
//! completions carrying any other id are rejected.

use super::draft::{CaptureDraft, PickedImage};
use crate::analysis::AnalysisRequest;
use crate::{FarmerError, Result};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    /// A question has been typed, no image
    TextEntered,
    ImageSelected,
    /// The image is shown for approval
    Confirming,
    Submitting,
    ResultReady,
}

impl CaptureState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, CaptureState::Submitting)
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::TextEntered => write!(f, "TextEntered"),
            CaptureState::ImageSelected => write!(f, "ImageSelected"),
            CaptureState::Confirming => write!(f, "Confirming"),
            CaptureState::Submitting => write!(f, "Submitting"),
            CaptureState::ResultReady => write!(f, "ResultReady"),
        }
    }
}

/// Everything the controller needs to carry one submission through
#[derive(Clone, Debug)]
pub struct SubmitTicket {
    pub request_id: Uuid,
    pub request: AnalysisRequest,
    /// State restored if the analysis fails
    pub resume_state: CaptureState,
    pub question: Option<String>,
    pub image_data_uri: Option<String>,
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    request_id: Uuid,
    resume_state: CaptureState,
}

/// Copy of the flow handed to the UI
#[derive(Clone, Debug, Default)]
pub struct FlowSnapshot {
    pub state: CaptureState,
    pub draft: CaptureDraft,
    pub result_text: Option<String>,
    pub last_error: Option<FarmerError>,
    pub in_flight: Option<Uuid>,
}

impl FlowSnapshot {
    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }
}

#[derive(Debug, Default)]
pub struct CaptureFlow {
    state: CaptureState,
    draft: CaptureDraft,
    result_text: Option<String>,
    in_flight: Option<InFlight>,
    last_error: Option<FarmerError>,
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn draft(&self) -> &CaptureDraft {
        &self.draft
    }

    pub fn result_text(&self) -> Option<&str> {
        self.result_text.as_deref()
    }

    pub fn last_error(&self) -> Option<&FarmerError> {
        self.last_error.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            state: self.state,
            draft: self.draft.clone(),
            result_text: self.result_text.clone(),
            last_error: self.last_error.clone(),
            in_flight: self.in_flight.map(|f| f.request_id),
        }
    }

    /// Reject any interaction while a submission is in flight
    pub fn ensure_not_submitting(&self, action: &str) -> Result<()> {
        match self.in_flight {
            Some(in_flight) => Err(FarmerError::Busy(format!(
                "cannot {} while request {} is in flight",
                action, in_flight.request_id
            ))),
            None => Ok(()),
        }
    }

    /// The picker returned an image
    pub fn image_picked(&mut self, image: PickedImage) -> Result<()> {
        self.ensure_not_submitting("pick an image")?;

        if self.state == CaptureState::ResultReady {
            self.reset();
        }

        debug!("Image selected: {}", image.preview_ref);
        self.draft.set_image(image);
        self.last_error = None;
        self.state = CaptureState::ImageSelected;
        Ok(())
    }

    /// The picker was dismissed without an image; nothing changes
    pub fn pick_cancelled(&mut self) {
        debug!("Image pick cancelled in state {}", self.state);
    }

    /// Show the selected image for approval
    pub fn present(&mut self) -> Result<()> {
        self.ensure_not_submitting("present the image")?;
        match self.state {
            CaptureState::ImageSelected | CaptureState::Confirming => {
                self.state = CaptureState::Confirming;
                Ok(())
            }
            other => Err(FarmerError::InvalidTransition(format!(
                "present from {}",
                other
            ))),
        }
    }

    /// Discard the draft and start over
    pub fn retake(&mut self) -> Result<()> {
        self.ensure_not_submitting("retake")?;
        match self.state {
            CaptureState::ImageSelected | CaptureState::Confirming => {
                self.draft.clear();
                self.state = CaptureState::Idle;
                Ok(())
            }
            other => Err(FarmerError::InvalidTransition(format!("retake from {}", other))),
        }
    }

    /// Update the question text
    pub fn set_question(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_not_submitting("edit the question")?;

        if self.state == CaptureState::ResultReady {
            self.reset();
        }

        self.draft.question_text = text.into();
        self.state = match self.state {
            CaptureState::Idle | CaptureState::TextEntered => {
                if self.draft.has_question() {
                    CaptureState::TextEntered
                } else {
                    CaptureState::Idle
                }
            }
            // The question rides along with the image
            other => other,
        };
        Ok(())
    }

    /// Validate the draft and enter `Submitting`
    pub fn begin_submit(&mut self) -> Result<SubmitTicket> {
        self.ensure_not_submitting("submit")?;

        let request = AnalysisRequest::from_draft(&self.draft);
        if request.is_empty() {
            let err = FarmerError::ValidationError("no image and no question to analyze".into());
            self.last_error = Some(err.clone());
            return Err(err);
        }

        match self.state {
            CaptureState::Confirming | CaptureState::TextEntered => {}
            other => {
                return Err(FarmerError::InvalidTransition(format!("submit from {}", other)));
            }
        }

        let ticket = SubmitTicket {
            request_id: Uuid::new_v4(),
            request,
            resume_state: self.state,
            question: self.draft.question(),
            image_data_uri: self.draft.image_data_uri(),
        };

        self.in_flight = Some(InFlight {
            request_id: ticket.request_id,
            resume_state: ticket.resume_state,
        });
        self.state = CaptureState::Submitting;
        self.result_text = None;
        self.last_error = None;

        Ok(ticket)
    }

    fn take_in_flight(&mut self, request_id: Uuid) -> Result<InFlight> {
        match self.in_flight {
            Some(in_flight) if in_flight.request_id == request_id => {
                self.in_flight = None;
                Ok(in_flight)
            }
            Some(in_flight) => Err(FarmerError::InvalidTransition(format!(
                "completion for {} but {} is in flight",
                request_id, in_flight.request_id
            ))),
            None => Err(FarmerError::InvalidTransition(format!(
                "completion for {} with nothing in flight",
                request_id
            ))),
        }
    }

    /// The endpoint answered; enter `ResultReady` and clear the question
    pub fn complete_success(&mut self, ticket: &SubmitTicket, result_text: String) -> Result<()> {
        self.take_in_flight(ticket.request_id)?;
        self.result_text = Some(result_text);
        self.draft.question_text.clear();
        self.state = CaptureState::ResultReady;
        Ok(())
    }

    /// The endpoint failed; return to where the submission started
    pub fn complete_failure(&mut self, ticket: &SubmitTicket, error: FarmerError) -> Result<()> {
        let in_flight = self.take_in_flight(ticket.request_id)?;
        self.state = in_flight.resume_state;
        self.last_error = Some(error);
        Ok(())
    }

    /// Leave the result screen
    pub fn dismiss(&mut self) -> Result<()> {
        self.ensure_not_submitting("dismiss")?;
        match self.state {
            CaptureState::ResultReady => {
                self.reset();
                Ok(())
            }
            other => Err(FarmerError::InvalidTransition(format!("dismiss from {}", other))),
        }
    }

    /// Drop draft and result, e.g. when the signed-in user changes
    pub fn discard(&mut self) -> Result<()> {
        self.ensure_not_submitting("discard the draft")?;
        self.reset();
        Ok(())
    }

    /// Record an error raised outside a submission (e.g. the picker)
    pub fn record_error(&mut self, error: FarmerError) {
        self.last_error = Some(error);
    }

    /// The user closed the alert
    pub fn acknowledge_error(&mut self) {
        self.last_error = None;
    }

    fn reset(&mut self) {
        self.draft.clear();
        self.result_text = None;
        self.last_error = None;
        self.state = CaptureState::Idle;
    }
}
