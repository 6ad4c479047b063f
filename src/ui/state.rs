//! Application state management
//!
//! This module provides the UI-side model. It mirrors what the orchestrator
//! reports through [`AppEvent`]s and queues [`AppCommand`]s for it; it never
//! performs I/O itself.

use crate::auth::Registration;
use crate::capture::{CaptureState, FlowSnapshot, ImageSource, Thumbnail};
use crate::history::HistoryRecord;
use crate::integration::{AppCommand, AppEvent};
use crate::session::{GateDecision, GateState, Route, SessionGate};
use crate::weather::WeatherReport;
use crate::FarmerError;
use egui::{ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use tracing::{debug, info};

/// Title of alerts raised by failed actions
pub const ERROR_TITLE: &str = "Matsala";
/// Title of alerts raised by failed sign-in, registration or sign-out
pub const AUTH_ERROR_TITLE: &str = "Kuskure";
pub const REGISTERED_TITLE: &str = "Nasara!";
pub const REGISTERED_MESSAGE: &str = "An yi muku rajista cikin nasara.";

/// Modal message shown over the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn from_error(title: &str, error: &FarmerError) -> Self {
        Self::new(title, error.user_message())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HistoryStatus {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

/// Snapshot of the signed-in user's history
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    pub records: Vec<HistoryRecord>,
    pub status: HistoryStatus,
    /// Id of the record shown in the detail overlay
    pub selected: Option<String>,
}

impl HistoryView {
    pub fn selected_record(&self) -> Option<&HistoryRecord> {
        let id = self.selected.as_deref()?;
        self.records.iter().find(|r| r.id == id)
    }
}

/// GPU textures for previews, keyed by preview ref or record id
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Option<TextureHandle>>,
}

impl TextureCache {
    /// Upload once; a failed load is remembered and not retried
    pub fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        key: &str,
        load: impl FnOnce() -> Option<Thumbnail>,
    ) -> Option<TextureHandle> {
        if let Some(texture) = self.textures.get(key) {
            return texture.clone();
        }

        let texture = load().map(|thumb| {
            let image = ColorImage::from_rgba_unmultiplied(thumb.size, &thumb.rgba);
            ctx.load_texture(key, image, TextureOptions::LINEAR)
        });
        self.textures.insert(key.to_string(), texture.clone());
        texture
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// Central application state
pub struct AppState {
    pub route: Route,
    /// Last known session context state
    pub session: GateState,
    pub flow: FlowSnapshot,
    /// Question text as typed; mirrored to the flow on every edit
    pub question_input: String,
    pub history: HistoryView,
    pub weather: WeatherReport,
    pub login: LoginForm,
    pub register: RegisterForm,
    /// A sign-in, registration or sign-out is in progress
    pub auth_pending: bool,
    /// Alert not tied to the capture flow
    pub notice: Option<Alert>,
    pub menu_open: bool,
    pub privacy_open: bool,
    pub textures: TextureCache,
    outbox: Vec<AppCommand>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            route: Route::Home,
            session: GateState::Initializing,
            flow: FlowSnapshot::default(),
            question_input: String::new(),
            history: HistoryView::default(),
            weather: WeatherReport::fallback(),
            login: LoginForm::default(),
            register: RegisterForm::default(),
            auth_pending: false,
            notice: None,
            menu_open: false,
            privacy_open: false,
            textures: TextureCache::default(),
            outbox: Vec::new(),
        }
    }

    /// Queue a command for the orchestrator
    pub fn dispatch(&mut self, command: AppCommand) {
        self.outbox.push(command);
    }

    /// Commands queued since the last call
    pub fn take_commands(&mut self) -> Vec<AppCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// True while a submission is in flight; every capture affordance is disabled
    pub fn is_busy(&self) -> bool {
        self.flow.is_submitting()
    }

    pub fn gate(&self) -> GateDecision {
        SessionGate::decide(&self.session, self.route)
    }

    /// Follow a gate redirect, if any
    pub fn apply_gate(&mut self) -> GateDecision {
        let decision = self.gate();
        if let GateDecision::Redirect(route) = decision {
            debug!("Gate redirect {} -> {}", self.route, route);
            self.navigate(route);
        }
        decision
    }

    pub fn navigate(&mut self, route: Route) {
        if route == Route::History && self.route != Route::History {
            self.refresh_history();
        }
        self.route = route;
        self.menu_open = false;
    }

    pub fn refresh_history(&mut self) {
        self.history.status = HistoryStatus::Loading;
        self.dispatch(AppCommand::LoadHistory);
    }

    pub fn select_record(&mut self, id: Option<String>) {
        self.history.selected = id;
    }

    /// Adopt a new session context state
    pub fn sync_session(&mut self, session: GateState) {
        if session == self.session {
            return;
        }

        let previous_user = self.session.session().map(|s| s.user_id.clone());
        let next_user = session.session().map(|s| s.user_id.clone());
        if previous_user != next_user {
            info!(
                "Session changed ({} -> {})",
                previous_user.is_some(),
                next_user.is_some()
            );
            self.history = HistoryView::default();
            self.textures.clear();
            self.menu_open = false;
            self.privacy_open = false;
        }

        if next_user.is_some() {
            self.login = LoginForm::default();
            self.register = RegisterForm::default();
        }
        self.session = session;
    }

    pub fn pick(&mut self, source: ImageSource) {
        if !self.is_busy() {
            self.dispatch(AppCommand::Pick(source));
        }
    }

    pub fn edit_question(&mut self, text: impl Into<String>) {
        self.question_input = text.into();
        self.dispatch(AppCommand::SetQuestion(self.question_input.clone()));
    }

    /// A result is showing until the user types, picks or dismisses
    pub fn can_send(&self) -> bool {
        !self.is_busy() && self.flow.state != CaptureState::ResultReady
    }

    /// Send (text path) or confirm (image path)
    pub fn submit(&mut self) {
        if self.can_send() {
            self.dispatch(AppCommand::Submit);
        }
    }

    pub fn retake(&mut self) {
        self.dispatch(AppCommand::Retake);
    }

    pub fn dismiss_result(&mut self) {
        self.dispatch(AppCommand::Dismiss);
    }

    pub fn replay(&mut self) {
        self.dispatch(AppCommand::ReplayNarration);
    }

    pub fn sign_in(&mut self) {
        self.auth_pending = true;
        self.dispatch(AppCommand::SignIn {
            email: self.login.email.clone(),
            password: self.login.password.clone(),
        });
    }

    pub fn register_account(&mut self) {
        self.auth_pending = true;
        self.dispatch(AppCommand::Register(Registration::new(
            self.register.full_name.clone(),
            self.register.email.clone(),
            self.register.password.clone(),
        )));
    }

    pub fn sign_out(&mut self) {
        self.menu_open = false;
        self.auth_pending = true;
        self.dispatch(AppCommand::SignOut);
    }

    /// Alert raised by the capture flow, if any
    pub fn flow_alert(&self) -> Option<Alert> {
        self.flow
            .last_error
            .as_ref()
            .map(|e| Alert::from_error(ERROR_TITLE, e))
    }

    /// The alert to show this frame; flow errors take precedence
    pub fn active_alert(&self) -> Option<Alert> {
        self.flow_alert().or_else(|| self.notice.clone())
    }

    /// Close whichever alert is showing
    pub fn close_alert(&mut self) {
        if self.flow.last_error.is_some() {
            self.flow.last_error = None;
            self.dispatch(AppCommand::AcknowledgeError);
        } else {
            self.notice = None;
        }
    }

    /// Fold an orchestrator event into the state
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionChanged(session) => {
                self.auth_pending = false;
                self.sync_session(GateState::Resolved(session));
            }
            AppEvent::Flow(snapshot) => self.apply_flow(snapshot),
            AppEvent::History { owner_id, page } => {
                let current = self.session.session().map(|s| s.user_id.as_str());
                if current != Some(owner_id.as_str()) {
                    debug!("Dropping history page fetched for another account");
                    return;
                }
                if !page.quarantined.is_empty() {
                    debug!("{} history documents quarantined", page.quarantined.len());
                }
                self.history.records = page.records;
                self.history.status = HistoryStatus::Loaded;
                if self.history.selected_record().is_none() {
                    self.history.selected = None;
                }
            }
            AppEvent::HistoryFailed(e) => {
                self.history.status = HistoryStatus::Failed(e.user_message());
            }
            AppEvent::Weather(report) => self.weather = report,
            AppEvent::AuthFailed(e) => {
                self.auth_pending = false;
                self.notice = Some(Alert::from_error(AUTH_ERROR_TITLE, &e));
            }
            AppEvent::Registered => {
                self.notice = Some(Alert::new(REGISTERED_TITLE, REGISTERED_MESSAGE));
            }
            AppEvent::Shutdown => debug!("Orchestrator reported shutdown"),
        }
    }

    fn apply_flow(&mut self, snapshot: FlowSnapshot) {
        let previous = self.flow.state;
        if previous != snapshot.state && adopts_flow_question(previous) {
            self.question_input = snapshot.draft.question_text.clone();
        }
        self.flow = snapshot;
    }
}

/// After these states the flow, not the text box, owns the question text
fn adopts_flow_question(previous: CaptureState) -> bool {
    matches!(
        previous,
        CaptureState::Submitting
            | CaptureState::ResultReady
            | CaptureState::Confirming
            | CaptureState::ImageSelected
    )
}
