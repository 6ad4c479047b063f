//! Orchestrator connecting the UI to the services
//!
//! The UI sends [`AppCommand`]s; a worker thread owning a tokio runtime
//! runs them and reports back with [`AppEvent`]s. State transitions of the
//! capture flow happen synchronously on the worker thread; network, picker
//! and narration work runs as tokio tasks.

use super::services::AppServices;
use crate::auth::{Registration, SessionManager};
use crate::capture::{CaptureController, FlowSnapshot, ImageSource};
use crate::history::HistoryPage;
use crate::session::{Session, SessionReader, SessionWriter};
use crate::utils::AppChannels;
use crate::weather::WeatherReport;
use crate::{FarmerError, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// Commands sent to the orchestrator
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Resolve the session gate from the persisted session
    Initialize,

    SignIn { email: String, password: String },

    Register(Registration),

    SignOut,

    /// Open the picker; a picked image goes straight to confirmation
    Pick(ImageSource),

    Retake,

    SetQuestion(String),

    /// Submit the draft (confirm for images, send for text)
    Submit,

    Dismiss,

    AcknowledgeError,

    ReplayNarration,

    /// (Re)load the signed-in user's history
    LoadHistory,

    RefreshWeather,

    Shutdown,
}

/// Events emitted by the orchestrator
#[derive(Debug, Clone)]
pub enum AppEvent {
    SessionChanged(Option<Session>),

    /// The capture flow changed
    Flow(FlowSnapshot),

    /// A history page fetched for `owner_id`
    History { owner_id: String, page: HistoryPage },

    HistoryFailed(FarmerError),

    Weather(WeatherReport),

    /// Sign-in, registration or sign-out failed
    AuthFailed(FarmerError),

    /// A new account was created and signed in
    Registered,

    Shutdown,
}

/// Handle for controlling the orchestrator from the UI
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: Sender<AppCommand>,
    event_rx: Receiver<AppEvent>,
    session: SessionReader,
}

impl OrchestratorHandle {
    pub fn send_command(&self, cmd: AppCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| FarmerError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn try_recv_event(&self) -> Option<AppEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<AppEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn session(&self) -> SessionReader {
        self.session.clone()
    }
}

/// Everything a command needs; cheap to clone into tasks
#[derive(Clone)]
struct Worker {
    manager: Arc<SessionManager>,
    capture: CaptureController,
    services: AppServices,
    events: Sender<AppEvent>,
}

impl Worker {
    fn emit(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }

    fn emit_flow(&self) {
        self.emit(AppEvent::Flow(self.capture.snapshot()));
    }

    /// Apply a synchronous flow transition; rejected transitions are logged
    fn transition(&self, name: &str, result: Result<()>) {
        if let Err(e) = result {
            debug!("{} rejected: {}", name, e);
        }
        self.emit_flow();
    }

    fn handle(&self, runtime: &Runtime, command: AppCommand) {
        match command {
            AppCommand::Initialize => {
                let worker = self.clone();
                runtime.spawn(async move {
                    let session = worker.manager.initialize().await;
                    worker.emit(AppEvent::SessionChanged(session));
                });
            }
            AppCommand::SignIn { email, password } => {
                let worker = self.clone();
                runtime.spawn(async move {
                    match worker.manager.sign_in(&email, &password).await {
                        Ok(session) => worker.emit(AppEvent::SessionChanged(Some(session))),
                        Err(e) => worker.emit(AppEvent::AuthFailed(e)),
                    }
                });
            }
            AppCommand::Register(registration) => {
                let worker = self.clone();
                runtime.spawn(async move {
                    match worker.manager.register(&registration).await {
                        Ok(session) => {
                            worker.emit(AppEvent::Registered);
                            worker.emit(AppEvent::SessionChanged(Some(session)));
                        }
                        Err(e) => worker.emit(AppEvent::AuthFailed(e)),
                    }
                });
            }
            AppCommand::SignOut => {
                let worker = self.clone();
                runtime.spawn(async move {
                    match worker.manager.sign_out().await {
                        Ok(()) => {
                            if let Err(e) = worker.capture.discard() {
                                debug!("Draft kept after sign-out: {}", e);
                            }
                            worker.emit_flow();
                            worker.emit(AppEvent::SessionChanged(None));
                        }
                        Err(e) => worker.emit(AppEvent::AuthFailed(e)),
                    }
                });
            }
            AppCommand::Pick(source) => {
                let worker = self.clone();
                runtime.spawn(async move {
                    match worker.capture.pick(source).await {
                        Ok(true) => worker.transition("present", worker.capture.present()),
                        Ok(false) => worker.emit_flow(),
                        Err(e) => {
                            debug!("Pick ended with error: {}", e);
                            worker.emit_flow();
                        }
                    }
                });
            }
            AppCommand::Retake => self.transition("retake", self.capture.retake()),
            AppCommand::SetQuestion(text) => {
                self.transition("set_question", self.capture.set_question(text))
            }
            AppCommand::Submit => {
                let ticket = match self.capture.begin_submit() {
                    Ok(ticket) => ticket,
                    Err(e) => {
                        debug!("Submit rejected: {}", e);
                        self.emit_flow();
                        return;
                    }
                };
                self.emit_flow();

                let worker = self.clone();
                runtime.spawn(async move {
                    if let Err(e) = worker.manager.ensure_fresh().await {
                        warn!("Token refresh before submission failed: {}", e);
                    }
                    match worker.capture.analyze(ticket).await {
                        Ok(answered) => {
                            worker.emit_flow();
                            worker.capture.follow_up(answered).await;
                        }
                        Err(e) => {
                            debug!("Submission ended with error: {}", e);
                            worker.emit_flow();
                        }
                    }
                });
            }
            AppCommand::Dismiss => self.transition("dismiss", self.capture.dismiss()),
            AppCommand::AcknowledgeError => {
                self.capture.acknowledge_error();
                self.emit_flow();
            }
            AppCommand::ReplayNarration => {
                let worker = self.clone();
                runtime.spawn(async move {
                    if let Err(e) = worker.capture.replay().await {
                        warn!("Replay failed: {}", e);
                    }
                });
            }
            AppCommand::LoadHistory => {
                let worker = self.clone();
                runtime.spawn(async move {
                    if let Err(e) = worker.manager.ensure_fresh().await {
                        warn!("Token refresh before history load failed: {}", e);
                    }
                    let Some(session) = worker.manager.reader().current() else {
                        worker.emit(AppEvent::HistoryFailed(FarmerError::NotSignedIn));
                        return;
                    };
                    match worker
                        .services
                        .capture
                        .history
                        .list_for_owner(&session.user_id)
                        .await
                    {
                        Ok(page) => worker.emit(AppEvent::History {
                            owner_id: session.user_id,
                            page,
                        }),
                        Err(e) => {
                            warn!("History load failed: {}", e);
                            worker.emit(AppEvent::HistoryFailed(e));
                        }
                    }
                });
            }
            AppCommand::RefreshWeather => {
                let worker = self.clone();
                runtime.spawn(async move {
                    let report = match &worker.services.weather {
                        Some(client) => client.report(worker.services.location.as_ref()).await,
                        None => WeatherReport::fallback(),
                    };
                    worker.emit(AppEvent::Weather(report));
                });
            }
            // Handled by the command loop
            AppCommand::Shutdown => {}
        }
    }
}

/// Main orchestrator that runs commands against the services
pub struct Orchestrator {
    worker: Worker,
    command_rx: Receiver<AppCommand>,
}

impl Orchestrator {
    /// The orchestrator becomes the owner of the session writer
    pub fn new(services: AppServices, writer: SessionWriter) -> Result<(Self, OrchestratorHandle)> {
        let channels = AppChannels::default();
        let session = writer.reader();

        let manager = Arc::new(SessionManager::new(Arc::clone(&services.auth), writer));
        let capture = CaptureController::new(services.capture.clone(), session.clone())
            .with_narration(services.narration.clone());

        let handle = OrchestratorHandle {
            command_tx: channels.command_tx,
            event_rx: channels.event_rx,
            session,
        };

        let orchestrator = Self {
            worker: Worker {
                manager,
                capture,
                services,
                events: channels.event_tx,
            },
            command_rx: channels.command_rx,
        };

        Ok((orchestrator, handle))
    }

    /// Start the worker thread
    pub fn start(self) -> Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| FarmerError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        let Orchestrator { worker, command_rx } = self;

        let handle = thread::Builder::new()
            .name("orchestrator".into())
            .spawn(move || {
                info!("Orchestrator started");

                loop {
                    match command_rx.recv() {
                        Ok(AppCommand::Shutdown) => {
                            info!("Orchestrator shutdown requested");
                            break;
                        }
                        Ok(command) => {
                            debug!("Command: {}", command_label(&command));
                            worker.handle(&runtime, command);
                        }
                        Err(_) => {
                            warn!("Command channel disconnected");
                            break;
                        }
                    }
                }

                runtime.shutdown_timeout(Duration::from_secs(1));
                worker.emit(AppEvent::Shutdown);
                info!("Orchestrator stopped");
            })
            .map_err(|e| {
                error!("Failed to spawn orchestrator thread: {}", e);
                FarmerError::ChannelError(format!("Failed to spawn orchestrator: {}", e))
            })?;

        Ok(handle)
    }
}

/// Command name without payload (passwords stay out of logs)
fn command_label(command: &AppCommand) -> &'static str {
    match command {
        AppCommand::Initialize => "Initialize",
        AppCommand::SignIn { .. } => "SignIn",
        AppCommand::Register(_) => "Register",
        AppCommand::SignOut => "SignOut",
        AppCommand::Pick(_) => "Pick",
        AppCommand::Retake => "Retake",
        AppCommand::SetQuestion(_) => "SetQuestion",
        AppCommand::Submit => "Submit",
        AppCommand::Dismiss => "Dismiss",
        AppCommand::AcknowledgeError => "AcknowledgeError",
        AppCommand::ReplayNarration => "ReplayNarration",
        AppCommand::LoadHistory => "LoadHistory",
        AppCommand::RefreshWeather => "RefreshWeather",
        AppCommand::Shutdown => "Shutdown",
    }
}
