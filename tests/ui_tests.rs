//! UI automation tests using egui_kittest and AccessKit
//!
//! These tests render the real screens against an [`AppState`], drive them
//! through the accessibility tree and check the commands the UI queues for
//! the orchestrator.

use chrono::{Duration, Utc};
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use farmerai::capture::{CaptureState, FlowSnapshot, ImageSource, PickedImage};
use farmerai::history::{HistoryPage, HistoryRecord};
use farmerai::integration::{AppCommand, AppEvent};
use farmerai::session::{GateState, Route, Session};
use farmerai::ui::{show_screens, AppState, HistoryStatus, Theme, REGISTERED_MESSAGE};
use farmerai::{AuthErrorKind, FarmerError};

/// Application state wrapper for testing
struct TestApp {
    state: AppState,
    theme: Theme,
}

impl TestApp {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            theme: Theme::field(),
        }
    }

    fn signed_out() -> Self {
        let mut app = Self::new();
        app.state.apply(AppEvent::SessionChanged(None));
        app
    }

    fn signed_in() -> Self {
        let mut app = Self::new();
        app.state.apply(AppEvent::SessionChanged(Some(
            Session::new("uid-musa").with_display_name("Musa Aliyu"),
        )));
        app
    }

    fn with_flow(mut self, snapshot: FlowSnapshot) -> Self {
        self.state.apply(AppEvent::Flow(snapshot));
        self
    }
}

fn harness(app: TestApp) -> Harness<'static, TestApp> {
    let mut harness = Harness::builder()
        .with_size(egui::Vec2::new(420.0, 820.0))
        .build_state(
            |ctx, app: &mut TestApp| show_screens(ctx, &mut app.state, &app.theme),
            app,
        );
    harness.run();
    harness
}

fn commands(harness: &mut Harness<'_, TestApp>) -> Vec<AppCommand> {
    harness.state_mut().state.take_commands()
}

fn flow_in(state: CaptureState) -> FlowSnapshot {
    FlowSnapshot {
        state,
        ..Default::default()
    }
}

fn confirming() -> FlowSnapshot {
    let mut snapshot = flow_in(CaptureState::Confirming);
    snapshot
        .draft
        .set_image(PickedImage::new("file:///gona/ganye.jpg", "aGVsbG8="));
    snapshot
}

fn record(id: &str, question: Option<&str>, result: &str, age_hours: i64) -> HistoryRecord {
    HistoryRecord {
        id: id.into(),
        owner_id: "uid-musa".into(),
        image_payload: None,
        question_text: question.map(str::to_string),
        result_text: result.into(),
        created_at: Utc::now() - Duration::hours(age_hours),
    }
}

#[test]
fn test_spinner_until_session_resolves() {
    let harness = harness(TestApp::new());
    harness.get_by_label("Starting");
    assert!(harness.query_by_label("Sign in").is_none());
    assert!(harness.query_by_label("Take photo").is_none());
}

#[test]
fn test_signed_out_lands_on_login() {
    let harness = harness(TestApp::signed_out());
    assert_eq!(harness.state().state.route, Route::Login);
    harness.get_by_label("Email input");
    harness.get_by_label("Password input");
    harness.get_by_label("Sign in");
}

#[test]
fn test_sign_in_sends_credentials() {
    let mut harness = harness(TestApp::signed_out());

    harness.get_by_label("Email input").focus();
    harness.run();
    harness.get_by_label("Email input").type_text("musa@gona.ng");
    harness.run();

    harness.get_by_label("Password input").focus();
    harness.run();
    harness.get_by_label("Password input").type_text("asirin-gona");
    harness.run();

    harness.get_by_label("Sign in").click();
    harness.run();

    assert!(harness.state().state.auth_pending);
    let sent = commands(&mut harness);
    assert!(sent.iter().any(|c| matches!(
        c,
        AppCommand::SignIn { email, password }
            if email == "musa@gona.ng" && password == "asirin-gona"
    )));
}

#[test]
fn test_login_links_to_register() {
    let mut harness = harness(TestApp::signed_out());

    harness.get_by_label("Go to register").click();
    harness.run();
    harness.run();

    assert_eq!(harness.state().state.route, Route::Register);
    harness.get_by_label("Full name input");
    harness.get_by_label("Create account");
}

#[test]
fn test_registration_notice_is_shown() {
    let mut app = TestApp::signed_out();
    app.state.apply(AppEvent::Registered);
    app.state.apply(AppEvent::SessionChanged(Some(Session::new("uid-new"))));

    let mut harness = harness(app);
    harness.get_by_label(&format!("Alert: {}", REGISTERED_MESSAGE));

    harness.get_by_label("Close alert").click();
    harness.run();
    assert!(harness.state().state.notice.is_none());
    assert!(harness.query_by_label("Close alert").is_none());
}

#[test]
fn test_auth_failure_alert() {
    let mut app = TestApp::signed_out();
    app.state
        .apply(AppEvent::AuthFailed(AuthErrorKind::InvalidCredentials.into()));

    let harness = harness(app);
    harness.get_by_label(&format!(
        "Alert: {}",
        AuthErrorKind::InvalidCredentials.user_message()
    ));
}

#[test]
fn test_home_shows_capture_actions_and_weather() {
    let harness = harness(TestApp::signed_in());
    assert_eq!(harness.state().state.route, Route::Home);

    harness.get_by_label("Greeting");
    harness.get_by_label("Weather: 32°C Hasken Rana");
    harness.get_by_label("Take photo");
    harness.get_by_label("Choose from gallery");
    harness.get_by_label("Question input");
    harness.get_by_label("Send question");
    harness.get_by_label("About FarmerAI");
}

#[test]
fn test_capture_buttons_open_picker() {
    let mut harness = harness(TestApp::signed_in());

    harness.get_by_label("Take photo").click();
    harness.run();
    harness.get_by_label("Choose from gallery").click();
    harness.run();

    let sent = commands(&mut harness);
    assert!(matches!(
        sent.as_slice(),
        [
            AppCommand::Pick(ImageSource::Camera),
            AppCommand::Pick(ImageSource::Library)
        ]
    ));
}

#[test]
fn test_typing_question_updates_flow() {
    let mut harness = harness(TestApp::signed_in());

    harness.get_by_label("Question input").focus();
    harness.run();
    harness.get_by_label("Question input").type_text("Ganyen masara ya yi rawaya");
    harness.run();

    assert_eq!(
        harness.state().state.question_input,
        "Ganyen masara ya yi rawaya"
    );
    let sent = commands(&mut harness);
    assert!(matches!(
        sent.last(),
        Some(AppCommand::SetQuestion(text)) if text == "Ganyen masara ya yi rawaya"
    ));

    harness.get_by_label("Send question").click();
    harness.run();
    assert!(matches!(commands(&mut harness).as_slice(), [AppCommand::Submit]));
}

#[test]
fn test_submitting_disables_capture() {
    let mut snapshot = flow_in(CaptureState::Submitting);
    snapshot.draft.question_text = "me ke faruwa?".into();
    let mut harness = harness(TestApp::signed_in().with_flow(snapshot));

    harness.get_by_label("Analyzing");

    harness.get_by_label("Send question").click();
    harness.get_by_label("Take photo").click();
    harness.run();

    assert!(harness.state().state.is_busy());
    assert!(commands(&mut harness).is_empty());
}

#[test]
fn test_result_card_shows_and_dismisses() {
    let mut snapshot = flow_in(CaptureState::ResultReady);
    snapshot.result_text = Some("Cuta: Blight".into());
    let mut harness = harness(TestApp::signed_in().with_flow(snapshot));

    harness.get_by_label("Result: Cuta: Blight");
    assert!(harness.query_by_label("About FarmerAI").is_none());

    harness.get_by_label("Replay narration").click();
    harness.run();
    harness.get_by_label("Dismiss result").click();
    harness.run();

    let sent = commands(&mut harness);
    assert!(matches!(
        sent.as_slice(),
        [AppCommand::ReplayNarration, AppCommand::Dismiss]
    ));
}

#[test]
fn test_send_is_disabled_while_result_shows() {
    let mut snapshot = flow_in(CaptureState::ResultReady);
    snapshot
        .draft
        .set_image(PickedImage::new("file:///gona/ganye.jpg", "aGVsbG8="));
    snapshot.result_text = Some("Cuta: Blight".into());
    let mut harness = harness(TestApp::signed_in().with_flow(snapshot));

    harness.get_by_label("Send question").click();
    harness.run();
    assert!(commands(&mut harness).is_empty());

    harness.state_mut().state.submit();
    assert!(commands(&mut harness).is_empty());
}

#[test]
fn test_confirm_dialog_actions() {
    let mut harness = harness(TestApp::signed_in().with_flow(confirming()));

    harness.get_by_label("Confirm photo").click();
    harness.run();
    assert!(matches!(commands(&mut harness).as_slice(), [AppCommand::Submit]));

    harness.get_by_label("Retake photo").click();
    harness.run();
    assert!(matches!(commands(&mut harness).as_slice(), [AppCommand::Retake]));
}

#[test]
fn test_validation_alert_acknowledged() {
    let mut snapshot = flow_in(CaptureState::Idle);
    let error = FarmerError::ValidationError("empty draft".into());
    snapshot.last_error = Some(error.clone());
    let mut harness = harness(TestApp::signed_in().with_flow(snapshot));

    harness.get_by_label(&format!("Alert: {}", error.user_message()));

    harness.get_by_label("Close alert").click();
    harness.run();

    assert!(harness.state().state.flow.last_error.is_none());
    assert!(matches!(
        commands(&mut harness).as_slice(),
        [AppCommand::AcknowledgeError]
    ));
}

#[test]
fn test_history_tab_loads_history() {
    let mut harness = harness(TestApp::signed_in());

    harness.get_by_label("History tab").click();
    harness.run();
    harness.run();

    assert_eq!(harness.state().state.route, Route::History);
    assert_eq!(harness.state().state.history.status, HistoryStatus::Loading);
    assert!(commands(&mut harness)
        .iter()
        .any(|c| matches!(c, AppCommand::LoadHistory)));
    harness.get_by_label("Loading history");
}

#[test]
fn test_history_entries_open_detail() {
    let mut app = TestApp::signed_in();
    app.state.navigate(Route::History);
    app.state.apply(AppEvent::History {
        owner_id: "uid-musa".into(),
        page: HistoryPage {
            records: vec![
                record("r2", Some("Me ke damun tumatir?"), "Cuta: Early blight", 1),
                record("r1", None, "Ganyen yana da lafiya", 5),
            ],
            quarantined: Vec::new(),
        },
    });
    app.state.take_commands();

    let mut harness = harness(app);
    harness.get_by_label("History entry: Me ke damun tumatir?");
    harness.get_by_label(&format!(
        "History entry: {}",
        farmerai::history::IMAGE_ONLY_TITLE
    ));

    harness
        .get_by_label("History entry: Me ke damun tumatir?")
        .click();
    harness.run();
    harness.run();

    assert_eq!(harness.state().state.history.selected.as_deref(), Some("r2"));
    harness.get_by_label("Detail result: Cuta: Early blight");

    harness.get_by_label("Close detail").click();
    harness.run();
    assert!(harness.state().state.history.selected.is_none());
}

#[test]
fn test_empty_history_message() {
    let mut app = TestApp::signed_in();
    app.state.navigate(Route::History);
    app.state.apply(AppEvent::History {
        owner_id: "uid-musa".into(),
        page: HistoryPage::default(),
    });

    let harness = harness(app);
    harness.get_by_label("No history yet");
}

#[test]
fn test_history_failure_message() {
    let mut app = TestApp::signed_in();
    app.state.navigate(Route::History);
    let error = FarmerError::StoreError("HTTP 503".into());
    app.state.apply(AppEvent::HistoryFailed(error.clone()));

    let mut harness = harness(app);
    harness.get_by_label(&format!("History error: {}", error.user_message()));

    harness.get_by_label("Refresh history").click();
    harness.run();
    assert!(commands(&mut harness)
        .iter()
        .any(|c| matches!(c, AppCommand::LoadHistory)));
}

#[test]
fn test_menu_sign_out() {
    let mut harness = harness(TestApp::signed_in());

    harness.get_by_label("Open menu").click();
    harness.run();
    harness.run();
    assert!(harness.state().state.menu_open);

    harness.get_by_label("Sign out").click();
    harness.run();

    assert!(harness.state().state.auth_pending);
    assert!(!harness.state().state.menu_open);
    assert!(matches!(commands(&mut harness).as_slice(), [AppCommand::SignOut]));
}

#[test]
fn test_privacy_policy_from_menu() {
    let mut harness = harness(TestApp::signed_in());

    harness.get_by_label("Open menu").click();
    harness.run();
    harness.run();
    harness.get_by_label("Open privacy policy").click();
    harness.run();
    harness.run();

    harness.get_by_label("Privacy policy text");
    harness.get_by_label("Close privacy policy").click();
    harness.run();
    assert!(!harness.state().state.privacy_open);
}

#[test]
fn test_signing_out_returns_to_login() {
    let mut harness = harness(TestApp::signed_in());

    harness
        .state_mut()
        .state
        .sync_session(GateState::Resolved(None));
    harness.run();
    harness.run();

    assert_eq!(harness.state().state.route, Route::Login);
    harness.get_by_label("Email input");
}
