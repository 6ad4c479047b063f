//! End-to-end capture scenarios against in-process fakes

mod common;

use common::{picked_leaf, CaptureFixture, FailingHistory, MockAnalysis, MockNarrator, MockPicker};
use farmerai::capture::{CaptureController, CaptureServices, CaptureState, ImageSource};
use farmerai::history::{HistoryRecord, HistoryStore};
use farmerai::session::Session;
use farmerai::FarmerError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn test_image_only_submission_records_and_narrates() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Ok("Cuta: Blight".into())]),
        MockPicker::with(vec![Ok(Some(picked_leaf()))]),
    );

    assert!(fx.controller.pick(ImageSource::Library).await.unwrap());
    fx.controller.present().unwrap();
    assert_eq!(fx.controller.snapshot().state, CaptureState::Confirming);

    let outcome = fx.controller.submit().await.unwrap();
    assert_eq!(outcome.result_text, "Cuta: Blight");
    assert!(outcome.record_id.is_some());

    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::ResultReady);
    assert_eq!(snapshot.result_text.as_deref(), Some("Cuta: Blight"));

    let requests = fx.analysis.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].image_data, common::LEAF_BASE64);
    assert_eq!(requests[0].text_query, "");

    let records = fx.history.all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].owner_id, "uid-musa");
    assert!(records[0].question_text.is_none());
    assert_eq!(records[0].result_text, "Cuta: Blight");
    assert!(records[0]
        .image_payload
        .as_deref()
        .is_some_and(|p| p.starts_with("data:image/jpeg;base64,")));

    assert_eq!(fx.narrator.spoken(), vec!["Cuta: Blight".to_string()]);
}

#[tokio::test]
async fn test_question_only_submission_clears_question() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Ok("Yi amfani da takin zamani.".into())]),
        MockPicker::default(),
    );

    fx.controller.set_question("  Yaya zan kara yawan masara?  ").unwrap();
    assert_eq!(fx.controller.snapshot().state, CaptureState::TextEntered);

    fx.controller.submit().await.unwrap();

    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::ResultReady);
    assert!(snapshot.draft.question_text.is_empty());

    let records = fx.history.all();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].question_text.as_deref(),
        Some("Yaya zan kara yawan masara?")
    );
    assert!(records[0].image_payload.is_none());
    assert_eq!(fx.analysis.requests.lock()[0].image_data, "");
}

#[tokio::test]
async fn test_empty_draft_is_rejected_without_network() {
    let fx = CaptureFixture::new(MockAnalysis::default(), MockPicker::default());

    let err = fx.controller.submit().await.unwrap_err();
    assert!(matches!(err, FarmerError::ValidationError(_)));

    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::Idle);
    assert!(matches!(
        snapshot.last_error,
        Some(FarmerError::ValidationError(_))
    ));
    assert_eq!(fx.analysis.call_count(), 0);
    assert!(fx.history.is_empty());
    assert!(fx.narrator.spoken().is_empty());
}

#[tokio::test]
async fn test_analysis_failure_returns_to_confirming() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Err(FarmerError::EndpointError {
            status: 500,
            detail: "model offline".into(),
        })]),
        MockPicker::with(vec![Ok(Some(picked_leaf()))]),
    );

    fx.controller.pick(ImageSource::Camera).await.unwrap();
    fx.controller.present().unwrap();

    let err = fx.controller.submit().await.unwrap_err();
    assert!(matches!(err, FarmerError::EndpointError { status: 500, .. }));

    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::Confirming);
    assert!(snapshot.draft.has_image());
    assert!(snapshot.in_flight.is_none());
    assert!(matches!(
        snapshot.last_error,
        Some(FarmerError::EndpointError { .. })
    ));
    assert!(fx.history.is_empty());
    assert!(fx.narrator.spoken().is_empty());

    // The draft survives for a retry
    fx.controller.acknowledge_error();
    assert!(fx.controller.snapshot().last_error.is_none());
}

#[tokio::test]
async fn test_cancelled_pick_changes_nothing() {
    let fx = CaptureFixture::new(MockAnalysis::default(), MockPicker::with(vec![Ok(None)]));
    fx.controller.set_question("ganye ya yi rawaya").unwrap();

    assert!(!fx.controller.pick(ImageSource::Library).await.unwrap());

    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::TextEntered);
    assert!(!snapshot.draft.has_image());
    assert!(snapshot.last_error.is_none());
    assert_eq!(fx.picker.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_picker_failure_is_recorded() {
    let fx = CaptureFixture::new(
        MockAnalysis::default(),
        MockPicker::with(vec![Err(FarmerError::PermissionDenied(
            "camera unavailable".into(),
        ))]),
    );

    let err = fx.controller.pick(ImageSource::Camera).await.unwrap_err();
    assert!(matches!(err, FarmerError::PermissionDenied(_)));

    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::Idle);
    assert!(matches!(
        snapshot.last_error,
        Some(FarmerError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_interactions_are_busy_while_submitting() {
    let release = Arc::new(Notify::new());
    let fx = CaptureFixture::new(
        MockAnalysis::held(vec![Ok("Lafiya lau".into())], release.clone()),
        MockPicker::with(vec![Ok(Some(picked_leaf()))]),
    );

    fx.controller.set_question("me ke damun shukata?").unwrap();
    let ticket = fx.controller.begin_submit().unwrap();

    let running = fx.controller.clone();
    let task = tokio::spawn(async move { running.run_submission(ticket).await });

    assert!(fx.controller.snapshot().is_submitting());
    assert!(matches!(
        fx.controller.begin_submit(),
        Err(FarmerError::Busy(_))
    ));
    assert!(matches!(
        fx.controller.pick(ImageSource::Library).await,
        Err(FarmerError::Busy(_))
    ));
    assert!(matches!(
        fx.controller.set_question("wata tambaya"),
        Err(FarmerError::Busy(_))
    ));
    assert_eq!(fx.picker.calls.load(Ordering::SeqCst), 0);

    release.notify_one();
    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome.result_text, "Lafiya lau");
    assert_eq!(fx.analysis.call_count(), 1);
    assert_eq!(fx.controller.snapshot().state, CaptureState::ResultReady);
}

#[tokio::test]
async fn test_history_write_failure_does_not_fail_submission() {
    let (writer, reader) = farmerai::session::session_context();
    writer.publish(Some(Session::new("uid-amina")));

    let history = Arc::new(FailingHistory::default());
    let narrator = Arc::new(MockNarrator::default());
    let services = CaptureServices {
        analysis: Arc::new(MockAnalysis::replying(vec![Ok("Babu cuta".into())])),
        history: history.clone(),
        narrator: narrator.clone(),
        picker: Arc::new(MockPicker::default()),
    };
    let controller = CaptureController::new(services, reader);

    controller.set_question("shin akwai cuta?").unwrap();
    let outcome = controller.submit().await.unwrap();

    assert_eq!(outcome.result_text, "Babu cuta");
    assert!(outcome.record_id.is_none());
    assert_eq!(history.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(narrator.spoken(), vec!["Babu cuta".to_string()]);
    assert_eq!(controller.snapshot().state, CaptureState::ResultReady);
}

#[tokio::test]
async fn test_narration_failure_keeps_result() {
    let fx = CaptureFixture::with_narrator(
        MockAnalysis::replying(vec![Ok("Cuta: Rust".into())]),
        MockPicker::default(),
        MockNarrator::failing(),
    );

    fx.controller.set_question("ganye ja-ja").unwrap();
    let outcome = fx.controller.submit().await.unwrap();

    assert_eq!(outcome.result_text, "Cuta: Rust");
    assert_eq!(fx.history.len(), 1);
    assert_eq!(fx.controller.snapshot().state, CaptureState::ResultReady);
}

#[tokio::test]
async fn test_no_session_skips_history_write() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Ok("Amsa".into())]),
        MockPicker::default(),
    );
    fx.writer.publish(None);

    fx.controller.set_question("tambaya").unwrap();
    let outcome = fx.controller.submit().await.unwrap();

    assert!(outcome.record_id.is_none());
    assert!(fx.history.is_empty());
    assert_eq!(fx.narrator.spoken().len(), 1);
}

#[tokio::test]
async fn test_replay_speaks_current_result() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Ok("Cuta: Blight".into())]),
        MockPicker::default(),
    );

    assert!(matches!(
        fx.controller.replay().await,
        Err(FarmerError::InvalidTransition(_))
    ));

    fx.controller.set_question("ganye").unwrap();
    fx.controller.submit().await.unwrap();
    fx.controller.replay().await.unwrap();

    assert_eq!(
        fx.narrator.spoken(),
        vec!["Cuta: Blight".to_string(), "Cuta: Blight".to_string()]
    );
}

#[tokio::test]
async fn test_new_pick_after_result_starts_fresh() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Ok("Na farko".into())]),
        MockPicker::with(vec![Ok(Some(picked_leaf()))]),
    );

    fx.controller.set_question("tambaya ta farko").unwrap();
    fx.controller.submit().await.unwrap();
    assert_eq!(fx.controller.snapshot().state, CaptureState::ResultReady);

    fx.controller.pick(ImageSource::Library).await.unwrap();
    let snapshot = fx.controller.snapshot();
    assert_eq!(snapshot.state, CaptureState::ImageSelected);
    assert!(snapshot.result_text.is_none());
    assert!(snapshot.draft.question_text.is_empty());
}

#[tokio::test]
async fn test_history_is_isolated_per_owner_and_newest_first() {
    let fx = CaptureFixture::new(
        MockAnalysis::replying(vec![Ok("Amsa ta daya".into()), Ok("Amsa ta biyu".into())]),
        MockPicker::default(),
    );

    fx.controller.set_question("ta daya").unwrap();
    fx.controller.submit().await.unwrap();
    fx.controller.dismiss().unwrap();

    // Another farmer's record stored directly
    fx.history.insert(HistoryRecord {
        id: "other".into(),
        owner_id: "uid-zainab".into(),
        image_payload: None,
        question_text: Some("ba nawa ba".into()),
        result_text: "x".into(),
        created_at: chrono::Utc::now() + chrono::Duration::hours(1),
    });

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    fx.controller.set_question("ta biyu").unwrap();
    fx.controller.submit().await.unwrap();

    let page = fx.history.list_for_owner("uid-musa").await.unwrap();
    let titles: Vec<_> = page.records.iter().map(|r| r.title().to_string()).collect();
    assert_eq!(titles, vec!["ta biyu", "ta daya"]);
    assert!(page.records.iter().all(|r| r.owner_id == "uid-musa"));

    let other = fx.history.list_for_owner("uid-zainab").await.unwrap();
    assert_eq!(other.records.len(), 1);
}
