//! Shared fakes and a one-shot HTTP server for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use farmerai::analysis::{AnalysisRequest, AnalysisService};
use farmerai::auth::{AuthErrorKind, AuthService, Registration};
use farmerai::capture::{
    CaptureController, CaptureServices, ImagePicker, ImageSource, PickedImage,
};
use farmerai::history::{HistoryPage, HistoryStore, InMemoryHistoryStore, NewHistoryRecord};
use farmerai::session::{session_context, Session, SessionReader, SessionWriter};
use farmerai::speech::{NarrationOptions, Narrator};
use farmerai::{FarmerError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};

pub const LEAF_BASE64: &str = "aGVsbG8gbGVhZg==";

/// Analysis endpoint that replays scripted replies and records requests
#[derive(Default)]
pub struct MockAnalysis {
    replies: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<AnalysisRequest>>,
    /// When set, each call waits for one notification before answering
    release: Option<Arc<Notify>>,
}

impl MockAnalysis {
    pub fn replying(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Calls block until `release.notify_one()`
    pub fn held(replies: Vec<Result<String>>, release: Arc<Notify>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            release: Some(release),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl AnalysisService for MockAnalysis {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(FarmerError::NetworkError("no scripted reply".into())))
    }
}

/// Narrator that remembers what it was asked to say
#[derive(Default)]
pub struct MockNarrator {
    pub spoken: Mutex<Vec<String>>,
    pub fail: bool,
    /// When set, each narration waits for one notification before finishing
    release: Option<Arc<Notify>>,
}

impl MockNarrator {
    pub fn held(release: Arc<Notify>) -> Self {
        Self {
            release: Some(release),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn narrate(&self, text: &str, _options: &NarrationOptions) -> Result<()> {
        self.spoken.lock().push(text.to_string());
        if let Some(release) = &self.release {
            release.notified().await;
        }
        if self.fail {
            return Err(FarmerError::NarrationError("speaker unplugged".into()));
        }
        Ok(())
    }
}

/// Picker returning scripted outcomes; cancels once the script runs out
#[derive(Default)]
pub struct MockPicker {
    outcomes: Mutex<VecDeque<Result<Option<PickedImage>>>>,
    pub calls: AtomicUsize,
}

impl MockPicker {
    pub fn with(outcomes: Vec<Result<Option<PickedImage>>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImagePicker for MockPicker {
    async fn pick(&self, _source: ImageSource) -> Result<Option<PickedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes.lock().pop_front().unwrap_or(Ok(None))
    }
}

/// History store whose writes always fail
#[derive(Default)]
pub struct FailingHistory {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl HistoryStore for FailingHistory {
    async fn append(&self, _record: NewHistoryRecord) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(FarmerError::StoreError("HTTP 503: UNAVAILABLE".into()))
    }

    async fn list_for_owner(&self, _owner_id: &str) -> Result<HistoryPage> {
        Err(FarmerError::StoreError("HTTP 503: UNAVAILABLE".into()))
    }
}

/// In-memory history whose writes wait for one notification each
pub struct HeldHistory {
    pub inner: Arc<InMemoryHistoryStore>,
    release: Arc<Notify>,
}

impl HeldHistory {
    pub fn new(inner: Arc<InMemoryHistoryStore>, release: Arc<Notify>) -> Self {
        Self { inner, release }
    }
}

#[async_trait]
impl HistoryStore for HeldHistory {
    async fn append(&self, record: NewHistoryRecord) -> Result<String> {
        self.release.notified().await;
        self.inner.append(record).await
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<HistoryPage> {
        self.inner.list_for_owner(owner_id).await
    }
}

/// Auth service with a fixed set of accounts
#[derive(Default)]
pub struct MockAuth {
    pub accounts: Mutex<Vec<(String, String, Session)>>,
    pub saved: Mutex<Option<Session>>,
    pub sign_outs: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub fail_sign_out: bool,
}

impl MockAuth {
    pub fn with_account(email: &str, password: &str, session: Session) -> Self {
        let auth = Self::default();
        auth.accounts
            .lock()
            .push((email.to_string(), password.to_string(), session));
        auth
    }

    pub fn with_saved(self, session: Session) -> Self {
        *self.saved.lock() = Some(session);
        self
    }
}

#[async_trait]
impl AuthService for MockAuth {
    async fn restore(&self) -> Result<Option<Session>> {
        Ok(self.saved.lock().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.accounts
            .lock()
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(_, _, s)| s.clone())
            .ok_or_else(|| AuthErrorKind::InvalidCredentials.into())
    }

    async fn register(&self, registration: &Registration) -> Result<Session> {
        let mut accounts = self.accounts.lock();
        if accounts.iter().any(|(e, _, _)| e == &registration.email) {
            return Err(AuthErrorKind::EmailInUse.into());
        }
        let session = Session::new(format!("uid-{}", accounts.len() + 1))
            .with_email(registration.email.clone())
            .with_display_name(registration.full_name.clone())
            .with_tokens("id-token", "refresh-token");
        accounts.push((
            registration.email.clone(),
            registration.password.clone(),
            session.clone(),
        ));
        Ok(session)
    }

    async fn sign_out(&self, _session: &Session) -> Result<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            return Err(FarmerError::IOError("read-only file system".into()));
        }
        *self.saved.lock() = None;
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> Result<Session> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(session.clone())
    }
}

pub fn picked_leaf() -> PickedImage {
    PickedImage::new("file:///gona/ganye.jpg", LEAF_BASE64)
}

/// Everything a capture test needs, with handles on each fake
pub struct CaptureFixture {
    pub controller: CaptureController,
    pub analysis: Arc<MockAnalysis>,
    pub history: Arc<InMemoryHistoryStore>,
    pub narrator: Arc<MockNarrator>,
    pub picker: Arc<MockPicker>,
    pub writer: SessionWriter,
    pub reader: SessionReader,
}

impl CaptureFixture {
    pub fn new(analysis: MockAnalysis, picker: MockPicker) -> Self {
        Self::with_narrator(analysis, picker, MockNarrator::default())
    }

    pub fn with_narrator(analysis: MockAnalysis, picker: MockPicker, narrator: MockNarrator) -> Self {
        let (writer, reader) = session_context();
        writer.publish(Some(Session::new("uid-musa").with_tokens("id", "refresh")));

        let analysis = Arc::new(analysis);
        let history = Arc::new(InMemoryHistoryStore::new());
        let narrator = Arc::new(narrator);
        let picker = Arc::new(picker);

        let services = CaptureServices {
            analysis: analysis.clone(),
            history: history.clone(),
            narrator: narrator.clone(),
            picker: picker.clone(),
        };

        Self {
            controller: CaptureController::new(services, reader.clone()),
            analysis,
            history,
            narrator,
            picker,
            writer,
            reader,
        }
    }
}

/// What the one-shot server received
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Serve exactly one HTTP request with the given status and JSON body.
///
/// Returns the base URL and a receiver for the captured request.
pub async fn serve_once(
    status: u16,
    body: &str,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let body = body.to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break None;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break Some(pos + 4);
            }
        };
        let Some(header_end) = header_end else {
            return;
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let mut lines = head.split("\r\n").filter(|l| !l.is_empty());
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        while raw.len() < header_end + content_length {
            let n = socket.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let body_end = raw.len().min(header_end + content_length);
        let request_body = String::from_utf8_lossy(&raw[header_end..body_end]).to_string();

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;

        let _ = tx.send(CapturedRequest {
            request_line,
            headers,
            body: request_body,
        });
    });

    (format!("http://{}", addr), rx)
}
