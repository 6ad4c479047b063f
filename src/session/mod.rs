//! Process-wide session context
//!
//! The session is written by exactly one owner (the session manager that
//! wraps the auth service) and read everywhere else through cheap,
//! cloneable read-only handles.

pub mod gate;

pub use gate::{GateDecision, Route, SessionGate};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fallback display name when the identity carries neither a name nor an email
pub const DEFAULT_DISPLAY_NAME: &str = "Manomi";

/// Authenticated identity handle for the current user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    /// When the id token stops being accepted
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
            id_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_tokens(mut self, id_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// True when the id token expires within `margin` (or has no known expiry)
    pub fn token_expires_within(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - margin <= Utc::now(),
            None => self.id_token.is_none(),
        }
    }

    /// Name shown in the header: display name, else the email local part
    pub fn display_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("has_id_token", &self.id_token.is_some())
            .finish()
    }
}

/// Resolution state of the session context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    /// No session notification has arrived yet
    #[default]
    Initializing,
    /// The auth service has reported at least once
    Resolved(Option<Session>),
}

impl GateState {
    pub fn is_initializing(&self) -> bool {
        matches!(self, GateState::Initializing)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            GateState::Resolved(session) => session.as_ref(),
            GateState::Initializing => None,
        }
    }
}

struct SessionShared {
    state: RwLock<GateState>,
    version: AtomicU64,
}

/// Create the session context: one writer, any number of readers
pub fn session_context() -> (SessionWriter, SessionReader) {
    let shared = Arc::new(SessionShared {
        state: RwLock::new(GateState::Initializing),
        version: AtomicU64::new(0),
    });

    (
        SessionWriter {
            shared: Arc::clone(&shared),
        },
        SessionReader { shared },
    )
}

/// The single writer of the session context. Not cloneable.
pub struct SessionWriter {
    shared: Arc<SessionShared>,
}

impl SessionWriter {
    /// Publish a session change; the first call resolves the gate
    pub fn publish(&self, session: Option<Session>) {
        *self.shared.state.write() = GateState::Resolved(session);
        self.shared.version.fetch_add(1, Ordering::SeqCst);
    }

    /// Replace the tokens of the current session without changing identity
    pub fn refresh_tokens(
        &self,
        id_token: String,
        refresh_token: String,
        expires_at: Option<DateTime<Utc>>,
    ) {
        let mut state = self.shared.state.write();
        if let GateState::Resolved(Some(session)) = &mut *state {
            session.id_token = Some(id_token);
            session.refresh_token = Some(refresh_token);
            session.expires_at = expires_at;
        }
    }

    pub fn reader(&self) -> SessionReader {
        SessionReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read-only view of the session context
#[derive(Clone)]
pub struct SessionReader {
    shared: Arc<SessionShared>,
}

impl SessionReader {
    pub fn state(&self) -> GateState {
        self.shared.state.read().clone()
    }

    pub fn current(&self) -> Option<Session> {
        self.shared.state.read().session().cloned()
    }

    pub fn is_initializing(&self) -> bool {
        self.shared.state.read().is_initializing()
    }

    /// Monotonic counter bumped on every publication
    pub fn version(&self) -> u64 {
        self.shared.version.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for SessionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReader")
            .field("state", &*self.shared.state.read())
            .finish()
    }
}
