//! Authentication and the session manager
//!
//! [`SessionManager`] is the only owner of the [`SessionWriter`]; every
//! sign-in, registration, sign-out and token refresh goes through it.

pub mod firebase;

pub use firebase::FirebaseAuth;

use crate::session::{Session, SessionReader, SessionWriter};
use crate::{FarmerError, Result};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Refresh id tokens this long before they expire
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Which form a missing-field error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Register,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("email already in use")]
    EmailInUse,

    #[error("password too weak")]
    WeakPassword,

    #[error("missing required fields")]
    MissingFields(AuthForm),

    #[error("sign-in failed: {0}")]
    SignInFailed(String),

    #[error("registration failed: {0}")]
    RegistrationFailed(String),

    #[error("sign-out failed: {0}")]
    SignOutFailed(String),

    #[error("session expired: {0}")]
    SessionExpired(String),
}

impl AuthErrorKind {
    /// Alert text shown on the auth screens
    pub fn user_message(&self) -> String {
        match self {
            AuthErrorKind::InvalidCredentials => "Imel ko kalmar sirri ba daidai ba ne.",
            AuthErrorKind::InvalidEmail => "Wannan imel din ba daidai yake ba.",
            AuthErrorKind::EmailInUse => "Wannan Email din riga an yi amfani da shi.",
            AuthErrorKind::WeakPassword => "Kalmar sirri (password) ta yi rauni sosai.",
            AuthErrorKind::MissingFields(AuthForm::Login) => {
                "Da fatan ka cika imel da kalmar sirri"
            }
            AuthErrorKind::MissingFields(AuthForm::Register) => {
                "Da fatan ka cika dukkan wuraren da ake bukata"
            }
            AuthErrorKind::SignInFailed(_) => "An samu matsala wajen shiga",
            AuthErrorKind::RegistrationFailed(_) => "An samu matsala yayin rajista",
            AuthErrorKind::SignOutFailed(_) => "Ba a samu damar fita ba.",
            AuthErrorKind::SessionExpired(_) => "Da fatan ka sake shiga account ɗinka.",
        }
        .to_string()
    }

    /// Map an Identity Toolkit error message (e.g. `WEAK_PASSWORD : ...`)
    /// for the form it came from
    pub fn from_identity_code(message: &str, form: AuthForm) -> Self {
        let code = message.split([' ', ':']).next().unwrap_or_default();
        match (form, code) {
            (
                AuthForm::Login,
                "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS",
            ) => AuthErrorKind::InvalidCredentials,
            (AuthForm::Login, "INVALID_EMAIL") => AuthErrorKind::InvalidEmail,
            (AuthForm::Register, "EMAIL_EXISTS") => AuthErrorKind::EmailInUse,
            (AuthForm::Register, "WEAK_PASSWORD") => AuthErrorKind::WeakPassword,
            (AuthForm::Login, _) => AuthErrorKind::SignInFailed(message.to_string()),
            (AuthForm::Register, _) => AuthErrorKind::RegistrationFailed(message.to_string()),
        }
    }
}

/// Fields of the registration form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(AuthErrorKind::MissingFields(AuthForm::Register).into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish()
    }
}

/// Identity provider
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Session persisted by a previous run, if still valid
    async fn restore(&self) -> Result<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Create the account and sign it in
    async fn register(&self, registration: &Registration) -> Result<Session>;

    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// Exchange the refresh token for a new id token
    async fn refresh(&self, session: &Session) -> Result<Session>;
}

/// Single writer of the session context
pub struct SessionManager {
    auth: Arc<dyn AuthService>,
    writer: SessionWriter,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthService>, writer: SessionWriter) -> Self {
        Self { auth, writer }
    }

    pub fn reader(&self) -> SessionReader {
        self.writer.reader()
    }

    /// Resolve the gate from the persisted session. Always publishes.
    pub async fn initialize(&self) -> Option<Session> {
        let restored = match self.auth.restore().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session restore failed: {}", e);
                None
            }
        };

        match &restored {
            Some(session) => info!("Restored session for {}", session.user_id),
            None => info!("No saved session"),
        }

        self.writer.publish(restored.clone());
        restored
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthErrorKind::MissingFields(AuthForm::Login).into());
        }

        let session = self.auth.sign_in(email, password).await?;
        info!("Signed in as {}", session.user_id);
        self.writer.publish(Some(session.clone()));
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        registration.validate()?;

        let normalized = Registration {
            full_name: registration.full_name.trim().to_string(),
            email: registration.email.trim().to_string(),
            password: registration.password.clone(),
        };

        let session = self.auth.register(&normalized).await?;
        info!("Registered {}", session.user_id);
        self.writer.publish(Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.reader().current() {
            self.auth.sign_out(&session).await.map_err(|e| match e {
                FarmerError::AuthError(kind) => FarmerError::AuthError(kind),
                other => AuthErrorKind::SignOutFailed(other.to_string()).into(),
            })?;
            info!("Signed out {}", session.user_id);
        }
        self.writer.publish(None);
        Ok(())
    }

    /// Refresh the id token if it is about to expire.
    ///
    /// A rejected refresh token ends the session.
    pub async fn ensure_fresh(&self) -> Result<()> {
        let Some(session) = self.reader().current() else {
            return Ok(());
        };
        if session.refresh_token.is_none()
            || !session.token_expires_within(Duration::minutes(REFRESH_MARGIN_MINUTES))
        {
            return Ok(());
        }

        match self.auth.refresh(&session).await {
            Ok(refreshed) => {
                if let (Some(id), Some(refresh)) = (refreshed.id_token, refreshed.refresh_token) {
                    self.writer.refresh_tokens(id, refresh, refreshed.expires_at);
                }
                Ok(())
            }
            Err(FarmerError::AuthError(kind @ AuthErrorKind::SessionExpired(_))) => {
                warn!("Session for {} expired", session.user_id);
                self.writer.publish(None);
                Err(kind.into())
            }
            Err(e) => Err(e),
        }
    }
}
