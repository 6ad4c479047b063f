//! Firebase Auth over REST (Identity Toolkit v1 + Secure Token)

use super::{AuthErrorKind, AuthForm, AuthService, Registration};
use crate::config::FirebaseConfig;
use crate::session::Session;
use crate::store::{FieldValue, FirestoreClient};
use crate::{FarmerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct IdentityErrorBody {
    error: IdentityError,
}

#[derive(Deserialize)]
struct IdentityError {
    #[serde(default)]
    message: String,
}

/// Identity failures a refresh cannot recover from
const DEAD_SESSION_CODES: &[&str] = &[
    "TOKEN_EXPIRED",
    "USER_DISABLED",
    "USER_NOT_FOUND",
    "INVALID_REFRESH_TOKEN",
    "INVALID_GRANT_TYPE",
    "MISSING_REFRESH_TOKEN",
];

fn expiry_from(expires_in: Option<&str>) -> Option<DateTime<Utc>> {
    expires_in
        .and_then(|secs| secs.parse::<i64>().ok())
        .map(|secs| Utc::now() + Duration::seconds(secs))
}

/// [`AuthService`] backed by Firebase Auth, persisting the session to disk
pub struct FirebaseAuth {
    client: Client,
    config: FirebaseConfig,
    session_path: Option<PathBuf>,
    profiles: FirestoreClient,
}

impl FirebaseAuth {
    pub fn new(
        config: FirebaseConfig,
        session_path: Option<PathBuf>,
        profiles: FirestoreClient,
    ) -> Self {
        Self {
            client: Client::new(),
            config,
            session_path,
            profiles,
        }
    }

    fn identity_url(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.identity_url.trim_end_matches('/'),
            method,
            self.config.api_key
        )
    }

    fn token_url(&self) -> String {
        format!(
            "{}/v1/token?key={}",
            self.config.secure_token_url.trim_end_matches('/'),
            self.config.api_key
        )
    }

    /// POST to the Identity Toolkit. Error responses yield the provider code.
    async fn call<T: DeserializeOwned>(
        &self,
        url: String,
        body: &impl Serialize,
    ) -> Result<std::result::Result<T, String>> {
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<std::result::Result<T, String>> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(Ok(serde_json::from_str(&text)?));
        }

        let code = serde_json::from_str::<IdentityErrorBody>(&text)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
        debug!("Identity call returned {}: {}", status, code);
        Ok(Err(code))
    }

    fn session_from(response: SignInResponse) -> Session {
        let mut session = Session::new(response.local_id)
            .with_tokens(response.id_token, response.refresh_token);
        session.email = response.email.filter(|e| !e.is_empty());
        session.display_name = response.display_name.filter(|n| !n.is_empty());
        session.expires_at = expiry_from(response.expires_in.as_deref());
        session
    }

    /// Refresh the profile fields from `accounts:lookup`
    async fn lookup(&self, session: &mut Session) -> Result<()> {
        let Some(id_token) = session.id_token.clone() else {
            return Ok(());
        };

        let lookup: std::result::Result<LookupResponse, String> = self
            .call(self.identity_url("lookup"), &json!({ "idToken": id_token }))
            .await?;

        match lookup {
            Ok(found) => {
                if let Some(user) = found.users.into_iter().find(|u| u.local_id == session.user_id) {
                    session.email = user.email.or(session.email.take());
                    session.display_name = user.display_name.or(session.display_name.take());
                }
                Ok(())
            }
            Err(code) => {
                warn!("Account lookup failed: {}", code);
                Ok(())
            }
        }
    }

    async fn write_profile(&self, session: &Session, registration: &Registration) -> Result<()> {
        let id_token = session.id_token.as_deref().ok_or(FarmerError::NotSignedIn)?;

        let mut fields = BTreeMap::new();
        fields.insert("fullName".to_string(), FieldValue::string(&registration.full_name));
        fields.insert("email".to_string(), FieldValue::string(&registration.email));
        fields.insert(
            "createdAt".to_string(),
            FieldValue::string(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );

        self.profiles
            .write_as(
                id_token,
                &self.config.users_collection,
                &session.user_id,
                fields,
                None,
                false,
            )
            .await
    }

    fn load_saved(&self) -> Result<Option<Session>> {
        let Some(path) = &self.session_path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Discarding unreadable session file {}: {}", path.display(), e);
                remove_file(path)?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let Some(path) = &self.session_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(session)?)?;
        debug!("Session saved to {}", path.display());
        Ok(())
    }

    /// Best-effort save; the server already accepted the session
    fn remember(&self, session: &Session) {
        if let Err(e) = self.save(session) {
            warn!("Session for {} not persisted: {}", session.user_id, e);
        }
    }

    fn forget(&self) -> Result<()> {
        match &self.session_path {
            Some(path) => remove_file(path),
            None => Ok(()),
        }
    }
}

fn remove_file(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl AuthService for FirebaseAuth {
    async fn restore(&self) -> Result<Option<Session>> {
        let Some(saved) = self.load_saved()? else {
            return Ok(None);
        };

        match self.refresh(&saved).await {
            Ok(mut session) => {
                if let Err(e) = self.lookup(&mut session).await {
                    warn!("Could not refresh profile: {}", e);
                }
                self.remember(&session);
                Ok(Some(session))
            }
            Err(FarmerError::AuthError(AuthErrorKind::SessionExpired(code))) => {
                info!("Saved session is no longer valid ({})", code);
                if let Err(e) = self.forget() {
                    warn!("Stale session file not removed: {}", e);
                }
                Ok(None)
            }
            Err(e) => {
                // Offline start: keep the saved identity, tokens refresh later
                warn!("Could not refresh saved session: {}", e);
                Ok(Some(saved))
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response: SignInResponse = self
            .call(self.identity_url("signInWithPassword"), &body)
            .await?
            .map_err(|code| AuthErrorKind::from_identity_code(&code, AuthForm::Login))?;

        let session = Self::session_from(response);
        self.remember(&session);
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> Result<Session> {
        let body = json!({
            "email": registration.email,
            "password": registration.password,
            "returnSecureToken": true,
        });

        let response: SignInResponse = self
            .call(self.identity_url("signUp"), &body)
            .await?
            .map_err(|code| AuthErrorKind::from_identity_code(&code, AuthForm::Register))?;

        let mut session = Self::session_from(response);

        let update: std::result::Result<serde_json::Value, String> = self
            .call(
                self.identity_url("update"),
                &json!({
                    "idToken": session.id_token,
                    "displayName": registration.full_name,
                    "returnSecureToken": false,
                }),
            )
            .await?;
        match update {
            Ok(_) => session.display_name = Some(registration.full_name.clone()),
            Err(code) => warn!("Display name update failed: {}", code),
        }

        // The account exists even if the profile document cannot be written
        if let Err(e) = self.write_profile(&session, registration).await {
            warn!("Profile document for {} not written: {}", session.user_id, e);
        }

        self.remember(&session);
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        debug!("Forgetting session for {}", session.user_id);
        self.forget()
            .map_err(|e| AuthErrorKind::SignOutFailed(e.to_string()).into())
    }

    async fn refresh(&self, session: &Session) -> Result<Session> {
        let refresh_token = session.refresh_token.as_deref().ok_or_else(|| {
            FarmerError::from(AuthErrorKind::SessionExpired("no refresh token".into()))
        })?;

        let response = self
            .client
            .post(self.token_url())
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;

        let refreshed: RefreshResponse = Self::decode(response).await?.map_err(|code| {
            if DEAD_SESSION_CODES.iter().any(|dead| code.starts_with(dead)) {
                FarmerError::from(AuthErrorKind::SessionExpired(code))
            } else {
                FarmerError::NetworkError(format!("token refresh failed: {}", code))
            }
        })?;

        if refreshed.user_id != session.user_id {
            return Err(AuthErrorKind::SessionExpired("token belongs to another user".into()).into());
        }

        let mut updated = session
            .clone()
            .with_tokens(refreshed.id_token, refreshed.refresh_token);
        updated.expires_at = expiry_from(refreshed.expires_in.as_deref());
        self.remember(&updated);
        Ok(updated)
    }
}
