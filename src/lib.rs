pub mod analysis;
pub mod audio;
pub mod auth;
pub mod capture;
pub mod config;
pub mod history;
pub mod integration;
pub mod session;
pub mod speech;
pub mod store;
pub mod ui;
pub mod utils;
pub mod weather;

use thiserror::Error;

pub use auth::AuthErrorKind;

#[derive(Error, Debug, Clone)]
pub enum FarmerError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Capture flow busy: {0}")]
    Busy(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Endpoint returned HTTP {status}: {detail}")]
    EndpointError { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Picker error: {0}")]
    PickerError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Auth error: {0}")]
    AuthError(AuthErrorKind),

    #[error("No signed-in session")]
    NotSignedIn,

    #[error("Document store error: {0}")]
    StoreError(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Narration error: {0}")]
    NarrationError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Weather error: {0}")]
    WeatherError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for FarmerError {
    fn from(e: std::io::Error) -> Self {
        FarmerError::IOError(e.to_string())
    }
}

impl From<reqwest::Error> for FarmerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FarmerError::MalformedResponse(e.to_string())
        } else {
            FarmerError::NetworkError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FarmerError {
    fn from(e: serde_json::Error) -> Self {
        FarmerError::MalformedResponse(e.to_string())
    }
}

impl From<AuthErrorKind> for FarmerError {
    fn from(kind: AuthErrorKind) -> Self {
        FarmerError::AuthError(kind)
    }
}

impl FarmerError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Startup and wiring problems need a restart or a config fix
            FarmerError::ConfigError(_) => false,
            FarmerError::ChannelError(_) => false,
            FarmerError::ModelLoadError(_) => false,
            FarmerError::AudioDeviceError(_) => false,
            FarmerError::IOError(_) => false,
            // Everything else degrades to an idle UI awaiting the next action
            _ => true,
        }
    }

    /// Get the alert text shown to the farmer
    pub fn user_message(&self) -> String {
        match self {
            FarmerError::ValidationError(_) => {
                "Da fatan ka zaɓi hoto ko ka rubuta tambaya.".to_string()
            }
            FarmerError::Busy(_) => "Ana kan bincike, da fatan a jira.".to_string(),
            FarmerError::NetworkError(_)
            | FarmerError::EndpointError { .. }
            | FarmerError::MalformedResponse(_) => {
                "Ba a samu damar tuntuɓar FarmerAI ba.".to_string()
            }
            FarmerError::PickerError(_) => "Ba a samu damar ɗauko hoton ba.".to_string(),
            FarmerError::PermissionDenied(_) => {
                "Ba a ba da izinin amfani da wannan na'ura ba.".to_string()
            }
            FarmerError::AuthError(kind) => kind.user_message(),
            FarmerError::NotSignedIn => "Da fatan ka shiga account ɗinka.".to_string(),
            FarmerError::ConfigError(_) => {
                "Akwai matsala a saitunan manhajar.".to_string()
            }
            _ => "An samu matsala, da fatan a sake gwadawa.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FarmerError>;
