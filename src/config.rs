//! Application configuration
//!
//! Defaults are usable for everything except the Firebase credentials,
//! which come from `config.toml` or the environment.

use crate::{FarmerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "farmerai";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

pub const ENV_CONFIG_PATH: &str = "FARMERAI_CONFIG";
pub const ENV_ANALYSIS_URL: &str = "FARMERAI_ANALYSIS_URL";
pub const ENV_FIREBASE_API_KEY: &str = "FARMERAI_FIREBASE_API_KEY";
pub const ENV_FIREBASE_PROJECT: &str = "FARMERAI_FIREBASE_PROJECT";

/// Remote analysis endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub base_url: String,
    /// Request timeout; `None` keeps the HTTP client default
    pub timeout_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://farmermobile.onrender.com".to_string(),
            timeout_secs: None,
        }
    }
}

/// Firebase Auth and Firestore over REST
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub identity_url: String,
    pub secure_token_url: String,
    pub firestore_url: String,
    pub history_collection: String,
    pub users_collection: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: "farmerai-74776".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            secure_token_url: "https://securetoken.googleapis.com".to_string(),
            firestore_url: "https://firestore.googleapis.com".to_string(),
            history_collection: "history".to_string(),
            users_collection: "users".to_string(),
        }
    }
}

/// Home-screen weather card
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Used whenever the device location is unavailable
    pub default_latitude: f64,
    pub default_longitude: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.open-meteo.com".to_string(),
            // Kano
            default_latitude: 12.0022,
            default_longitude: 8.5920,
        }
    }
}

/// Spoken narration of analysis results
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    pub enabled: bool,
    /// Path to the VITS ONNX model
    pub model_path: String,
    /// Path to the model's tokens file
    pub tokens_path: String,
    pub lexicon_path: Option<String>,
    pub data_dir: Option<String>,
    pub language: String,
    pub pitch: f32,
    /// Speech rate (1.0 = normal)
    pub rate: f32,
    pub speaker_id: i32,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: String::new(),
            tokens_path: String::new(),
            lexicon_path: None,
            data_dir: None,
            language: "ha".to_string(),
            pitch: 1.0,
            rate: 0.9,
            speaker_id: 0,
        }
    }
}

/// Image reduction applied by the picker before upload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Longest edge after downscaling, in pixels
    pub max_dimension: u32,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            jpeg_quality: 50,
        }
    }
}

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub firebase: FirebaseConfig,
    pub weather: WeatherConfig,
    pub narration: NarrationConfig,
    pub picker: PickerConfig,
    /// Where the signed-in session is persisted; defaults to the data dir
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!("No configuration at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|e| FarmerError::ConfigError(format!("Invalid config.toml: {}", e)))
    }

    /// `$FARMERAI_CONFIG`, else `<config_dir>/farmerai/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Resolved location of the persisted session
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join(SESSION_FILE)))
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_ANALYSIS_URL) {
            self.analysis.base_url = url;
        }
        if let Some(key) = lookup(ENV_FIREBASE_API_KEY) {
            self.firebase.api_key = key;
        }
        if let Some(project) = lookup(ENV_FIREBASE_PROJECT) {
            self.firebase.project_id = project;
        }
    }

    pub fn with_firebase(mut self, api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        self.firebase.api_key = api_key.into();
        self.firebase.project_id = project_id.into();
        self
    }

    /// Narrate nothing (no TTS model required)
    pub fn without_narration(mut self) -> Self {
        self.narration.enabled = false;
        self
    }

    pub fn without_weather(mut self) -> Self {
        self.weather.enabled = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.analysis.base_url.starts_with("http://")
            && !self.analysis.base_url.starts_with("https://")
        {
            return Err(FarmerError::ConfigError(format!(
                "Analysis URL must be http(s): {:?}",
                self.analysis.base_url
            )));
        }

        if self.firebase.api_key.trim().is_empty() {
            return Err(FarmerError::ConfigError(format!(
                "Firebase API key is required (set {} or [firebase] api_key)",
                ENV_FIREBASE_API_KEY
            )));
        }

        if self.firebase.project_id.trim().is_empty() {
            return Err(FarmerError::ConfigError("Firebase project id is required".into()));
        }

        if self.picker.max_dimension == 0 {
            return Err(FarmerError::ConfigError("picker.max_dimension must be > 0".into()));
        }

        if !(1..=100).contains(&self.picker.jpeg_quality) {
            return Err(FarmerError::ConfigError(format!(
                "picker.jpeg_quality must be 1-100, got {}",
                self.picker.jpeg_quality
            )));
        }

        // Missing model files are not fatal: narration falls back to silence
        if self.narration.enabled && self.narration.rate <= 0.0 {
            return Err(FarmerError::ConfigError("narration.rate must be > 0".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> AppConfig {
        AppConfig::default()
            .with_firebase("test-key", "test-project")
            .without_narration()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.base_url, "https://farmermobile.onrender.com");
        assert!(config.analysis.timeout_secs.is_none());
        assert_eq!(config.firebase.history_collection, "history");
        assert_eq!(config.narration.language, "ha");
        assert!((config.narration.rate - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.picker.jpeg_quality, 50);
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = AppConfig::default().without_narration();
        assert!(matches!(config.validate(), Err(FarmerError::ConfigError(_))));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_bad_quality_rejected() {
        let mut config = valid();
        config.picker.jpeg_quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_narration_without_model_is_allowed() {
        let mut config = valid();
        config.narration.enabled = true;
        assert!(config.validate().is_ok());

        config.narration.rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [analysis]
            base_url = "http://localhost:8000"
            timeout_secs = 30

            [picker]
            jpeg_quality = 70
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.base_url, "http://localhost:8000");
        assert_eq!(config.analysis.timeout_secs, Some(30));
        assert_eq!(config.picker.jpeg_quality, 70);
        assert_eq!(config.picker.max_dimension, 1024);
        assert_eq!(config.weather, WeatherConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[analysis\nbase_url = 1").unwrap_err();
        assert!(matches!(err, FarmerError::ConfigError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_ANALYSIS_URL, "http://127.0.0.1:9000"),
            (ENV_FIREBASE_API_KEY, "env-key"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.analysis.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.firebase.api_key, "env-key");
        assert_eq!(config.firebase.project_id, "farmerai-74776");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[firebase]\napi_key = \"file-key\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.firebase.api_key, "file-key");
    }

    #[test]
    fn test_explicit_session_path() {
        let mut config = AppConfig::default();
        config.session_file = Some(PathBuf::from("/tmp/farmerai-session.json"));
        assert_eq!(
            config.session_path(),
            Some(PathBuf::from("/tmp/farmerai-session.json"))
        );
    }
}
