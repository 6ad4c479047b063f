//! Wiring of concrete services from configuration

use crate::analysis::{AnalysisService, HttpAnalysisClient};
use crate::auth::{AuthService, FirebaseAuth};
use crate::capture::{CaptureServices, FileDialogPicker, ImagePicker};
use crate::config::AppConfig;
use crate::history::{FirestoreHistoryStore, HistoryStore};
use crate::session::SessionReader;
use crate::speech::{NarrationOptions, NarrationPipeline, Narrator, SilentNarrator, TTSConfig};
use crate::store::FirestoreClient;
use crate::weather::{Coordinates, FixedLocation, LocationProvider, WeatherClient};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Every external capability the orchestrator drives
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<dyn AuthService>,
    pub capture: CaptureServices,
    /// `None` when the weather card is disabled
    pub weather: Option<WeatherClient>,
    pub location: Arc<dyn LocationProvider>,
    pub narration: NarrationOptions,
}

impl AppServices {
    /// Production services. Narration degrades to silence when the model or
    /// the output device is unavailable.
    pub fn from_config(config: &AppConfig, session: SessionReader) -> Result<Self> {
        config.validate()?;

        let firestore = FirestoreClient::new(&config.firebase, session);

        let auth: Arc<dyn AuthService> = Arc::new(FirebaseAuth::new(
            config.firebase.clone(),
            config.session_path(),
            firestore.clone(),
        ));
        let analysis: Arc<dyn AnalysisService> =
            Arc::new(HttpAnalysisClient::from_config(&config.analysis));
        let history: Arc<dyn HistoryStore> = Arc::new(FirestoreHistoryStore::new(
            firestore,
            config.firebase.history_collection.clone(),
        ));
        let picker: Arc<dyn ImagePicker> = Arc::new(FileDialogPicker::new(config.picker.clone()));

        let weather = config
            .weather
            .enabled
            .then(|| WeatherClient::new(&config.weather));
        let location: Arc<dyn LocationProvider> = Arc::new(FixedLocation(Coordinates {
            latitude: config.weather.default_latitude,
            longitude: config.weather.default_longitude,
        }));

        Ok(Self {
            auth,
            capture: CaptureServices {
                analysis,
                history,
                narrator: build_narrator(config),
                picker,
            },
            weather,
            location,
            narration: NarrationOptions::from(&config.narration),
        })
    }
}

fn build_narrator(config: &AppConfig) -> Arc<dyn Narrator> {
    if !config.narration.enabled {
        info!("Narration disabled by configuration");
        return Arc::new(SilentNarrator);
    }

    match NarrationPipeline::start(TTSConfig::from(&config.narration)) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            warn!("Narration unavailable, continuing silently: {}", e);
            Arc::new(SilentNarrator)
        }
    }
}
