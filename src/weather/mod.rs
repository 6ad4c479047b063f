//! Current-weather card for the home screen
//!
//! Any failure degrades to [`WeatherReport::fallback`]; the card never
//! shows an error.

use crate::config::WeatherConfig;
use crate::{FarmerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeatherStatus {
    #[default]
    Clear,
    Cloudy,
    Rainy,
}

impl WeatherStatus {
    /// Open-Meteo WMO weather code
    pub fn from_code(code: i64) -> Self {
        if code <= 1 {
            WeatherStatus::Clear
        } else if code < 51 {
            WeatherStatus::Cloudy
        } else {
            WeatherStatus::Rainy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherStatus::Clear => "Hasken Rana",
            WeatherStatus::Cloudy => "Gajimare",
            WeatherStatus::Rainy => "Ruwan Sama",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub status: WeatherStatus,
}

impl WeatherReport {
    /// Shown until the first fetch completes, and after any failure
    pub fn fallback() -> Self {
        Self {
            temperature_c: 32.0,
            status: WeatherStatus::Clear,
        }
    }

    pub fn temperature_label(&self) -> String {
        format!("{}°C", self.temperature_c.round() as i64)
    }
}

impl Default for WeatherReport {
    fn default() -> Self {
        Self::fallback()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Source of the device position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// `Err` covers both denied permission and unavailable hardware
    async fn current(&self) -> Result<Coordinates>;
}

/// Desktop builds have no positioning hardware; always the configured point
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    weathercode: i64,
}

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    default_location: Coordinates,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_location: Coordinates {
                latitude: config.default_latitude,
                longitude: config.default_longitude,
            },
        }
    }

    pub fn default_location(&self) -> Coordinates {
        self.default_location
    }

    pub async fn fetch(&self, at: Coordinates) -> Result<WeatherReport> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FarmerError::WeatherError(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let forecast: ForecastResponse = response.json().await?;
        let report = WeatherReport {
            temperature_c: forecast.current_weather.temperature,
            status: WeatherStatus::from_code(forecast.current_weather.weathercode),
        };
        debug!("Weather at {:?}: {:?}", at, report);
        Ok(report)
    }

    /// Weather at the device location, else the default location, else the
    /// fallback report
    pub async fn report(&self, location: &dyn LocationProvider) -> WeatherReport {
        let at = match location.current().await {
            Ok(at) => at,
            Err(e) => {
                debug!("Location unavailable ({}), using default", e);
                self.default_location
            }
        };

        match self.fetch(at).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Weather fetch failed: {}", e);
                WeatherReport::fallback()
            }
        }
    }
}
