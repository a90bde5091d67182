use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::map_view::{MAX_ZOOM, MIN_ZOOM};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("initial latitude {0} is outside -90..=90")]
    Latitude(f64),

    #[error("initial longitude {0} is outside -180..=180")]
    Longitude(f64),

    #[error("initial zoom {0} is outside 2..=19")]
    Zoom(f64),

    #[error("geocoder timeout must be at least one second")]
    Timeout,

    #[error("user agent must not be empty")]
    UserAgent,
}

/// Start-up settings. Every flag can also come from the environment or a
/// `.env` file.
#[derive(Debug, Clone, Parser)]
#[command(name = "map_distance")]
#[command(about = "Drop two markers on a map and measure the distance between them")]
pub struct AppConfig {
    /// Latitude of the initial map center
    #[arg(long, env = "MAP_DISTANCE_LAT", default_value_t = 40.7128, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the initial map center
    #[arg(long, env = "MAP_DISTANCE_LON", default_value_t = -74.0060, allow_negative_numbers = true)]
    pub lon: f64,

    /// Initial zoom level
    #[arg(long, env = "MAP_DISTANCE_ZOOM", default_value_t = 10.0)]
    pub zoom: f64,

    /// Base URL of the Nominatim server used for location search
    #[arg(long, env = "MAP_DISTANCE_GEOCODER_URL", default_value = "https://nominatim.openstreetmap.org")]
    pub geocoder_url: String,

    /// User-Agent sent to the geocoder
    #[arg(long, env = "MAP_DISTANCE_USER_AGENT", default_value = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Seconds before a location search gives up
    #[arg(long, env = "MAP_DISTANCE_GEOCODER_TIMEOUT_SECS", default_value_t = 10)]
    pub geocoder_timeout_secs: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "MAP_DISTANCE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns the first setting that is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ConfigError::Latitude(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(ConfigError::Longitude(self.lon));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom) {
            return Err(ConfigError::Zoom(self.zoom));
        }
        if self.geocoder_timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::UserAgent);
        }
        Ok(())
    }

    pub fn initial_center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout_secs)
    }
}
