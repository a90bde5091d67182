//! Free-text place lookup.
//!
//! [`Geocoder`] is the seam the search flow talks to; [`NominatimGeocoder`]
//! is the production backend, querying an OpenStreetMap Nominatim server
//! for the single best match.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::geo::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid {field} \"{value}\" in geocoder response")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub point: GeoPoint,
    pub display_name: String,
}

/// Resolves a free-text query into its best-matching coordinate.
///
/// `Ok(None)` means the service answered but had no match.
pub trait Geocoder: Send + Sync {
    fn locate(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}

/// One entry of Nominatim's `jsonv2` search output. Coordinates arrive as
/// decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

pub struct NominatimGeocoder {
    client: Client,
    search_url: String,
}

impl NominatimGeocoder {
    /// Builds a client with the given timeout and `User-Agent`. Nominatim's
    /// usage policy rejects requests without an identifying agent.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            search_url: search_url(base_url),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn locate(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.search_url.clone(),
            });
        }

        let body = response.text()?;
        parse_search_response(&body)
    }
}

fn search_url(base_url: &str) -> String {
    format!("{}/search", base_url.trim_end_matches('/'))
}

/// Extracts the first match from a Nominatim search response body.
pub fn parse_search_response(body: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let latitude = parse_coordinate("lat", &place.lat)?;
    let longitude = parse_coordinate("lon", &place.lon)?;
    Ok(Some(GeocodedPlace {
        point: GeoPoint::new(latitude, longitude),
        display_name: place.display_name,
    }))
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}
