//! Place-name lookup
//!
//! Turns free-text searches into candidate coordinates using the
//! OpenStreetMap Nominatim service. The lookup itself is remote; this crate
//! only builds the query and reads the candidates back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vegscope_map::GeoCoord;

/// Public Nominatim instance
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Candidates shown to the user for one search
pub const DEFAULT_LIMIT: usize = 5;

/// Errors that can occur during a lookup
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure
    #[error("Geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status
    #[error("Geocoder returned status {0}")]
    Status(u16),

    /// A candidate could not be read
    #[error("Unexpected geocoder response: {0}")]
    UnexpectedFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One search candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Full human-readable address
    pub address: String,
    pub coord: GeoCoord,
}

/// Anything that can resolve a place name
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Up to `limit` candidates for `query`; no match is an empty list
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>>;
}

/// Raw Nominatim candidate; coordinates arrive as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl TryFrom<NominatimPlace> for Place {
    type Error = Error;

    fn try_from(raw: NominatimPlace) -> Result<Self> {
        let lat: f64 = raw
            .lat
            .parse()
            .map_err(|_| Error::UnexpectedFormat(format!("bad latitude {:?}", raw.lat)))?;
        let lon: f64 = raw
            .lon
            .parse()
            .map_err(|_| Error::UnexpectedFormat(format!("bad longitude {:?}", raw.lon)))?;

        Ok(Place {
            address: raw.display_name,
            coord: GeoCoord::new(lat, lon),
        })
    }
}

/// Read a Nominatim `format=json` response body
pub fn parse_places(body: &str) -> Result<Vec<Place>> {
    let raw: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| Error::UnexpectedFormat(e.to_string()))?;
    raw.into_iter().map(Place::try_from).collect()
}

/// Nominatim HTTP client
///
/// Nominatim's usage policy requires an identifying user agent.
pub struct Nominatim {
    http: reqwest::Client,
    base_url: String,
}

impl Nominatim {
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            base_url: NOMINATIM_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Geocoder for Nominatim {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Geocoding {:?}", query);

        let limit = limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let places = parse_places(&body)?;
        tracing::debug!("Geocoder returned {} candidate(s)", places.len());
        Ok(places)
    }
}
