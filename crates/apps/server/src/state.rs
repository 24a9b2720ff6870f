use std::sync::Arc;
use vegscope_geocode::Geocoder;
use vegscope_ndvi::{AnalysisError, Analyzer};

use crate::session::SessionStore;

/// The imagery service as it came out of startup
#[derive(Clone)]
pub enum Imagery {
    Ready(Analyzer),
    /// Initialisation failed; every imagery request reports this message
    Unavailable(String),
}

/// Shared application state handed to every handler
pub struct AppState {
    pub imagery: Imagery,
    pub geocoder: Arc<dyn Geocoder>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(imagery: Imagery, geocoder: Arc<dyn Geocoder>, sessions: Arc<SessionStore>) -> Self {
        Self {
            imagery,
            geocoder,
            sessions,
        }
    }

    pub fn analyzer(&self) -> Result<&Analyzer, AnalysisError> {
        match &self.imagery {
            Imagery::Ready(analyzer) => Ok(analyzer),
            Imagery::Unavailable(reason) => Err(AnalysisError::Unavailable(reason.clone())),
        }
    }

    /// Startup failure to show on page load, if any
    pub fn init_error(&self) -> Option<String> {
        match &self.imagery {
            Imagery::Ready(_) => None,
            Imagery::Unavailable(reason) => Some(AnalysisError::Unavailable(reason.clone()).to_string()),
        }
    }
}
