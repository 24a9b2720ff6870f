//! Messages shown to the user, and the mapping from internal errors to them

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vegscope_ndvi::AnalysisError;

pub const NO_SEARCH_RESULTS: &str = "No results found for the search.";
pub const NOT_DRAWN: &str = "Draw a region on the map to analyse.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// A free-text message with a severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Level::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Level::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Level::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Level::Error, text)
    }

    fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Body of every failed API call
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub notice: Notice,
}

/// A failed request: status code plus the notice to display
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub notice: Notice,
}

impl ApiError {
    pub fn new(status: StatusCode, notice: Notice) -> Self {
        Self { status, notice }
    }

    pub fn unknown_session(id: &Uuid) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            Notice::error(format!("Unknown or expired session {id}")),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { notice: self.notice })).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let text = err.to_string();
        match err {
            AnalysisError::NoImagery { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, Notice::warning(text))
            }
            AnalysisError::NdviThresholdOutOfRange(_)
            | AnalysisError::CloudLimitOutOfRange(_)
            | AnalysisError::InvalidCenter { .. }
            | AnalysisError::InvertedDateRange { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, Notice::error(text))
            }
            AnalysisError::Geometry(_) | AnalysisError::Region(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, Notice::error(text))
            }
            AnalysisError::Unavailable(_) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, Notice::error(text))
            }
            AnalysisError::Service(_) => ApiError::new(StatusCode::BAD_GATEWAY, Notice::error(text)),
        }
    }
}

impl From<vegscope_geocode::Error> for ApiError {
    fn from(err: vegscope_geocode::Error) -> Self {
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            Notice::error(format!("Place search failed: {err}")),
        )
    }
}
