//! HTTP handlers

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use vegscope_geocode::{Place, DEFAULT_LIMIT};
use vegscope_map::{Drawing, GeoCoord, TileLayer};
use vegscope_ndvi::{AnalysisParams, RegionOutcome, RegionReport};

use crate::notice::{ApiError, Notice, NOT_DRAWN, NO_SEARCH_RESULTS};
use crate::page::INDEX_HTML;
use crate::state::AppState;

/// Zoom used when centring the map on a place
pub const DEFAULT_ZOOM: u8 = 10;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/search", get(search_handler))
        .route("/api/sessions/:id/scene", post(scene_handler))
        .route(
            "/api/sessions/:id/drawings",
            put(replace_drawings_handler).delete(clear_drawings_handler),
        )
        .route("/api/sessions/:id/analysis", post(analysis_handler))
        .layer(Extension(state))
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub imagery_ready: bool,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let notice = state.init_error().map(Notice::error);
    Json(HealthResponse {
        status: "ok",
        imagery_ready: notice.is_none(),
        sessions: state.sessions.len(),
        notice,
    })
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: Uuid,
}

pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let id = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreated { id }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub places: Vec<Place>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[instrument(skip(state))]
pub async fn search_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Ok(Json(SearchResponse {
            places: Vec::new(),
            notice: None,
        }));
    }

    let places = state.geocoder.search(query, DEFAULT_LIMIT).await?;
    let notice = if places.is_empty() {
        tracing::warn!("No places found for {:?}", query);
        Some(Notice::warning(NO_SEARCH_RESULTS))
    } else {
        None
    };

    Ok(Json(SearchResponse { places, notice }))
}

#[derive(Debug, Serialize)]
pub struct SceneResponse {
    pub image_count: u64,
    pub center: GeoCoord,
    pub zoom: u8,
    pub rgb_layer: TileLayer,
}

#[instrument(skip(state, params))]
pub async fn scene_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(params): Json<AnalysisParams>,
) -> Result<Json<SceneResponse>, ApiError> {
    if !state.sessions.touch(&id) {
        return Err(ApiError::unknown_session(&id));
    }

    let analyzer = state.analyzer()?;
    let scene = analyzer.scene(&params).await?;
    let rgb_layer = analyzer.rgb_layer(&scene).await?;

    Ok(Json(SceneResponse {
        image_count: scene.image_count,
        center: params.center,
        zoom: DEFAULT_ZOOM,
        rgb_layer,
    }))
}

/// What the draw widget reports after every change
#[derive(Debug, Deserialize)]
pub struct DrawingsUpdate {
    #[serde(default)]
    pub all_drawings: Option<Vec<Drawing>>,
}

#[derive(Debug, Serialize)]
pub struct DrawingsResponse {
    pub drawings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[instrument(skip(state, update))]
pub async fn replace_drawings_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<DrawingsUpdate>,
) -> Result<Json<DrawingsResponse>, ApiError> {
    let drawings = state
        .sessions
        .replace_drawings(&id, update.all_drawings)
        .ok_or_else(|| ApiError::unknown_session(&id))?;

    let selected = state
        .sessions
        .drawings(&id)
        .and_then(|session| session.drawings().last().map(Drawing::has_geometry))
        .unwrap_or(false);

    Ok(Json(DrawingsResponse {
        drawings,
        notice: selected.then(|| Notice::success("Region selected!")),
    }))
}

pub async fn clear_drawings_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.clear_drawings(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::unknown_session(&id))
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisResponse {
    NotDrawn {
        notice: Notice,
    },
    Analysed {
        image_count: u64,
        report: Box<RegionReport>,
    },
}

#[instrument(skip(state, params))]
pub async fn analysis_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(params): Json<AnalysisParams>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let drawings = state
        .sessions
        .drawings(&id)
        .ok_or_else(|| ApiError::unknown_session(&id))?;

    let analyzer = state.analyzer()?;
    let response = match analyzer.analyze_drawn(&params, &drawings).await? {
        RegionOutcome::NotDrawn => AnalysisResponse::NotDrawn {
            notice: Notice::info(NOT_DRAWN),
        },
        RegionOutcome::Analysed {
            image_count,
            report,
        } => AnalysisResponse::Analysed {
            image_count,
            report,
        },
    };

    Ok(Json(response))
}
