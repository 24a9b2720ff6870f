//! Earth Engine REST client
//!
//! Two endpoints are enough for this tool: `value:compute` evaluates an
//! expression and returns its JSON value, and `maps` registers a visualised
//! image and returns a name from which XYZ tile URLs are built.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use vegscope_map::{TileLayer, VisParams};

use crate::auth::TokenProvider;
use crate::credentials::ServiceAccountKey;
use crate::error::{Error, Result};
use crate::expr::Expression;

/// Public REST endpoint
pub const API_BASE: &str = "https://earthengine.googleapis.com/v1";

/// Handle of an image registered for tiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapId {
    /// Resource name, `projects/{project}/maps/{id}`
    pub name: String,
    /// API base the name is relative to
    pub base_url: String,
}

impl MapId {
    pub fn tile_url_template(&self) -> String {
        format!("{}/{}/tiles/{{z}}/{{x}}/{{y}}", self.base_url, self.name)
    }

    pub fn into_layer(self, name: impl Into<String>, attribution: impl Into<String>) -> TileLayer {
        TileLayer::new(self.tile_url_template(), attribution, name)
    }
}

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Body of a `maps` request
pub fn map_request(expression: Expression, vis: &VisParams) -> Value {
    let mut visualization = json!({
        "ranges": [{ "min": vis.min, "max": vis.max }],
    });
    if !vis.palette.is_empty() {
        visualization["paletteColors"] = json!(vis.palette);
    }

    let mut body = json!({
        "expression": expression,
        "fileFormat": "AUTO_JPEG_PNG",
        "visualizationOptions": visualization,
    });
    if !vis.bands.is_empty() {
        body["bandIds"] = json!(vis.bands);
    }
    body
}

/// Authenticated connection to one Earth Engine project
pub struct Client {
    http: reqwest::Client,
    tokens: TokenProvider,
    project: String,
    base_url: String,
}

impl Client {
    /// Connect with a service-account key
    ///
    /// The cloud project defaults to the key's `project_id`.
    pub fn new(key: ServiceAccountKey, project: Option<String>, user_agent: &str) -> Result<Self> {
        let project = project
            .or_else(|| key.project_id.clone())
            .ok_or_else(|| {
                Error::Credentials("no Earth Engine project configured and key has no project_id".into())
            })?;

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        let tokens = TokenProvider::new(key, http.clone());

        Ok(Self {
            http,
            tokens,
            project,
            base_url: API_BASE.to_string(),
        })
    }

    /// Point the client at another API root (used against local fakes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn service_account(&self) -> &str {
        &self.tokens.key().client_email
    }

    /// Check the credentials by fetching an access token
    pub async fn authenticate(&self) -> Result<()> {
        self.tokens.access_token().await.map(|_| ())
    }

    /// Evaluate an expression and return its value
    pub async fn compute(&self, expression: Expression) -> Result<Value> {
        let url = format!("{}/projects/{}/value:compute", self.base_url, self.project);
        let body = json!({ "expression": expression });

        let response: ComputeResponse = self.post(&url, &body).await?;
        Ok(response.result)
    }

    /// Register a visualised image for tiling
    pub async fn map_id(&self, expression: Expression, vis: &VisParams) -> Result<MapId> {
        let url = format!("{}/projects/{}/maps", self.base_url, self.project);
        let body = map_request(expression, vis);

        let response: MapResponse = self.post(&url, &body).await?;
        Ok(MapId {
            name: response.name,
            base_url: self.base_url.clone(),
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, url: &str, body: &Value) -> Result<T> {
        let token = self.tokens.access_token().await?;

        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            tracing::warn!("Earth Engine returned {}: {}", status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Computed, Image};

    #[test]
    fn test_tile_url_template() {
        let map_id = MapId {
            name: "projects/demo/maps/abc".into(),
            base_url: API_BASE.into(),
        };
        assert_eq!(
            map_id.tile_url_template(),
            "https://earthengine.googleapis.com/v1/projects/demo/maps/abc/tiles/{z}/{x}/{y}"
        );
    }

    #[test]
    fn test_layer_keeps_given_attribution() {
        let map_id = MapId {
            name: "projects/demo/maps/abc".into(),
            base_url: "http://localhost/v1".into(),
        };
        let layer = map_id.into_layer("NDVI", "NDVI via Google Earth Engine");
        assert_eq!(layer.name, "NDVI");
        assert_eq!(layer.attribution, "NDVI via Google Earth Engine");
        assert_eq!(
            layer.url_template,
            "http://localhost/v1/projects/demo/maps/abc/tiles/{z}/{x}/{y}"
        );
    }

    #[test]
    fn test_rgb_map_request() {
        let body = map_request(Image::constant(1.0).to_expression(), &VisParams::rgb());
        assert_eq!(body["bandIds"], json!(["B4", "B3", "B2"]));
        assert_eq!(body["visualizationOptions"]["ranges"], json!([{"min": 0.0, "max": 0.3}]));
        assert!(body["visualizationOptions"].get("paletteColors").is_none());
    }

    #[test]
    fn test_ndvi_map_request() {
        let body = map_request(Image::constant(1.0).to_expression(), &VisParams::ndvi(0.3));
        assert!(body.get("bandIds").is_none());
        assert_eq!(
            body["visualizationOptions"]["paletteColors"],
            json!(["blue", "white", "green"])
        );
        assert_eq!(body["visualizationOptions"]["ranges"][0]["min"], json!(0.3));
    }
}
