//! The seam between the analysis pipeline and the imagery service

use async_trait::async_trait;
use serde_json::Value;
use vegscope_earthengine::{Client, Expression};
use vegscope_map::{TileLayer, VisParams};

/// Remote service that evaluates expressions and serves tiles
#[async_trait]
pub trait ImageryBackend: Send + Sync {
    /// Evaluate an expression to a JSON value
    async fn compute(&self, expression: Expression) -> vegscope_earthengine::Result<Value>;

    /// Register a visualised image and return its tile layer, credited with `attribution`
    async fn tile_layer(
        &self,
        expression: Expression,
        vis: &VisParams,
        name: &str,
        attribution: &str,
    ) -> vegscope_earthengine::Result<TileLayer>;
}

#[async_trait]
impl ImageryBackend for Client {
    async fn compute(&self, expression: Expression) -> vegscope_earthengine::Result<Value> {
        Client::compute(self, expression).await
    }

    async fn tile_layer(
        &self,
        expression: Expression,
        vis: &VisParams,
        name: &str,
        attribution: &str,
    ) -> vegscope_earthengine::Result<TileLayer> {
        let map_id = self.map_id(expression, vis).await?;
        Ok(map_id.into_layer(name, attribution))
    }
}
