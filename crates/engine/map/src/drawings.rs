//! Session-scoped drawing state
//!
//! One `DrawingSession` exists per browser session. It starts empty, is
//! overwritten whenever the draw widget reports its shapes, and is emptied by
//! the "clear drawings" action. Only the most recent shape defines the region
//! that gets analysed.

use serde::{Deserialize, Serialize};

use crate::geometry::{Drawing, Geometry, GeometryError};

/// Shapes drawn during one interactive session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingSession {
    drawings: Vec<Drawing>,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the widget's `all_drawings` output
    ///
    /// A `None` output (the widget had nothing to report) leaves the stored
    /// shapes untouched.
    pub fn replace_all(&mut self, drawings: Option<Vec<Drawing>>) {
        if let Some(drawings) = drawings {
            tracing::debug!("Session now holds {} drawing(s)", drawings.len());
            self.drawings = drawings;
        }
    }

    /// Forget every stored shape
    pub fn clear(&mut self) {
        self.drawings.clear();
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    /// The region to analyse: the geometry of the last drawing
    ///
    /// `None` means the region is not drawn yet, either because nothing is
    /// stored or because the last shape has no `"geometry"` key.
    pub fn active_geometry(&self) -> Option<Result<Geometry, GeometryError>> {
        self.drawings.last().and_then(Drawing::geometry)
    }
}
