//! vegscope server crate.
//!
//! Serves the single-page NDVI tool and the JSON endpoints behind it. Imagery
//! work is delegated to Earth Engine through `vegscope-ndvi`, place search to
//! Nominatim through `vegscope-geocode`; this crate only holds per-tab
//! drawing state and turns outcomes into notices.

pub mod config;
pub mod notice;
pub mod page;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use notice::{ApiError, Level, Notice};
pub use routes::router;
pub use session::{start_session_sweeper, SessionStore};
pub use state::{AppState, Imagery};
