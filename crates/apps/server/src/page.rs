//! The single page served at `/`
//!
//! Base map, draw tool and layer switching come from Leaflet and Leaflet.draw
//! loaded from a CDN; the page only talks to the JSON endpoints.

pub const INDEX_HTML: &str = include_str!("page.html");
