//! Earth Engine client for vegscope
//!
//! All pixel work (collection filtering, compositing, NDVI, masking, region
//! reductions and tile rendering) happens on the Earth Engine servers. This
//! crate authenticates a service account, builds expression graphs and posts
//! them to the REST API.
//!
//! # Modules
//!
//! - [`credentials`]: Service-account key loading (secrets file or key file)
//! - [`auth`]: JWT assertion and cached bearer tokens
//! - [`expr`]: Expression graph builder
//! - [`client`]: `value:compute` and `maps` calls

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod expr;

pub use client::{Client, MapId};
pub use credentials::{CredentialSource, ServiceAccountKey};
pub use error::{Error, Result};
pub use expr::{Computed, Dictionary, EeGeometry, Expression, Filter, Image, ImageCollection, Number, Reducer};
