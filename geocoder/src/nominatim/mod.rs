//! Nominatim (OpenStreetMap) geocoding client.
//!
//! The global fallback provider: broad coverage, one address per request,
//! and a hard limit of one request per second per caller.

mod client;
mod pacer;
mod types;

pub use client::{MIN_REQUEST_INTERVAL, NominatimClient, NominatimConfig};
pub use pacer::{Pacer, PacerPermit};
pub use types::Place;
