//! ESRI ArcGIS batch geocoding client.
//!
//! The regional provider: the City of St. Louis composite locator. It is
//! accurate inside the city, accepts up to 100 addresses per call and has
//! no per-call delay, so it is always tried first.

mod client;
mod normalize;
mod types;

pub use client::{EsriClient, EsriConfig};
pub use normalize::{MissingLocality, strip_home_city};
pub use types::{EsriLocation, GeocodeAddressesResponse, reorder_locations};
