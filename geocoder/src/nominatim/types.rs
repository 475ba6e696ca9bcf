//! Nominatim `/search` response DTOs.

use serde::Deserialize;

use crate::domain::{GeocodeResult, Provider};
use crate::geocode::lenient::lenient_f64;

/// One entry of the `jsonv2` search response array.
///
/// Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,

    /// Ranking weight, 0 to 1. Absent for some result classes.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub importance: Option<f64>,

    #[serde(default)]
    pub display_name: String,
}

impl Place {
    /// Convert into a result, rejecting places without usable coordinates.
    pub fn into_result(self) -> Result<GeocodeResult, String> {
        let (Some(latitude), Some(longitude)) = (self.lat, self.lon) else {
            return Err("place is missing lat/lon".to_string());
        };
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(format!("place has non-finite coordinates ({latitude}, {longitude})"));
        }

        Ok(GeocodeResult {
            latitude,
            longitude,
            score: self.importance.unwrap_or(0.0),
            matched_name: self.display_name,
            provider: Provider::Global,
        })
    }
}
