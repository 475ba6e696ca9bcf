//! Geocode results and per-address outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which geocoding service produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Batch-capable geocoder scoped to one jurisdiction (ESRI composite locator).
    Regional,
    /// Single-request geocoder with broad coverage (Nominatim).
    Global,
}

impl Provider {
    /// The tag written to the `geocoder` output field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Regional => "regional",
            Provider::Global => "global",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful match for one address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// WGS84 latitude in degrees.
    pub latitude: f64,
    /// WGS84 longitude in degrees.
    pub longitude: f64,
    /// Provider-specific confidence (ESRI score 0-100, Nominatim importance 0-1).
    pub score: f64,
    /// The address the provider matched.
    pub matched_name: String,
    pub provider: Provider,
}

/// What a provider had to say about a single address.
///
/// "No match" is a legitimate terminal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Matched(GeocodeResult),
    NoMatch,
}

impl GeocodeOutcome {
    /// Returns true if the provider produced a usable match.
    pub fn is_match(&self) -> bool {
        matches!(self, GeocodeOutcome::Matched(_))
    }

    /// Convert into the matched result, if any.
    pub fn into_result(self) -> Option<GeocodeResult> {
        match self {
            GeocodeOutcome::Matched(result) => Some(result),
            GeocodeOutcome::NoMatch => None,
        }
    }
}

impl From<Option<GeocodeResult>> for GeocodeOutcome {
    fn from(result: Option<GeocodeResult>) -> Self {
        result.map_or(GeocodeOutcome::NoMatch, GeocodeOutcome::Matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> GeocodeResult {
        GeocodeResult {
            latitude: 38.627,
            longitude: -90.199,
            score: 100.0,
            matched_name: "100 S BROADWAY".into(),
            provider: Provider::Regional,
        }
    }

    #[test]
    fn provider_tags() {
        assert_eq!(Provider::Regional.as_str(), "regional");
        assert_eq!(Provider::Global.to_string(), "global");
        assert_eq!(
            serde_json::to_value(Provider::Global).unwrap(),
            serde_json::json!("global")
        );
    }

    #[test]
    fn outcome_conversions() {
        let matched = GeocodeOutcome::Matched(result());
        assert!(matched.is_match());
        assert_eq!(matched.into_result(), Some(result()));

        assert!(!GeocodeOutcome::NoMatch.is_match());
        assert_eq!(GeocodeOutcome::NoMatch.into_result(), None);

        assert_eq!(GeocodeOutcome::from(None), GeocodeOutcome::NoMatch);
        assert_eq!(
            GeocodeOutcome::from(Some(result())),
            GeocodeOutcome::Matched(result())
        );
    }
}
