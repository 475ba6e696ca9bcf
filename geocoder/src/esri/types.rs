//! ArcGIS `geocodeAddresses` request and response DTOs.
//!
//! Unmatched entries come back with an empty `address`, a zero score and
//! `"NaN"` coordinates, so most response fields are optional here.

use serde::{Deserialize, Serialize};

use crate::domain::{GeocodeOutcome, GeocodeResult, Provider};
use crate::geocode::lenient::lenient_f64;

/// The `addresses` form parameter: `{"records": [...]}`.
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    pub records: Vec<BatchRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BatchRecord<'a> {
    pub attributes: BatchAttributes<'a>,
}

/// One address in a batch request.
#[derive(Debug, Serialize)]
pub struct BatchAttributes<'a> {
    /// 1-based position within the batch. Echoed back as `ResultID`.
    #[serde(rename = "OBJECTID")]
    pub object_id: u32,

    #[serde(rename = "SingleLine")]
    pub single_line: &'a str,
}

/// Response from `geocodeAddresses`.
///
/// ArcGIS reports failures as a 200 with an `error` object instead of
/// `locations`.
#[derive(Debug, Deserialize)]
pub struct GeocodeAddressesResponse {
    pub locations: Option<Vec<EsriLocation>>,
    pub error: Option<EsriErrorBody>,
}

/// Error envelope embedded in a 200 response.
#[derive(Debug, Deserialize)]
pub struct EsriErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

/// One candidate in the response, tagged with the request's `OBJECTID`.
#[derive(Debug, Clone, Deserialize)]
pub struct EsriLocation {
    pub attributes: LocationAttributes,

    pub location: Option<EsriPoint>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,

    /// Matched address; empty when the locator found nothing.
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationAttributes {
    #[serde(rename = "ResultID")]
    pub result_id: u32,
}

/// A point in the requested spatial reference (4326: x = lon, y = lat).
#[derive(Debug, Clone, Deserialize)]
pub struct EsriPoint {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub y: Option<f64>,
}

impl EsriLocation {
    /// Convert into an outcome. An empty matched address means no match.
    pub fn into_outcome(self) -> Result<GeocodeOutcome, String> {
        let matched_name = self.address.unwrap_or_default();
        if matched_name.is_empty() {
            return Ok(GeocodeOutcome::NoMatch);
        }

        let point = self
            .location
            .ok_or_else(|| format!("match {matched_name:?} has no location"))?;
        let (Some(longitude), Some(latitude)) = (point.x, point.y) else {
            return Err(format!("match {matched_name:?} is missing x/y"));
        };
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(format!("match {matched_name:?} has non-finite coordinates"));
        }

        Ok(GeocodeOutcome::Matched(GeocodeResult {
            latitude,
            longitude,
            score: self.score.unwrap_or(0.0),
            matched_name,
            provider: Provider::Regional,
        }))
    }
}

/// Restore request order and check every request id is answered exactly once.
///
/// The locator does not return candidates in request order.
pub fn reorder_locations(
    mut locations: Vec<EsriLocation>,
    expected: usize,
) -> Result<Vec<EsriLocation>, String> {
    locations.sort_by_key(|loc| loc.attributes.result_id);

    if locations.len() != expected {
        return Err(format!(
            "expected {expected} locations, got {}",
            locations.len()
        ));
    }

    for (idx, loc) in locations.iter().enumerate() {
        let want = idx as u32 + 1;
        if loc.attributes.result_id != want {
            return Err(format!(
                "expected ResultID {want}, found {}",
                loc.attributes.result_id
            ));
        }
    }

    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(result_id: u32, address: &str) -> EsriLocation {
        EsriLocation {
            attributes: LocationAttributes { result_id },
            location: Some(EsriPoint {
                x: Some(-90.19),
                y: Some(38.62),
            }),
            score: Some(100.0),
            address: Some(address.to_string()),
        }
    }

    #[test]
    fn payload_shape() {
        let payload = BatchPayload {
            records: vec![BatchRecord {
                attributes: BatchAttributes {
                    object_id: 1,
                    single_line: "100 S Broadway",
                },
            }],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "records": [{"attributes": {"OBJECTID": 1, "SingleLine": "100 S Broadway"}}]
            })
        );
    }

    #[test]
    fn parse_matched_and_unmatched() {
        let json = r#"{
            "spatialReference": {"wkid": 4326, "latestWkid": 4326},
            "locations": [
                {
                    "address": "100 S BROADWAY",
                    "location": {"x": -90.1887, "y": 38.6264},
                    "score": 100,
                    "attributes": {"ResultID": 1, "Status": "M", "Score": 100}
                },
                {
                    "address": "",
                    "location": {"x": "NaN", "y": "NaN"},
                    "score": 0,
                    "attributes": {"ResultID": 2, "Status": "U"}
                }
            ]
        }"#;

        let response: GeocodeAddressesResponse = serde_json::from_str(json).unwrap();
        let mut locations = response.locations.unwrap().into_iter();

        let GeocodeOutcome::Matched(result) = locations.next().unwrap().into_outcome().unwrap()
        else {
            panic!("expected a match");
        };
        assert_eq!(result.latitude, 38.6264);
        assert_eq!(result.longitude, -90.1887);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.matched_name, "100 S BROADWAY");
        assert_eq!(result.provider, Provider::Regional);

        assert_eq!(
            locations.next().unwrap().into_outcome().unwrap(),
            GeocodeOutcome::NoMatch
        );
    }

    #[test]
    fn parse_error_envelope() {
        let json = r#"{"error": {"code": 498, "message": "Invalid token.", "details": []}}"#;
        let response: GeocodeAddressesResponse = serde_json::from_str(json).unwrap();

        assert!(response.locations.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, 498);
        assert_eq!(error.message, "Invalid token.");
    }

    #[test]
    fn match_without_coordinates_rejected() {
        let mut loc = location(1, "100 S BROADWAY");
        loc.location = Some(EsriPoint {
            x: Some(f64::NAN),
            y: Some(38.0),
        });
        assert!(loc.into_outcome().is_err());
    }

    #[test]
    fn reorder_sorts_by_result_id() {
        let shuffled = vec![location(3, "c"), location(1, "a"), location(2, "b")];

        let ordered = reorder_locations(shuffled, 3).unwrap();

        let names: Vec<_> = ordered
            .into_iter()
            .map(|l| l.address.unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn reorder_rejects_missing_or_duplicate_ids() {
        let missing = vec![location(1, "a"), location(3, "c")];
        assert!(reorder_locations(missing, 2).is_err());

        let duplicate = vec![location(1, "a"), location(1, "a")];
        assert!(reorder_locations(duplicate, 2).is_err());

        let short = vec![location(1, "a")];
        assert!(reorder_locations(short, 2).is_err());
    }
}
