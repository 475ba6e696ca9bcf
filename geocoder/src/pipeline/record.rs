//! Input records and the fields the pipeline adds to them.

use serde_json::{Map, Value};

use super::error::PipelineError;
use crate::domain::GeocodeResult;

/// An input record. Field order is preserved through to the output.
pub type Record = Map<String, Value>;

/// Field holding the address to geocode.
pub const LOCATION_FIELD: &str = "location";

/// Fields written by the pipeline, in output order. Input must not contain any.
pub const RESERVED_FIELDS: [&str; 5] = ["lat", "lon", "result_name", "geocode_score", "geocoder"];

/// Parse one JSONL line into a record and its address.
///
/// `line` is the 1-based line number, used in errors.
pub fn parse_record(line: usize, text: &str) -> Result<(Record, String), PipelineError> {
    let record = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => record,
        Ok(other) => {
            return Err(PipelineError::InvalidRecord {
                line,
                message: format!("expected a JSON object, got {}", json_type(&other)),
            });
        }
        Err(e) => {
            return Err(PipelineError::InvalidRecord {
                line,
                message: e.to_string(),
            });
        }
    };

    let conflicts: Vec<String> = RESERVED_FIELDS
        .iter()
        .filter(|field| record.contains_key(**field))
        .map(|field| (*field).to_string())
        .collect();
    if !conflicts.is_empty() {
        return Err(PipelineError::ReservedFieldConflict {
            line,
            fields: conflicts,
        });
    }

    let address = record
        .get(LOCATION_FIELD)
        .and_then(Value::as_str)
        .ok_or(PipelineError::MissingLocation { line })?
        .to_string();

    Ok((record, address))
}

/// Write the reserved fields for `result` onto `record`.
pub fn apply_result(record: &mut Record, result: &GeocodeResult) {
    let [lat, lon, result_name, geocode_score, geocoder] = RESERVED_FIELDS;
    record.insert(lat.to_string(), Value::from(result.latitude));
    record.insert(lon.to_string(), Value::from(result.longitude));
    record.insert(
        result_name.to_string(),
        Value::from(result.matched_name.as_str()),
    );
    record.insert(geocode_score.to_string(), Value::from(result.score));
    record.insert(geocoder.to_string(), Value::from(result.provider.as_str()));
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
