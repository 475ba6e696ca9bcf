//! Record pipeline error types.

use crate::esri::MissingLocality;
use crate::geocode::GeocodeError;

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input line is not a JSON object
    #[error("line {line}: invalid record: {message}")]
    InvalidRecord { line: usize, message: String },

    /// Record has no string `location` field
    #[error("line {line}: record has no string \"location\" field")]
    MissingLocation { line: usize },

    /// Record already carries output fields
    #[error("line {line}: input contains reserved fields: {}", fields.join(", "))]
    ReservedFieldConflict { line: usize, fields: Vec<String> },

    /// Address cannot be sent to the regional provider
    #[error("line {line}: {source}")]
    MalformedAddress {
        line: usize,
        #[source]
        source: MissingLocality,
    },

    /// A provider call failed
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// Serializing an output record failed
    #[error("failed to serialize output record: {0}")]
    Output(#[from] serde_json::Error),
}
