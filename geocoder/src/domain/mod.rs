//! Domain types for the geocoder.
//!
//! Results are modelled as an explicit outcome per address, so "no match"
//! never has to be inferred from an empty string.

mod batch;
mod result;

pub use batch::{Batch, MAX_BATCH_SIZE};
pub use result::{GeocodeOutcome, GeocodeResult, Provider};
