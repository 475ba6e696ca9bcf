//! Provider abstractions and the cascading geocode strategy.
//!
//! The regional provider is consulted first for every address, in batches.
//! Only addresses it fails to match are sent, one at a time, to the global
//! provider. Output order always matches input order.

mod cascade;
mod error;
pub(crate) mod lenient;


use futures::stream::{self, Stream, TryStreamExt};
use tracing::info;

use crate::domain::{Batch, GeocodeOutcome, Provider};

pub use cascade::CascadeCoordinator;
pub use error::GeocodeError;

/// A geocoder that resolves many addresses in one call.
pub trait BatchGeocoder {
    /// Maximum number of addresses per call.
    fn batch_size(&self) -> usize;

    /// Check that an address satisfies this provider's input contract.
    ///
    /// Called for every address before any network traffic.
    fn validate_address(&self, _address: &str) -> Result<(), GeocodeError> {
        Ok(())
    }

    /// Geocode one batch.
    ///
    /// Must return exactly one outcome per address, in the batch's order.
    async fn geocode_batch(&self, batch: Batch<'_>) -> Result<Vec<GeocodeOutcome>, GeocodeError>;
}

/// A geocoder that resolves one address per call.
pub trait SingleGeocoder {
    async fn geocode_one(&self, address: &str) -> Result<GeocodeOutcome, GeocodeError>;
}

/// Run a batch geocoder over the whole address sequence.
///
/// Yields one outcome per address, in input order. Batches are requested
/// lazily and strictly in sequence: batch N+1 is not sent until every
/// result of batch N has been consumed. The stream ends after the first
/// error.
pub fn batched<'a, R: BatchGeocoder>(
    geocoder: &'a R,
    addresses: &'a [String],
) -> impl Stream<Item = Result<GeocodeOutcome, GeocodeError>> + 'a {
    let batches = Batch::partition(addresses, geocoder.batch_size());

    stream::try_unfold(batches, move |mut batches| async move {
        let Some(batch) = batches.next() else {
            return Ok(None);
        };

        info!(%batch, "geocoding with regional provider");
        let outcomes = geocoder.geocode_batch(batch).await?;

        if outcomes.len() != batch.len() {
            return Err(GeocodeError::parse(
                Provider::Regional,
                batch.to_string(),
                format!("expected {} results, got {}", batch.len(), outcomes.len()),
                None,
            ));
        }

        let outcomes = stream::iter(outcomes.into_iter().map(Ok::<_, GeocodeError>));
        Ok::<_, GeocodeError>(Some((outcomes, batches)))
    })
    .try_flatten()
}
