//! Regional-first, global-fallback geocoding.

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use super::{BatchGeocoder, GeocodeError, SingleGeocoder, batched};
use crate::domain::{GeocodeOutcome, GeocodeResult};

/// Combines a batch geocoder with a single-address fallback.
///
/// Every address goes to the regional provider first, unconditionally.
/// An address the regional provider cannot match is retried once against
/// the global provider. The global provider is never consulted for an
/// address the regional provider matched, and there is no fallback in the
/// other direction.
#[derive(Debug, Clone)]
pub struct CascadeCoordinator<R, G> {
    regional: R,
    global: G,
}

impl<R: BatchGeocoder, G: SingleGeocoder> CascadeCoordinator<R, G> {
    pub fn new(regional: R, global: G) -> Self {
        Self { regional, global }
    }

    pub fn regional(&self) -> &R {
        &self.regional
    }

    pub fn global(&self) -> &G {
        &self.global
    }

    /// Check an address against the regional provider's input contract.
    pub fn validate_address(&self, address: &str) -> Result<(), GeocodeError> {
        self.regional.validate_address(address)
    }

    /// Geocode `addresses`, yielding one entry per address in input order.
    ///
    /// `None` means neither provider matched. Results are produced lazily,
    /// so each one can be consumed before the next lookup starts.
    pub fn geocode<'a>(
        &'a self,
        addresses: &'a [String],
    ) -> impl Stream<Item = Result<Option<GeocodeResult>, GeocodeError>> + 'a {
        stream::iter(addresses)
            .zip(batched(&self.regional, addresses))
            .then(move |(address, regional)| self.resolve(address, regional))
    }

    /// Geocode `addresses` and collect the results.
    pub async fn geocode_all(
        &self,
        addresses: &[String],
    ) -> Result<Vec<Option<GeocodeResult>>, GeocodeError> {
        self.geocode(addresses).try_collect().await
    }

    async fn resolve(
        &self,
        address: &str,
        regional: Result<GeocodeOutcome, GeocodeError>,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        match regional? {
            GeocodeOutcome::Matched(result) => Ok(Some(result)),
            GeocodeOutcome::NoMatch => {
                debug!(address, "no regional match, trying global provider");
                let outcome = self.global.geocode_one(address).await?;
                if !outcome.is_match() {
                    warn!(address, "no provider matched address");
                }
                Ok(outcome.into_result())
            }
        }
    }
}
