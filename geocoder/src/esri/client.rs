//! ArcGIS batch geocoding client for the St. Louis City composite locator.
//!
//! Sends up to 100 addresses per `geocodeAddresses` call. Each address is
//! tagged with its 1-based position in the batch, and the response is put
//! back into request order using the echoed `ResultID`.

use std::time::Duration;

use crate::domain::{Batch, GeocodeOutcome, MAX_BATCH_SIZE, Provider};
use crate::geocode::{BatchGeocoder, GeocodeError};

use super::normalize::strip_home_city;
use super::types::{
    BatchAttributes, BatchPayload, BatchRecord, GeocodeAddressesResponse, reorder_locations,
};

/// Default base URL for the St. Louis City composite locator.
const DEFAULT_BASE_URL: &str =
    "https://maps6.stlouis-mo.gov/arcgis/rest/services/GEOCODERS/COMPOSITE_GEOCODE/GeocodeServer";

/// Output spatial reference: WGS84 lat/lon.
const OUT_SPATIAL_REFERENCE: &str = "4326";

/// Configuration for the ESRI client.
#[derive(Debug, Clone)]
pub struct EsriConfig {
    /// Base URL of the GeocodeServer
    pub base_url: String,
    /// Addresses per request (1 to 100)
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EsriConfig {
    /// Create a config pointing at the production locator.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the batch size, clamped to what the locator accepts.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for EsriConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// ESRI `geocodeAddresses` client.
#[derive(Debug, Clone)]
pub struct EsriClient {
    http: reqwest::Client,
    geocode_url: String,
    batch_size: usize,
}

impl EsriClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EsriConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeocodeError::Client {
                provider: Provider::Regional,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            geocode_url: format!(
                "{}/geocodeAddresses",
                config.base_url.trim_end_matches('/')
            ),
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
        })
    }

    /// Geocode one batch, returning one outcome per address in batch order.
    ///
    /// Any transport, status or shape problem fails the whole batch.
    pub async fn geocode_addresses(
        &self,
        batch: Batch<'_>,
    ) -> Result<Vec<GeocodeOutcome>, GeocodeError> {
        let context = batch.to_string();
        let parse_error = |message: String, body: Option<&str>| {
            GeocodeError::parse(Provider::Regional, &context, message, body)
        };

        let payload = build_payload(batch)?;
        let addresses =
            serde_json::to_string(&payload).map_err(|e| parse_error(e.to_string(), None))?;

        let response = self
            .http
            .post(&self.geocode_url)
            .form(&[
                ("addresses", addresses.as_str()),
                ("category", ""),
                ("sourceCountry", ""),
                ("matchOutOfRange", "true"),
                ("langCode", ""),
                ("locationType", ""),
                ("searchExtent", ""),
                ("outSR", OUT_SPATIAL_REFERENCE),
                ("f", "json"),
            ])
            .send()
            .await
            .map_err(|source| GeocodeError::Request {
                provider: Provider::Regional,
                context: context.clone(),
                source,
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                provider: Provider::Regional,
                context: context.clone(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| GeocodeError::Request {
                provider: Provider::Regional,
                context: context.clone(),
                source,
            })?;

        let parsed: GeocodeAddressesResponse =
            serde_json::from_str(&body).map_err(|e| parse_error(e.to_string(), Some(&body)))?;

        if let Some(error) = parsed.error {
            let mut message = error.message;
            if !error.details.is_empty() {
                message = format!("{message} ({})", error.details.join("; "));
            }
            return Err(GeocodeError::Api {
                provider: Provider::Regional,
                context: context.clone(),
                status: u16::try_from(error.code).unwrap_or(0),
                message,
            });
        }

        let locations = parsed
            .locations
            .ok_or_else(|| parse_error("response has no locations".to_string(), Some(&body)))?;

        reorder_locations(locations, batch.len())
            .map_err(|message| parse_error(message, None))?
            .into_iter()
            .map(|loc| loc.into_outcome().map_err(|message| parse_error(message, None)))
            .collect()
    }
}

/// Normalize and number every address of a batch.
fn build_payload(batch: Batch<'_>) -> Result<BatchPayload<'_>, GeocodeError> {
    let records = batch
        .addresses()
        .iter()
        .zip(1u32..)
        .map(|(address, object_id)| -> Result<_, GeocodeError> {
            Ok(BatchRecord {
                attributes: BatchAttributes {
                    object_id,
                    single_line: strip_home_city(address)?,
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchPayload { records })
}

impl BatchGeocoder for EsriClient {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn validate_address(&self, address: &str) -> Result<(), GeocodeError> {
        strip_home_city(address)?;
        Ok(())
    }

    async fn geocode_batch(&self, batch: Batch<'_>) -> Result<Vec<GeocodeOutcome>, GeocodeError> {
        self.geocode_addresses(batch).await
    }
}
