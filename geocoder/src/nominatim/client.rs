//! Nominatim search client.
//!
//! Sends one address per request. The public Nominatim instance allows at
//! most one request per second per caller and requires a contact address,
//! so every request goes through a [`Pacer`] and carries the operator's
//! email both as a parameter and in the `User-Agent`.

use std::time::Duration;

use crate::domain::{GeocodeOutcome, Provider};
use crate::geocode::{GeocodeError, SingleGeocoder};

use super::pacer::Pacer;
use super::types::Place;

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default country scope for searches.
const DEFAULT_COUNTRY_CODES: &str = "us";

/// Minimum spacing between requests required by the usage policy.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Operator contact sent with every request. Required, no default.
    pub contact_email: String,
    /// Base URL for the API (defaults to the public instance)
    pub base_url: String,
    /// Comma-separated ISO 3166-1 country codes to search within
    pub country_codes: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    /// Create a new config with the given contact email.
    pub fn new(contact_email: impl Into<String>) -> Self {
        Self {
            contact_email: contact_email.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            country_codes: DEFAULT_COUNTRY_CODES.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the country scope.
    pub fn with_country_codes(mut self, codes: impl Into<String>) -> Self {
        self.country_codes = codes.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Nominatim API client.
#[derive(Debug)]
pub struct NominatimClient {
    http: reqwest::Client,
    search_url: String,
    contact_email: String,
    country_codes: String,
    pacer: Pacer,
}

impl NominatimClient {
    /// Create a new client. Fails if the contact email is missing or malformed.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let contact_email = config.contact_email.trim().to_string();
        if contact_email.is_empty() || !contact_email.contains('@') {
            return Err(GeocodeError::Client {
                provider: Provider::Global,
                message: format!("a contact email is required, got {contact_email:?}"),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(format!(
                "geocoder/{} ({contact_email})",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeocodeError::Client {
                provider: Provider::Global,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            contact_email,
            country_codes: config.country_codes,
            pacer: Pacer::new(MIN_REQUEST_INTERVAL),
        })
    }

    /// Look up a single address, returning at most one place.
    pub async fn search(&self, address: &str) -> Result<GeocodeOutcome, GeocodeError> {
        let context = format!("address {address:?}");
        let request_error = |source: reqwest::Error| GeocodeError::Request {
            provider: Provider::Global,
            context: context.clone(),
            source,
        };

        // Held until the response body is read.
        let _permit = self.pacer.acquire().await;

        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("q", address),
                ("format", "jsonv2"),
                ("countrycodes", self.country_codes.as_str()),
                ("layer", "address"),
                ("limit", "1"),
                ("email", self.contact_email.as_str()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                provider: Provider::Global,
                context: context.clone(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(request_error)?;

        let places: Vec<Place> = serde_json::from_str(&body).map_err(|e| {
            GeocodeError::parse(Provider::Global, &context, e.to_string(), Some(&body))
        })?;

        match places.into_iter().next() {
            None => Ok(GeocodeOutcome::NoMatch),
            Some(place) => place
                .into_result()
                .map(GeocodeOutcome::Matched)
                .map_err(|message| GeocodeError::parse(Provider::Global, &context, message, None)),
        }
    }
}

impl SingleGeocoder for NominatimClient {
    async fn geocode_one(&self, address: &str) -> Result<GeocodeOutcome, GeocodeError> {
        self.search(address).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use httptest::matchers::*;
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use serde_json::json;

    use super::*;

    fn client(server: &Server) -> NominatimClient {
        let config = NominatimConfig::new("ops@example.org").with_base_url(server.url_str(""));
        NominatimClient::new(config).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = NominatimConfig::new("ops@example.org");

        assert_eq!(config.contact_email, "ops@example.org");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.country_codes, "us");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_builder() {
        let config = NominatimConfig::new("ops@example.org")
            .with_base_url("http://localhost:8080")
            .with_country_codes("us,ca")
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.country_codes, "us,ca");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn contact_email_is_required() {
        for email in ["", "   ", "not-an-email"] {
            let err = NominatimClient::new(NominatimConfig::new(email)).unwrap_err();
            assert!(matches!(
                err,
                GeocodeError::Client {
                    provider: Provider::Global,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn sends_policy_parameters() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method("GET"),
                request::path("/search"),
                request::query(url_decoded(contains(("q", "100 S Broadway, St. Louis")))),
                request::query(url_decoded(contains(("format", "jsonv2")))),
                request::query(url_decoded(contains(("countrycodes", "us")))),
                request::query(url_decoded(contains(("layer", "address")))),
                request::query(url_decoded(contains(("limit", "1")))),
                request::query(url_decoded(contains(("email", "ops@example.org")))),
            ])
            .respond_with(json_encoded(json!([{
                "lat": "38.6270025",
                "lon": "-90.1994042",
                "importance": 0.5,
                "display_name": "100, South Broadway, St. Louis"
            }]))),
        );

        let outcome = client(&server)
            .search("100 S Broadway, St. Louis")
            .await
            .unwrap();

        let GeocodeOutcome::Matched(result) = outcome else {
            panic!("expected a match");
        };
        assert_eq!(result.latitude, 38.6270025);
        assert_eq!(result.longitude, -90.1994042);
        assert_eq!(result.provider, Provider::Global);
    }

    #[tokio::test]
    async fn empty_array_is_no_match() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::path("/search")).respond_with(json_encoded(json!([]))),
        );

        let outcome = client(&server).search("1 Nowhere, Atlantis").await.unwrap();

        assert_eq!(outcome, GeocodeOutcome::NoMatch);
    }

    #[tokio::test]
    async fn consecutive_requests_are_spaced() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::path("/search"))
                .times(2)
                .respond_with(json_encoded(json!([]))),
        );
        let client = client(&server);

        client.search("1 A St, Chicago").await.unwrap();
        let after_first = Instant::now();
        client.search("2 B St, Chicago").await.unwrap();

        assert!(after_first.elapsed() >= MIN_REQUEST_INTERVAL);
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::path("/search")).respond_with(status_code(503)),
        );

        let err = client(&server).search("1 A St, Chicago").await.unwrap_err();

        assert!(matches!(err, GeocodeError::Api { status: 503, .. }));
        assert!(err.to_string().contains("\"1 A St, Chicago\""));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::path("/search"))
                .respond_with(json_encoded(json!({"error": "oops"}))),
        );

        let err = client(&server).search("1 A St, Chicago").await.unwrap_err();

        assert!(matches!(
            err,
            GeocodeError::Parse {
                provider: Provider::Global,
                ..
            }
        ));
    }
}
