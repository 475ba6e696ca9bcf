//! Geocoding error types.

use crate::domain::Provider;
use crate::esri::MissingLocality;

/// Errors from either geocoding provider.
///
/// All of these are fatal to a run. "No match" is not an error; it is
/// reported as [`GeocodeOutcome::NoMatch`](crate::domain::GeocodeOutcome).
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The HTTP client could not be built from its configuration
    #[error("invalid {provider} client configuration: {message}")]
    Client { provider: Provider, message: String },

    /// Transport failure (connect, timeout, body read)
    #[error("{provider} request failed for {context}: {source}")]
    Request {
        provider: Provider,
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-success status or an error envelope
    #[error("{provider} API error {status} for {context}: {message}")]
    Api {
        provider: Provider,
        context: String,
        status: u16,
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("{provider} response for {context} could not be parsed: {message}")]
    Parse {
        provider: Provider,
        context: String,
        message: String,
        body: Option<String>,
    },

    /// Address does not satisfy the regional provider's input contract
    #[error(transparent)]
    MalformedAddress(#[from] MissingLocality),
}

impl GeocodeError {
    /// The provider involved, if the error came from a provider.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            GeocodeError::Client { provider, .. }
            | GeocodeError::Request { provider, .. }
            | GeocodeError::Api { provider, .. }
            | GeocodeError::Parse { provider, .. } => Some(*provider),
            GeocodeError::MalformedAddress(_) => None,
        }
    }

    pub(crate) fn parse(
        provider: Provider,
        context: impl Into<String>,
        message: impl Into<String>,
        body: Option<&str>,
    ) -> Self {
        GeocodeError::Parse {
            provider,
            context: context.into(),
            message: message.into(),
            body: body.map(|b| b.chars().take(500).collect()),
        }
    }
}
