use webchat_core::{DeliveryOptions, RelayOptions};

use crate::transport::TransportRequest;

/// One transport path in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate<'a> {
    Relay(&'a RelayOptions),
    Direct,
}

impl Candidate<'_> {
    /// Build the request for `destination` through this candidate.
    ///
    /// Direct requests carry `direct_headers`; relayed ones carry only the
    /// relay's own headers.
    #[must_use]
    pub fn request(&self, destination: &str, options: &DeliveryOptions) -> TransportRequest {
        match self {
            Self::Relay(relay) => TransportRequest {
                url: relay_url(&relay.prefix, destination),
                headers: relay.headers.clone(),
            },
            Self::Direct => TransportRequest {
                url: destination.to_string(),
                headers: options.direct_headers.clone(),
            },
        }
    }
}

/// Relays in configured order, then the direct request.
#[must_use]
pub fn candidates(options: &DeliveryOptions) -> Vec<Candidate<'_>> {
    options
        .relays
        .iter()
        .map(Candidate::Relay)
        .chain(std::iter::once(Candidate::Direct))
        .collect()
}

/// `prefix` followed by the url-encoded destination.
#[must_use]
pub fn relay_url(prefix: &str, destination: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(destination.as_bytes()).collect();
    format!("{prefix}{encoded}")
}
