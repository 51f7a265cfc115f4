//! Client configuration

use crate::types::order::CaptureCompat;
use std::time::Duration;

/// Default gateway API host
pub const DEFAULT_API_BASE_URL: &str = "https://api.cardgate.eu";
/// Default hosted-checkout host (settlement and 3-D Secure live here)
pub const DEFAULT_CHECKOUT_BASE_URL: &str = "https://pay.cardgate.eu";

/// Static configuration of a [`Gateway`](crate::core::gateway::Gateway)
///
/// Both hosts are configurable so tests can point the client at a local
/// stub; endpoint paths are fixed by the protocol.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the main API host
    pub api_base_url: String,

    /// Base URL of the checkout host
    pub checkout_base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// TCP keep-alive interval of the connection pool
    pub keep_alive: Duration,

    /// How long idle pooled connections are kept around
    pub idle_timeout: Duration,

    /// Maximum idle connections kept per host
    pub max_idle_connections: usize,

    /// Amount charged-and-voided by a card verification, in minor units
    pub verification_amount: i64,

    /// Order description attached to verification links
    pub verification_description: String,

    /// Lifetime of a verification link
    pub verification_lifetime: Duration,

    /// Default server callback URL attached to requests that set none
    pub callback_url: Option<String>,

    /// How capture state is derived from legacy response shapes
    pub capture_compat: CaptureCompat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            checkout_base_url: DEFAULT_CHECKOUT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            keep_alive: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(10),
            max_idle_connections: 10,
            verification_amount: 100,
            verification_description: "card verification".to_string(),
            verification_lifetime: Duration::from_secs(600),
            callback_url: None,
            capture_compat: CaptureCompat::Strict,
        }
    }
}

impl GatewayConfig {
    /// Resolve an endpoint path against the host it belongs to
    pub fn url_for(&self, endpoint: crate::types::status::Endpoint) -> String {
        let host = if endpoint.uses_checkout_host() {
            &self.checkout_base_url
        } else {
            &self.api_base_url
        };
        format!("{}{}", host.trim_end_matches('/'), endpoint.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::status::Endpoint;

    #[test]
    fn endpoints_resolve_against_the_right_host() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.url_for(Endpoint::OrderStatus),
            "https://api.cardgate.eu/api/status/order_id/"
        );
        assert_eq!(
            config.url_for(Endpoint::Settlement),
            "https://pay.cardgate.eu/api/settlement"
        );
    }

    #[test]
    fn trailing_host_slash_does_not_double() {
        let config = GatewayConfig {
            api_base_url: "http://127.0.0.1:8080/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.url_for(Endpoint::Recurring),
            "http://127.0.0.1:8080/api/recurring/"
        );
    }
}
