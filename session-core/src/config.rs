//! Session configuration

use crate::{Error, Result};
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://api.bankfeed.io";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS trust policy of a session.
///
/// There is no process-wide default that code elsewhere could swap out;
/// the policy is fixed per session at construction time.
#[derive(Debug, Clone, Default)]
pub enum TrustPolicy {
    /// Trust the platform root store (production default)
    #[default]
    System,
    /// Platform roots plus additional DER-encoded root certificates
    CustomRoots(Vec<Vec<u8>>),
    /// Accept any certificate. Test environments only; compiled in solely
    /// with the off-by-default `dangerous-trust-all` feature.
    #[cfg(feature = "dangerous-trust-all")]
    TrustAll,
}

/// Immutable per-session configuration: endpoint, credential, timeout,
/// trust policy. Every request reads it, none mutates it.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API endpoint base URL, without trailing slash
    pub api_endpoint: String,
    /// Bearer access token binding the session to a user
    pub access_token: String,
    /// Timeout applied to every individual request
    pub timeout: Duration,
    /// TLS trust policy
    pub trust: TrustPolicy,
}

impl SessionConfig {
    /// Configuration for the default endpoint with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
            trust: TrustPolicy::default(),
        }
    }

    /// Use a different API endpoint (e.g. a dedicated deployment)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }

    /// Use a different per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different TLS trust policy
    pub fn with_trust_policy(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }

    /// `Authorization` header value for this session
    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Build the HTTP client carrying this configuration
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        match &self.trust {
            TrustPolicy::System => {}
            TrustPolicy::CustomRoots(roots) => {
                for der in roots {
                    builder =
                        builder.add_root_certificate(reqwest::Certificate::from_der(der)?);
                }
            }
            #[cfg(feature = "dangerous-trust-all")]
            TrustPolicy::TrustAll => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder.build().map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new("token-1");
        assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.authorization(), "Bearer token-1");
    }

    #[test]
    fn builder_overrides() {
        let config = SessionConfig::new("t")
            .with_endpoint("https://staging.example")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.api_endpoint, "https://staging.example");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
