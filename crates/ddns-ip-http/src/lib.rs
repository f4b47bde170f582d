// # HTTP IP Resolver
//
// This crate provides an HTTP-based IP resolver for the DDNS reconciler.
//
// ## Purpose
//
// Asks third-party "what is my IP" services for the address the host
// is seen from on the internet. The answer is the body of a plain-text
// response, e.g. `203.0.113.7\n`.
//
// ## Failover
//
// Services are queried one after the other, in configured order. The first
// service that answers with a routable IPv4 address wins; any failure
// (transport, status, unparsable body, IPv6, private range) moves on to
// the next service. Only when every service failed does the lookup fail.
//
// No sleeping or retrying across calls: a failed run is re-run by the
// scheduler.

use ddns_core::config::SyncConfig;
use ddns_core::traits::IpResolver;
use ddns_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tracing::{debug, warn};

/// HTTP-based IP resolver with sequential failover
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// Lookup service URLs, in query order
    services: Vec<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a new HTTP IP resolver
    ///
    /// # Parameters
    ///
    /// - `services`: Lookup service URLs (e.g., "https://api.ipify.org")
    /// - `timeout`: Per-request timeout
    pub fn new(services: Vec<String>, timeout: Duration) -> Result<Self> {
        if services.is_empty() {
            return Err(Error::config("At least one IP lookup service is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { services, client })
    }

    /// Create a resolver from the run configuration
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Self::new(
            config.ip_services.clone(),
            Duration::from_secs(config.ip_timeout_secs),
        )
    }

    /// Configured lookup services
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Fetch the current IP from one lookup service
    async fn fetch_ip(&self, url: &str) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered with HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))?;

        parse_routable_ipv4(body.trim())
    }
}

/// Parse a lookup answer, accepting only a publicly routable IPv4 address
fn parse_routable_ipv4(text: &str) -> Result<Ipv4Addr> {
    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::invalid_input(format!("Invalid IP address: {:?}", text)))?;

    let ip = match ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => {
            return Err(Error::invalid_input(format!("Expected IPv4, got: {}", v6)));
        }
    };

    if ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_multicast()
    {
        return Err(Error::invalid_input(format!(
            "Address is not publicly routable: {}",
            ip
        )));
    }

    Ok(ip)
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn external_ipv4(&self) -> Result<Ipv4Addr> {
        let mut last_error = None;

        for url in &self.services {
            match self.fetch_ip(url).await {
                Ok(ip) => {
                    debug!("{} reported external IP {}", url, ip);
                    return Ok(ip);
                }
                Err(e) => {
                    warn!("IP lookup via {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(Error::ip_resolution(format!(
            "All {} lookup service(s) failed; last error: {}",
            self.services.len(),
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}
