// # IP Resolver Trait
//
// Defines the interface for discovering the host's current public IPv4
// address.
//
// ## Implementations
//
// - HTTP lookup services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//
//     let ip = resolver.external_ipv4().await?;
//     println!("external IP: {ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP resolver implementations
///
/// A resolver answers a single question per run: what is the routable
/// IPv4 address this host is reachable at right now?
///
/// # Trust Level: Untrusted
///
/// Resolvers talk to third-party services and are treated like providers:
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS calls to their lookup services
/// - ✅ Fall back from one lookup service to the next within one call
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Sleep and retry across calls (the scheduler re-runs the job)
/// - ❌ Touch the DNS zone
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Get the current external IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: A routable IPv4 address
    /// - `Err(Error)`: If no address could be determined
    async fn external_ipv4(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}
