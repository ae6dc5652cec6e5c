// # IP Source Traits
//
// Defines the two seams public-IP discovery is built on.
//
// ## Implementations
//
// - Interface scan: `myradyn-ip-local` crate (`AddressEnumerator`)
// - Echo service: `myradyn-ip-http` crate (`IpSource`)
//
// ## Usage
//
// ```rust,ignore
// use myradyn_core::IpDiscovery;
//
// let discovery = IpDiscovery::new(
//     Box::new(InterfaceEnumerator::new()),
//     Box::new(HttpIpSource::new("https://api.ipify.org", timeout)?),
// );
// let ip = discovery.discover().await?;
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Lists the addresses currently assigned to local network interfaces
///
/// Enumeration is a local, non-blocking syscall, so this trait is sync.
/// Implementations must return addresses in the order the OS reports them;
/// discovery picks the first public one.
pub trait AddressEnumerator: Send + Sync {
    /// All interface addresses, in enumeration order
    fn addresses(&self) -> Result<Vec<IpAddr>, crate::Error>;
}

/// A remote source that reports one address for this host
///
/// Used as the discovery fallback when the host sits behind NAT and no
/// interface carries a public address.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The address reported by the source
    /// - `Err(Error::Discovery)`: Transport failure or an unparseable answer
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Short name for logging (e.g. "http")
    fn source_name(&self) -> &'static str;
}
