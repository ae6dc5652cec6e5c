//! Public IP discovery
//!
//! Two tiers: the first public address found on a local interface wins;
//! when there is none (the usual NAT setup) the configured echo service
//! is asked instead. Discovery runs once per process and its result is
//! shared read-only by every update.

use crate::classify::is_public;
use crate::error::{Error, Result};
use crate::traits::{AddressEnumerator, IpSource};
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// First address in `addrs` that [`is_public`] accepts
pub fn first_public(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs.iter().copied().find(|addr| is_public(*addr))
}

/// Discovers the address that DNS records should point at
pub struct IpDiscovery {
    /// Local interface scan
    interfaces: Box<dyn AddressEnumerator>,

    /// Remote echo service
    fallback: Box<dyn IpSource>,
}

impl IpDiscovery {
    /// Create a discovery from an interface enumerator and a fallback source
    pub fn new(interfaces: Box<dyn AddressEnumerator>, fallback: Box<dyn IpSource>) -> Self {
        Self {
            interfaces,
            fallback,
        }
    }

    /// Discover the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: A public interface address, or the echo service's answer
    /// - `Err(Error::Discovery)`: The fallback failed or answered garbage
    pub async fn discover(&self) -> Result<IpAddr> {
        match self.interfaces.addresses() {
            Ok(addrs) => {
                if let Some(ip) = first_public(&addrs) {
                    info!("Using public interface address {}", ip);
                    return Ok(ip);
                }
                debug!(
                    "None of {} interface address(es) is public, asking {} source",
                    addrs.len(),
                    self.fallback.source_name()
                );
            }
            Err(e) => {
                warn!(
                    "Interface enumeration failed ({}), asking {} source",
                    e,
                    self.fallback.source_name()
                );
            }
        }

        let ip = self.fallback.current().await.map_err(|e| match e {
            Error::Discovery(_) => e,
            other => Error::discovery(other.to_string()),
        })?;

        if !is_public(ip) {
            warn!("{} source reported non-public address {}", self.fallback.source_name(), ip);
        }
        info!("Using address {} reported by {} source", ip, self.fallback.source_name());
        Ok(ip)
    }
}
