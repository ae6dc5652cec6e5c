// # Local Interface Address Source
//
// This crate lists the addresses assigned to the host's network interfaces.
// It is the fast path of public-IP discovery: when a public address sits on
// an interface, no remote service needs to be asked.
//
// ## Platform Support
//
// Backed by `if-addrs`, which wraps `getifaddrs(3)` on Unix and
// `GetAdaptersAddresses` on Windows. Interfaces that are down still report
// their addresses; the classifier decides what is usable.

use myradyn_core::traits::AddressEnumerator;
use myradyn_core::{Error, Result};
use std::net::IpAddr;

/// Interface address enumerator
#[derive(Debug, Clone, Default)]
pub struct InterfaceEnumerator {
    /// Only report addresses of this interface (e.g. "eth0")
    interface: Option<String>,
}

impl InterfaceEnumerator {
    /// Enumerate every interface
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate a single interface
    pub fn for_interface(interface: impl Into<String>) -> Self {
        Self {
            interface: Some(interface.into()),
        }
    }
}

impl AddressEnumerator for InterfaceEnumerator {
    fn addresses(&self) -> Result<Vec<IpAddr>> {
        let interfaces = if_addrs::get_if_addrs()
            .map_err(|e| Error::discovery(format!("Failed to enumerate interfaces: {}", e)))?;

        let addrs: Vec<IpAddr> = interfaces
            .iter()
            .filter(|iface| {
                self.interface
                    .as_deref()
                    .is_none_or(|wanted| iface.name == wanted)
            })
            .map(|iface| iface.ip())
            .collect();

        tracing::debug!("Found {} interface address(es)", addrs.len());
        Ok(addrs)
    }
}
