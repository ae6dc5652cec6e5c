//! Public/private address classification
//!
//! An address is "public" when it can be published in an A/AAAA record and
//! reached from the internet. Loopback, link-local and the RFC 1918 IPv4
//! ranges are private. IPv6 has no private-range carve-out: any IPv6
//! address that is neither loopback nor link-local counts as public.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Returns `true` if `addr` is globally routable for our purposes.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are classified as the
/// embedded IPv4 address.
pub fn is_public(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => is_public_v6(v6),
        },
    }
}

fn is_public_v4(addr: Ipv4Addr) -> bool {
    if addr.is_loopback() || addr.is_link_local() || is_link_local_multicast_v4(addr) {
        return false;
    }
    // 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
    !addr.is_private()
}

fn is_public_v6(addr: Ipv6Addr) -> bool {
    !(addr.is_loopback() || is_link_local_unicast_v6(addr) || is_link_local_multicast_v6(addr))
}

// 224.0.0.0/24
fn is_link_local_multicast_v4(addr: Ipv4Addr) -> bool {
    let [a, b, c, _] = addr.octets();
    a == 224 && b == 0 && c == 0
}

// fe80::/10
fn is_link_local_unicast_v6(addr: Ipv6Addr) -> bool {
    addr.segments()[0] & 0xffc0 == 0xfe80
}

// ffX2::/16
fn is_link_local_multicast_v6(addr: Ipv6Addr) -> bool {
    let octets = addr.octets();
    octets[0] == 0xff && octets[1] & 0x0f == 0x02
}
