//! Core traits for myra-dyn
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressEnumerator`]: List local interface addresses
//! - [`IpSource`]: Ask a remote service for this host's address
//! - [`RecordRepository`]: List and update DNS records via a provider API

pub mod ip_source;
pub mod record_repository;

pub use ip_source::{AddressEnumerator, IpSource};
pub use record_repository::{
    DnsRecord, ListOptions, RecordRepository, RecordType, UpdateOutcome, UpstreamOptions,
    Violation, null_as_default,
};
