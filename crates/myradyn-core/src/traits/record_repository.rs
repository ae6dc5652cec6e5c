// # Record Repository Trait
//
// Defines the interface for reading and updating DNS records through a
// provider API, plus the record model that travels through it.
//
// ## Implementations
//
// - Myra Cloud: `myradyn-provider-myra` crate
//
// ## Usage
//
// ```rust,ignore
// use myradyn_core::traits::{ListOptions, RecordRepository};
//
// let records = repository.list("example.com", &ListOptions::default()).await?;
// for record in records {
//     let outcome = repository.update("example.com", record, new_ip).await?;
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Address record type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[default]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// The record type that can hold `ip`
    pub fn for_ip(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load-balancing options attached to a record
///
/// Not interpreted by myra-dyn, only round-tripped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpstreamOptions {
    pub backup: bool,
    pub down: bool,
    pub fail_timeout: String,
    pub max_fails: i64,
    pub weight: i64,
}

/// Deserialize `null` as the type's default value
///
/// The provider sends `null` for unset fields; `#[serde(default)]` alone only
/// covers missing keys.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A DNS record as returned by the provider
///
/// Every field the provider sends is kept, including fields this type does
/// not model (`extra`), so that an update re-sends the record unchanged
/// apart from what [`DnsRecord::retarget`] touches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DnsRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub object_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub modified: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: String,
    /// Host label, e.g. "www"
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Current address as text
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub ttl: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub record_type: RecordType,
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub paused: bool,
    pub upstream_options: Option<UpstreamOptions>,
    #[serde(deserialize_with = "null_as_default")]
    pub alternative_cname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub caa_flags: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DnsRecord {
    /// Whether the record already points at `ip`
    ///
    /// Compares parsed addresses so that textual variants of the same IPv6
    /// address are equal; falls back to a string comparison when the stored
    /// value is not an address literal.
    pub fn points_to(&self, ip: IpAddr) -> bool {
        match self.value.trim().parse::<IpAddr>() {
            Ok(current) => current == ip,
            Err(_) => self.value == ip.to_string(),
        }
    }

    /// Point the record at `new_ip`
    ///
    /// Switches the record type to match the address family, replaces the
    /// value and stamps a comment recording the change at `at`.
    pub fn retarget(&mut self, new_ip: IpAddr, at: DateTime<Utc>) {
        self.record_type = RecordType::for_ip(new_ip);
        self.comment = format!(
            "myra-dyn update from {} to {} at {}",
            self.value,
            new_ip,
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        self.value = new_ip.to_string();
    }
}

/// A field-level rejection reason returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Violation {
    /// Field path the violation refers to (may be empty)
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Result of a transmitted update
///
/// Transport and parse failures are `Err(Error::Update)` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The provider accepted the update
    Updated {
        /// The record as echoed back by the provider, if any
        record: Option<DnsRecord>,
    },
    /// The provider received the update and refused it
    Rejected {
        /// Reasons given by the provider
        violations: Vec<Violation>,
    },
}

/// Filters applied when listing records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Record types to return
    pub record_types: Vec<RecordType>,
    /// Only return active records
    pub active_only: bool,
    /// Records requested in the single page fetched
    pub page_size: usize,
}

impl ListOptions {
    /// A/AAAA, active only, with the given page size
    pub fn address_records(page_size: usize) -> Self {
        Self {
            record_types: vec![RecordType::A, RecordType::Aaaa],
            active_only: true,
            page_size,
        }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::address_records(crate::config::DEFAULT_PAGE_SIZE)
    }
}

/// Trait for record repository implementations
///
/// # Thread Safety
///
/// The engine shares one repository across all concurrent update tasks,
/// so implementations must be `Send + Sync` and hold no per-call state.
///
/// # Single-shot
///
/// Each call is exactly one API request. Implementations must not retry;
/// every qualifying record gets one attempt per run.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// List the records of `domain` matching `options`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: The records of the first page
    /// - `Err(Error::Fetch)`: Transport failure, non-2xx status or malformed body
    async fn list(
        &self,
        domain: &str,
        options: &ListOptions,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Point `record` at `new_ip` and submit it
    ///
    /// The record is retargeted (see [`DnsRecord::retarget`]) before it is
    /// serialized.
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome::Updated)`: The provider accepted the change
    /// - `Ok(UpdateOutcome::Rejected)`: The provider refused it with violations
    /// - `Err(Error::Update)`: The request could not be sent or the answer parsed
    async fn update(
        &self,
        domain: &str,
        record: DnsRecord,
        new_ip: IpAddr,
    ) -> Result<UpdateOutcome, crate::Error>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
