//! Myra API response envelopes

use myradyn_core::traits::{DnsRecord, Violation, null_as_default};
use serde::{Deserialize, Serialize};

/// Answer to a record listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryResponse {
    pub error: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub list: Vec<DnsRecord>,
    pub page: u32,
    /// Total number of matching records across all pages
    pub count: usize,
    pub page_size: usize,
}

/// Answer to a record update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultResponse {
    pub error: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub violation_list: Vec<Violation>,
    #[serde(deserialize_with = "null_as_default")]
    pub target_object: Vec<DnsRecord>,
}
