//! Test doubles and common utilities for the contract tests
//!
//! These doubles count calls and record inputs so tests can assert on
//! what the core asked of its collaborators.

#![allow(dead_code)]

use myradyn_core::error::{Error, Result};
use myradyn_core::traits::{
    AddressEnumerator, DnsRecord, IpSource, ListOptions, RecordRepository, RecordType,
    UpdateOutcome, Violation,
};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// Parse an address literal
pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// A stale-or-fresh A record with the given name and value
pub fn a_record(name: &str, value: &str) -> DnsRecord {
    DnsRecord {
        object_type: "DnsRecordVO".to_string(),
        id: 1,
        name: name.to_string(),
        value: value.to_string(),
        record_type: RecordType::A,
        ttl: 300,
        active: true,
        enabled: true,
        ..Default::default()
    }
}

/// An enumerator returning a fixed address list
pub struct StaticEnumerator {
    addrs: Vec<IpAddr>,
}

impl StaticEnumerator {
    pub fn new(addrs: &[&str]) -> Self {
        Self {
            addrs: addrs.iter().map(|a| ip(a)).collect(),
        }
    }
}

impl AddressEnumerator for StaticEnumerator {
    fn addresses(&self) -> Result<Vec<IpAddr>> {
        Ok(self.addrs.clone())
    }
}

/// An enumerator whose syscall always fails
pub struct FailingEnumerator;

impl AddressEnumerator for FailingEnumerator {
    fn addresses(&self) -> Result<Vec<IpAddr>> {
        Err(Error::discovery("getifaddrs failed"))
    }
}

/// A fallback IP source that counts how often it is asked
pub struct CountingIpSource {
    answer: std::result::Result<IpAddr, String>,
    calls: Arc<AtomicUsize>,
}

impl CountingIpSource {
    /// A source answering `addr`
    pub fn answering(addr: &str) -> Self {
        Self {
            answer: Ok(ip(addr)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source failing with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter (survives moving the source into a Box)
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl IpSource for CountingIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(addr) => Ok(*addr),
            Err(message) => Err(Error::discovery(message.clone())),
        }
    }

    fn source_name(&self) -> &'static str {
        "counting"
    }
}

/// An in-memory record repository that tracks calls
#[derive(Default)]
pub struct MockRepository {
    /// Records returned per domain
    records: HashMap<String, Vec<DnsRecord>>,
    /// Domains whose list call fails
    failing_lists: HashSet<String>,
    /// Record names whose update fails in transport
    failing_updates: HashSet<String>,
    /// Record names the provider rejects
    rejected_updates: HashSet<String>,
    /// Every update waits here before answering, when set
    barrier: Option<Arc<Barrier>>,
    /// Domains listed, in call order
    listed: Mutex<Vec<String>>,
    /// (domain, record) as received by update()
    updated: Mutex<Vec<(String, DnsRecord)>>,
    /// Page size seen by the last list call
    last_page_size: AtomicUsize,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, domain: &str, records: Vec<DnsRecord>) -> Self {
        self.records.insert(domain.to_string(), records);
        self
    }

    pub fn failing_list(mut self, domain: &str) -> Self {
        self.failing_lists.insert(domain.to_string());
        self
    }

    pub fn failing_update(mut self, name: &str) -> Self {
        self.failing_updates.insert(name.to_string());
        self
    }

    pub fn rejecting_update(mut self, name: &str) -> Self {
        self.rejected_updates.insert(name.to_string());
        self
    }

    /// Make every update wait until `parties` updates are in flight
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(String, DnsRecord)> {
        self.updated.lock().unwrap().clone()
    }

    pub fn updated_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .updated()
            .into_iter()
            .map(|(_, record)| record.name)
            .collect();
        names.sort();
        names
    }

    pub fn last_page_size(&self) -> usize {
        self.last_page_size.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordRepository for MockRepository {
    async fn list(&self, domain: &str, options: &ListOptions) -> Result<Vec<DnsRecord>> {
        self.listed.lock().unwrap().push(domain.to_string());
        self.last_page_size
            .store(options.page_size, Ordering::SeqCst);

        if self.failing_lists.contains(domain) {
            return Err(Error::fetch(domain, "HTTP 500 Internal Server Error"));
        }
        Ok(self.records.get(domain).cloned().unwrap_or_default())
    }

    async fn update(
        &self,
        domain: &str,
        mut record: DnsRecord,
        new_ip: IpAddr,
    ) -> Result<UpdateOutcome> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        record.retarget(new_ip, chrono::Utc::now());
        self.updated
            .lock()
            .unwrap()
            .push((domain.to_string(), record.clone()));

        if self.failing_updates.contains(&record.name) {
            return Err(Error::update(domain, record.name, "connection reset by peer"));
        }
        if self.rejected_updates.contains(&record.name) {
            return Ok(UpdateOutcome::Rejected {
                violations: vec![Violation {
                    path: "value".to_string(),
                    message: "value is not allowed".to_string(),
                }],
            });
        }
        Ok(UpdateOutcome::Updated {
            record: Some(record),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
