//! Record synchronization engine
//!
//! The SyncEngine is responsible for:
//! - Listing the A/AAAA records of every domain
//! - Deciding which records disagree with the discovered address
//! - Updating those records concurrently, one task per record
//! - Reporting every decision and outcome
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────┐
//!   discovered IP ──▶│  SyncEngine  │
//!                    └──────────────┘
//!                            │
//!          ┌─────────────────┼──────────────────┐
//!          ▼                 ▼                  ▼
//!   ┌─────────────┐   ┌─────────────┐    ┌─────────────┐
//!   │ list (seq.) │──▶│ plan_domain │───▶│ update task │ × N
//!   └─────────────┘   └─────────────┘    └─────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. List every domain, one after the other
//! 2. Plan each domain: unchanged / ambiguous / candidates
//! 3. Spawn one update task per candidate across all domains
//! 4. Join every task and collect a [`SyncReport`]

pub mod plan;

pub use plan::{AmbiguousName, DomainPlan, plan_domain};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsRecord, ListOptions, RecordRepository, UpdateOutcome, Violation};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Final state of one dispatched update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// The provider accepted the new address
    Updated,
    /// The provider refused the update
    Rejected(Vec<Violation>),
    /// The update never reached a verdict (transport, parse or task failure)
    Failed(String),
}

/// Outcome of one dispatched update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    /// Record name
    pub name: String,
    /// Value before the update
    pub previous_value: String,
    /// What happened
    pub status: RecordStatus,
}

/// Everything that happened to one domain during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainReport {
    /// The domain
    pub domain: String,
    /// Set when listing the domain failed; nothing else was attempted
    pub fetch_error: Option<String>,
    /// Names whose record already pointed at the address
    pub unchanged: Vec<String>,
    /// Names skipped because several records carry them
    pub skipped: Vec<String>,
    /// One entry per dispatched update
    pub updates: Vec<RecordReport>,
}

impl DomainReport {
    fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Default::default()
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// The address records were synchronized to
    pub ip: IpAddr,
    /// One entry per domain, in the order given
    pub domains: Vec<DomainReport>,
}

impl SyncReport {
    /// Look up the update report of a record
    pub fn record(&self, domain: &str, name: &str) -> Option<&RecordReport> {
        self.domains
            .iter()
            .find(|d| d.domain == domain)?
            .updates
            .iter()
            .find(|r| r.name == name)
    }

    /// Number of updates the provider accepted
    pub fn updated_count(&self) -> usize {
        self.count_updates(|status| matches!(status, RecordStatus::Updated))
    }

    /// Number of updates the provider refused
    pub fn rejected_count(&self) -> usize {
        self.count_updates(|status| matches!(status, RecordStatus::Rejected(_)))
    }

    /// Number of updates that failed without a verdict
    pub fn failed_count(&self) -> usize {
        self.count_updates(|status| matches!(status, RecordStatus::Failed(_)))
    }

    /// Number of ambiguous names skipped
    pub fn skipped_count(&self) -> usize {
        self.domains.iter().map(|d| d.skipped.len()).sum()
    }

    /// Number of domains that could not be listed
    pub fn fetch_failures(&self) -> usize {
        self.domains.iter().filter(|d| d.fetch_error.is_some()).count()
    }

    /// True when nothing failed, was rejected or was skipped
    pub fn is_clean(&self) -> bool {
        self.fetch_failures() == 0
            && self.rejected_count() == 0
            && self.failed_count() == 0
            && self.skipped_count() == 0
    }

    fn count_updates(&self, pred: impl Fn(&RecordStatus) -> bool) -> usize {
        self.domains
            .iter()
            .flat_map(|d| d.updates.iter())
            .filter(|r| pred(&r.status))
            .count()
    }
}

/// An update task in flight
struct PendingUpdate {
    domain_index: usize,
    name: String,
    previous_value: String,
    handle: JoinHandle<Result<UpdateOutcome>>,
}

/// Core synchronization engine
///
/// One engine serves one run. Listing is sequential; updates run as
/// independent tokio tasks so that a slow or failing record never holds
/// up its siblings.
///
/// ## Failure Isolation
///
/// - A domain that cannot be listed is reported and skipped
/// - A record whose update fails or is rejected is reported on its own
/// - Nothing is retried; each record gets exactly one attempt
pub struct SyncEngine {
    /// Record repository shared by every update task
    repository: Arc<dyn RecordRepository>,

    /// Filters for the list call
    list_options: ListOptions,

    /// Bounds in-flight updates when configured
    limiter: Option<Arc<Semaphore>>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `repository`: Record repository implementation
    /// - `config`: Engine configuration
    pub fn new(repository: Arc<dyn RecordRepository>, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            repository,
            list_options: ListOptions::address_records(config.page_size),
            limiter: config
                .max_concurrent_updates
                .map(|permits| Arc::new(Semaphore::new(permits))),
        })
    }

    /// Synchronize the address records of `domains` to `ip`
    ///
    /// Never fails as a whole: every per-domain and per-record problem is
    /// logged and recorded in the returned report.
    pub async fn run(&self, domains: &[String], ip: IpAddr) -> SyncReport {
        info!(
            "Synchronizing {} domain(s) to {} via {}",
            domains.len(),
            ip,
            self.repository.provider_name()
        );

        let mut reports: Vec<DomainReport> = Vec::with_capacity(domains.len());
        let mut planned: Vec<(usize, Vec<DnsRecord>)> = Vec::new();

        for domain in domains {
            let index = reports.len();
            let mut report = DomainReport::new(domain);

            match self.repository.list(domain, &self.list_options).await {
                Ok(records) => {
                    let plan = plan_domain(records, ip);
                    self.record_plan(&mut report, &plan);
                    planned.push((index, plan.candidates));
                }
                Err(e) => {
                    error!("Skipping {}: {}", domain, e);
                    report.fetch_error = Some(e.to_string());
                }
            }

            reports.push(report);
        }

        let mut pending = Vec::new();
        for (index, candidates) in planned {
            for record in candidates {
                pending.push(self.dispatch(&reports[index].domain, index, record, ip));
            }
        }

        for update in pending {
            let domain = &reports[update.domain_index].domain;
            let status = Self::collect(domain, &update.name, ip, update.handle.await);
            reports[update.domain_index].updates.push(RecordReport {
                name: update.name,
                previous_value: update.previous_value,
                status,
            });
        }

        let report = SyncReport {
            ip,
            domains: reports,
        };
        info!(
            "Run finished: {} updated, {} rejected, {} failed, {} skipped, {} domain(s) not fetched",
            report.updated_count(),
            report.rejected_count(),
            report.failed_count(),
            report.skipped_count(),
            report.fetch_failures()
        );
        report
    }

    fn record_plan(&self, report: &mut DomainReport, plan: &DomainPlan) {
        for record in &plan.unchanged {
            info!(
                "No change required for {} in {} ({})",
                record.name, report.domain, record.value
            );
            report.unchanged.push(record.name.clone());
        }

        for ambiguous in &plan.ambiguous {
            warn!(
                "Skipping update on {} in {}: {} A or AAAA records found",
                ambiguous.name, report.domain, ambiguous.count
            );
            report.skipped.push(ambiguous.name.clone());
        }
    }

    /// Spawn the update task for one record
    fn dispatch(
        &self,
        domain: &str,
        domain_index: usize,
        record: DnsRecord,
        ip: IpAddr,
    ) -> PendingUpdate {
        info!(
            "Update {} to {} for record {}-{} in {}",
            record.value, ip, record.name, record.record_type, domain
        );

        let name = record.name.clone();
        let previous_value = record.value.clone();
        let repository = Arc::clone(&self.repository);
        let limiter = self.limiter.clone();
        let task_domain = domain.to_string();

        let handle = tokio::spawn(async move {
            let _permit = match limiter {
                Some(limiter) => Some(limiter.acquire_owned().await.map_err(|e| {
                    Error::update(task_domain.as_str(), record.name.as_str(), e.to_string())
                })?),
                None => None,
            };
            repository.update(&task_domain, record, ip).await
        });

        PendingUpdate {
            domain_index,
            name,
            previous_value,
            handle,
        }
    }

    /// Turn a joined task into a status, logging it
    fn collect(
        domain: &str,
        name: &str,
        ip: IpAddr,
        joined: std::result::Result<Result<UpdateOutcome>, tokio::task::JoinError>,
    ) -> RecordStatus {
        match joined {
            Ok(Ok(UpdateOutcome::Updated { .. })) => {
                info!("Updated {} in {} to {}", name, domain, ip);
                RecordStatus::Updated
            }
            Ok(Ok(UpdateOutcome::Rejected { violations })) => {
                for violation in &violations {
                    warn!("Provider rejected {} in {}: {}", name, domain, violation);
                }
                RecordStatus::Rejected(violations)
            }
            Ok(Err(e)) => {
                error!("{}", e);
                RecordStatus::Failed(e.to_string())
            }
            Err(e) => {
                error!("Update task for {} in {} did not complete: {}", name, domain, e);
                RecordStatus::Failed(format!("update task did not complete: {}", e))
            }
        }
    }
}
