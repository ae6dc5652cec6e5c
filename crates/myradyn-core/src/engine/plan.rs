//! Record diff for a single domain
//!
//! Pure: decides which records must change without touching the network.

use crate::traits::DnsRecord;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// A record name that matched more than one stale record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousName {
    /// The shared record name
    pub name: String,
    /// How many stale records carry it
    pub count: usize,
}

/// What to do with the records of one domain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainPlan {
    /// Records already pointing at the discovered address
    pub unchanged: Vec<DnsRecord>,
    /// Names skipped because more than one stale record carries them
    pub ambiguous: Vec<AmbiguousName>,
    /// Exactly one record per remaining name, to be updated
    pub candidates: Vec<DnsRecord>,
}

/// Split the records of a domain into unchanged, ambiguous and candidates
///
/// Records already pointing at `ip` are set aside first; the remaining
/// records are grouped by name. A name with a single stale record yields a
/// candidate. A name with several is ambiguous and none of its records is
/// touched, since there is no safe way to pick one. Output is ordered by
/// record name.
pub fn plan_domain(records: Vec<DnsRecord>, ip: IpAddr) -> DomainPlan {
    let mut plan = DomainPlan::default();
    let mut by_name: BTreeMap<String, Vec<DnsRecord>> = BTreeMap::new();

    for record in records {
        if record.points_to(ip) {
            plan.unchanged.push(record);
        } else {
            by_name.entry(record.name.clone()).or_default().push(record);
        }
    }

    for (name, mut bucket) in by_name {
        if bucket.len() == 1 {
            plan.candidates.extend(bucket.pop());
        } else {
            plan.ambiguous.push(AmbiguousName {
                name,
                count: bucket.len(),
            });
        }
    }

    plan
}
