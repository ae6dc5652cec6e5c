// # myradyn-core
//
// Core library for myra-dyn, a one-shot dynamic DNS updater.
//
// ## Architecture Overview
//
// - **classify**: Public vs. private address classification
// - **IpDiscovery**: Interface scan with an echo-service fallback
// - **RecordRepository**: Trait for listing and updating records via a provider API
// - **SyncEngine**: Diffs records against the discovered address and updates them concurrently
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider and IP source implementations
// 2. **One-shot**: Every run is a single pass over explicitly supplied domains
// 3. **Failure Isolation**: A failing domain or record never affects its siblings
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod classify;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use classify::is_public;
pub use config::{EngineConfig, MyraDynConfig};
pub use discovery::IpDiscovery;
pub use engine::{DomainReport, RecordReport, RecordStatus, SyncEngine, SyncReport};
pub use error::{Error, Result};
pub use traits::{AddressEnumerator, DnsRecord, IpSource, RecordRepository, UpdateOutcome};
