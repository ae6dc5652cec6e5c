// # myra-dyn
//
// One-shot dynamic DNS for domains hosted on Myra Cloud.
//
// This binary is a thin integration layer:
// 1. Parse the command line and load `config.yml`
// 2. Initialize logging and the runtime
// 3. Discover the public IP (interfaces first, echo service second)
// 4. Hand the domains to the sync engine and report the outcome
//
// All record logic lives in `myradyn-core`.
//
// ## Example
//
// ```bash
// export MYRA_DYN_SECRET=...      # optional, overrides config.yml
// myra-dyn -c /etc/myra-dyn/config.yml example.com example.org
// ```

mod cli;
mod config;

use clap::Parser;
use cli::Cli;
use myradyn_core::{IpDiscovery, MyraDynConfig, SyncEngine, SyncReport};
use myradyn_ip_http::HttpIpSource;
use myradyn_ip_local::InterfaceEnumerator;
use myradyn_provider_myra::MyraProvider;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// A run that reached the engine exits 0 even when individual domains or
/// records failed; the log carries the details.
#[derive(Debug, Clone, Copy)]
enum MyraDynExitCode {
    /// The run completed
    Completed = 0,
    /// Command line or configuration error
    ConfigError = 1,
    /// Discovery failed or the runtime could not start
    RuntimeError = 2,
}

impl From<MyraDynExitCode> for ExitCode {
    fn from(code: MyraDynExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also end up here; nowhere left to report a
            // failed write to the terminal
            let _ = e.print();
            return if e.use_stderr() {
                MyraDynExitCode::ConfigError.into()
            } else {
                MyraDynExitCode::Completed.into()
            };
        }
    };

    let mut config = match config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return MyraDynExitCode::ConfigError.into();
        }
    };
    if cli.dry_run {
        config.dry_run = true;
    }

    for domain in &cli.domains {
        if let Err(e) = config::validate_domain_name(domain) {
            eprintln!("Invalid domain '{}': {}", domain, e);
            return MyraDynExitCode::ConfigError.into();
        }
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MyraDynExitCode::ConfigError.into();
    }

    info!(
        "Starting myra-dyn for {} domain(s){}",
        cli.domains.len(),
        if config.dry_run { " [DRY-RUN]" } else { "" }
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MyraDynExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(config, cli.domains)) {
        Ok(report) => {
            summarize(&report);
            MyraDynExitCode::Completed.into()
        }
        Err(e @ myradyn_core::Error::Config(_)) => {
            error!("{}", e);
            MyraDynExitCode::ConfigError.into()
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            MyraDynExitCode::RuntimeError.into()
        }
    }
}

/// Discover the public address and synchronize every domain to it
async fn run(config: MyraDynConfig, domains: Vec<String>) -> myradyn_core::Result<SyncReport> {
    let interfaces = match &config.interface {
        Some(name) => InterfaceEnumerator::for_interface(name),
        None => InterfaceEnumerator::new(),
    };
    let fallback = HttpIpSource::new(&config.ip_detection, config.http_timeout())?;
    let discovery = IpDiscovery::new(Box::new(interfaces), Box::new(fallback));

    let ip = discovery.discover().await?;
    info!("Public IP address: {}", ip);

    let provider = MyraProvider::from_config(&config)?;
    let engine = SyncEngine::new(Arc::new(provider), config.engine())?;

    Ok(engine.run(&domains, ip).await)
}

fn summarize(report: &SyncReport) {
    if !report.is_clean() {
        warn!(
            "Some records were not synchronized to {}; see the log above for details",
            report.ip
        );
    }
}
