//! Command-line interface

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

/// Point the A/AAAA records of Myra Cloud domains at this machine's public IP
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "myra-dyn", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long, value_name = "FILE", default_value = "./config.yml")]
    pub config: PathBuf,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = LogLevel::Info,
        value_name = "LEVEL",
        env = "MYRA_DYN_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Do not change any record, only log what would be sent
    #[arg(long, short = 'd', action, default_value_t = false)]
    pub dry_run: bool,

    /// Domains whose records should follow the public IP
    #[arg(value_name = "DOMAIN", required = true, num_args = 1..)]
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}
