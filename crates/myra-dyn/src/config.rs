//! Loading and validating the run configuration

use anyhow::{Context, Result};
use myradyn_core::MyraDynConfig;
use std::path::Path;

/// Overrides the `apikey` key
pub const ENV_API_KEY: &str = "MYRA_DYN_API_KEY";
/// Overrides the `secret` key
pub const ENV_SECRET: &str = "MYRA_DYN_SECRET";

/// Read `path`, apply environment overrides and validate
pub fn load(path: &Path) -> Result<MyraDynConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let mut config = parse(&text)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

/// Parse the YAML configuration
pub fn parse(text: &str) -> Result<MyraDynConfig> {
    Ok(serde_yaml::from_str(text)?)
}

/// Replace credentials with non-empty values from the environment
pub fn apply_env_overrides<F>(config: &mut MyraDynConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
        config.api_key = api_key;
    }
    if let Some(secret) = lookup(ENV_SECRET).filter(|v| !v.is_empty()) {
        config.secret = secret;
    }
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
pub fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}
