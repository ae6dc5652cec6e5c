// # HTTP IP Source
//
// This crate asks an external "what is my IP" service for the host's
// public address.
//
// ## Purpose
//
// This is the **fallback tier** of discovery. Hosts behind NAT carry no
// public address on any interface, so the echo service is the source of
// truth in that common case.
//
// ## Protocol
//
// A plain GET; the response body must be a single IP literal, optionally
// surrounded by whitespace (e.g. https://api.ipify.org, https://icanhazip.com).

use async_trait::async_trait;
use myradyn_core::traits::IpSource;
use myradyn_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;

/// HTTP echo-service IP source
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `timeout`: Timeout for the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The echo service URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Parse an echo-service body into an address
pub fn parse_ip_body(body: &str) -> Result<IpAddr> {
    let ip_text = body.trim();
    ip_text
        .parse()
        .map_err(|_| Error::discovery(format!("Invalid IP address in response: {:?}", ip_text)))
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::discovery(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::discovery(format!(
                "{} answered HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::discovery(format!("Failed to read response: {}", e)))?;

        parse_ip_body(&ip_text)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
