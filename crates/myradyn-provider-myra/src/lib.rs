// # Myra Cloud DNS Provider
//
// This crate implements [`RecordRepository`] against the Myra Cloud REST API.
//
// ## Behavior
//
// - One signed HTTP request per call (no retries; the engine gives each
//   record exactly one attempt per run)
// - HTTP timeout taken from configuration
// - Business rejections (non-2xx or `error: true`) become
//   [`UpdateOutcome::Rejected`], transport failures become errors
// - Dry-run mode: listing still happens, updates are logged instead of sent
//
// ## Security Requirements
//
// - The API secret NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - List records: GET `/{lang}/rapi/dnsRecords/{domain}/{page}?activeOnly=..&pageSize=..&recordTypes=..`
// - Update record: POST `/{lang}/rapi/dnsRecords/{domain}` with the record as body

pub mod models;
pub mod signature;

use async_trait::async_trait;
use chrono::Utc;
use models::{QueryResponse, ResultResponse};
use myradyn_core::config::MyraDynConfig;
use myradyn_core::traits::{DnsRecord, ListOptions, RecordRepository, UpdateOutcome, Violation};
use myradyn_core::{Error, Result};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use std::net::IpAddr;
use std::time::Duration;
use url::Url;

pub use signature::{Credentials, SignedRequest, sign, sign_at};

/// Myra API base URL
pub const DEFAULT_API_BASE: &str = "https://api.myracloud.com";

/// Longest response excerpt quoted in errors and synthesized violations
const MAX_BODY_EXCERPT: usize = 256;

/// Turn a configured host into the API base URL
///
/// A host without a scheme gets `https://`.
pub fn api_base_url(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::config("API host cannot be empty"));
    }

    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::config(format!("Invalid API host '{}': {}", host, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("Invalid API host '{}'", host)));
    }
    Ok(url)
}

/// Myra Cloud record repository
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all list requests
/// - Sign and log the intended update payload
/// - **NOT** send the update
pub struct MyraProvider {
    credentials: Credentials,

    /// Scheme and host of the API, e.g. `https://api.myracloud.com`
    base_url: Url,

    /// Language segment of every API path
    language: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    dry_run: bool,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for MyraProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyraProvider")
            .field("credentials", &"<REDACTED>")
            .field("base_url", &self.base_url.as_str())
            .field("language", &self.language)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl MyraProvider {
    /// Create a new Myra provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: API key and secret
    /// - `base_url`: API base, see [`api_base_url`]
    /// - `language`: Language segment of the API path (e.g. "en")
    /// - `timeout`: HTTP timeout for every request
    /// - `dry_run`: If true, list records but skip updates
    pub fn new(
        credentials: Credentials,
        base_url: Url,
        language: impl Into<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        if credentials.api_key().is_empty() {
            return Err(Error::config("Myra API key is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            base_url,
            language: language.into(),
            client,
            dry_run,
        })
    }

    /// Create a provider from the validated configuration
    pub fn from_config(config: &MyraDynConfig) -> Result<Self> {
        if config.dry_run {
            tracing::warn!("Myra provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(
            Credentials::new(config.api_key.clone(), config.secret.clone()),
            api_base_url(&config.host)?,
            config.language.clone(),
            config.http_timeout(),
            config.dry_run,
        )
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// `{base}/{lang}/rapi/dnsRecords/{domain}[/{page}]`
    fn records_url(&self, domain: &str, page: Option<u32>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config(format!("Invalid API base URL: {}", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend([self.language.as_str(), "rapi", "dnsRecords", domain]);
            if let Some(page) = page {
                segments.push(&page.to_string());
            }
        }
        Ok(url)
    }

    async fn send(&self, request: SignedRequest) -> reqwest::Result<reqwest::Response> {
        self.client
            .request(request.method, request.url)
            .header(DATE, request.date)
            .header(CONTENT_TYPE, request.content_type)
            .header(AUTHORIZATION, request.authorization)
            .body(request.body)
            .send()
            .await
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() > MAX_BODY_EXCERPT {
        let cut: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

/// Violation standing in for a rejection that carried none
fn synthesized_violation(status: reqwest::StatusCode, body: &str) -> Violation {
    Violation {
        path: String::new(),
        message: format!("HTTP {}: {}", status, excerpt(body)),
    }
}

#[async_trait]
impl RecordRepository for MyraProvider {
    /// List the records of a domain
    ///
    /// Only the first page is fetched. When the API reports more matching
    /// records than it returned, a warning names the domain.
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /en/rapi/dnsRecords/example.com/1?activeOnly=true&pageSize=1000&recordTypes=A,AAAA
    /// Authorization: MYRA <key>:<signature>
    /// ```
    async fn list(&self, domain: &str, options: &ListOptions) -> Result<Vec<DnsRecord>> {
        let mut url = self
            .records_url(domain, Some(1))
            .map_err(|e| Error::fetch(domain, e.to_string()))?;

        let record_types = options
            .record_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut()
            .append_pair("activeOnly", if options.active_only { "true" } else { "false" })
            .append_pair("pageSize", &options.page_size.to_string())
            .append_pair("recordTypes", &record_types);

        let request = sign(&self.credentials, Method::GET, url, Vec::new())
            .map_err(|e| Error::fetch(domain, e.to_string()))?;

        tracing::debug!("Listing records: GET {}", request.url);

        let response = self
            .send(request)
            .await
            .map_err(|e| Error::fetch(domain, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(domain, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::fetch(
                domain,
                format!("HTTP {}: {}", status, excerpt(&body)),
            ));
        }

        let query: QueryResponse = serde_json::from_str(&body)
            .map_err(|e| Error::fetch(domain, format!("Failed to parse response: {}", e)))?;

        if query.error {
            return Err(Error::fetch(
                domain,
                format!("API reported an error: {}", excerpt(&body)),
            ));
        }

        if query.count > query.list.len() {
            tracing::warn!(
                "{}: API reports {} matching records but returned {} (page size {}); the rest are not checked",
                domain,
                query.count,
                query.list.len(),
                options.page_size
            );
        }

        tracing::debug!("{}: {} record(s) listed", domain, query.list.len());
        Ok(query.list)
    }

    /// Point a record at a new address and submit it
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /en/rapi/dnsRecords/example.com
    /// Authorization: MYRA <key>:<signature>
    ///
    /// { "id": 7, "name": "www", "value": "203.0.113.7", "recordType": "A", ... }
    /// ```
    async fn update(
        &self,
        domain: &str,
        mut record: DnsRecord,
        new_ip: IpAddr,
    ) -> Result<UpdateOutcome> {
        let name = record.name.clone();
        record.retarget(new_ip, Utc::now());

        let body = serde_json::to_vec(&record)
            .map_err(|e| Error::update(domain, &name, format!("Failed to encode record: {}", e)))?;
        let url = self
            .records_url(domain, None)
            .map_err(|e| Error::update(domain, &name, e.to_string()))?;
        let request = sign(&self.credentials, Method::POST, url, body)
            .map_err(|e| Error::update(domain, &name, e.to_string()))?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would POST {} with payload: {}",
                request.url,
                String::from_utf8_lossy(&request.body)
            );
            return Ok(UpdateOutcome::Updated {
                record: Some(record),
            });
        }

        tracing::debug!("Updating {} in {}: POST {}", name, domain, request.url);

        let response = self
            .send(request)
            .await
            .map_err(|e| Error::update(domain, &name, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::update(domain, &name, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let violations = serde_json::from_str::<ResultResponse>(&text)
                .ok()
                .map(|result| result.violation_list)
                .filter(|violations| !violations.is_empty())
                .unwrap_or_else(|| vec![synthesized_violation(status, &text)]);
            return Ok(UpdateOutcome::Rejected { violations });
        }

        let result: ResultResponse = serde_json::from_str(&text).map_err(|e| {
            Error::update(domain, &name, format!("Failed to parse response: {}", e))
        })?;

        if result.error {
            let violations = if result.violation_list.is_empty() {
                vec![synthesized_violation(status, &text)]
            } else {
                result.violation_list
            };
            return Ok(UpdateOutcome::Rejected { violations });
        }

        Ok(UpdateOutcome::Updated {
            record: result.target_object.into_iter().next(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "myra"
    }
}
