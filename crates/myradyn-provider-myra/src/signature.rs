// # Myra Request Signing
//
// Every Myra API call carries a `MYRA` authorization header computed over a
// canonical form of the request:
//
// ```text
// signing string = md5(body) # METHOD # request-uri # content-type # date
// date key       = hex(HMAC-SHA256("MYRA" + secret, date))
// signing key    = hex(HMAC-SHA256(date key, "myra-api-request"))
// signature      = base64(HMAC-SHA512(signing key, signing string))
// ```
//
// The request URI has its query pairs sorted so that the order in which
// parameters were added never changes the signature.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use myradyn_core::{Error, Result};
use reqwest::Method;
use sha2::{Sha256, Sha512};
use url::Url;

/// Content type of every signed request
pub const CONTENT_TYPE: &str = "application/json";

const KEY_PREFIX: &str = "MYRA";
const SIGNING_CONTEXT: &str = "myra-api-request";

/// API credentials
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    /// ⚠️ NEVER log this value
    secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

// Custom Debug implementation that hides the secret
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// A request ready to be sent, with its authentication headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    /// Target URL, query in canonical order
    pub url: Url,
    /// Value of the `Date` header
    pub date: String,
    /// Value of the `Content-Type` header
    pub content_type: String,
    /// Value of the `Authorization` header
    pub authorization: String,
    pub body: Vec<u8>,
}

/// Sign a request at the current instant
pub fn sign(
    credentials: &Credentials,
    method: Method,
    url: Url,
    body: Vec<u8>,
) -> Result<SignedRequest> {
    sign_at(credentials, method, url, body, Utc::now())
}

/// Sign a request as if sent at `date`
///
/// Pure: the same inputs always produce the same [`SignedRequest`].
pub fn sign_at(
    credentials: &Credentials,
    method: Method,
    url: Url,
    body: Vec<u8>,
    date: DateTime<Utc>,
) -> Result<SignedRequest> {
    let url = canonical_url(url)?;
    let date = date.to_rfc3339_opts(SecondsFormat::Secs, true);

    let signing_string = signing_string(&method, &url, &body, &date);

    let date_secret = format!("{}{}", KEY_PREFIX, credentials.secret);
    let date_key = hmac_sha256_hex(date_secret.as_bytes(), date.as_bytes())?;
    let signing_key = hmac_sha256_hex(date_key.as_bytes(), SIGNING_CONTEXT.as_bytes())?;

    let mut mac = Hmac::<Sha512>::new_from_slice(signing_key.as_bytes())
        .map_err(|e| Error::signing(format!("Invalid signing key: {}", e)))?;
    mac.update(signing_string.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    Ok(SignedRequest {
        method,
        url,
        date,
        content_type: CONTENT_TYPE.to_string(),
        authorization: format!("{} {}:{}", KEY_PREFIX, credentials.api_key, signature),
        body,
    })
}

/// Path plus sorted, form-encoded query
pub fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
        _ => url.path().to_string(),
    }
}

fn signing_string(method: &Method, url: &Url, body: &[u8], date: &str) -> String {
    format!(
        "{:x}#{}#{}#{}#{}",
        Md5::digest(body),
        method.as_str(),
        request_uri(url),
        CONTENT_TYPE,
        date
    )
}

fn canonical_url(mut url: Url) -> Result<Url> {
    if url.cannot_be_a_base() {
        return Err(Error::signing(format!("Not a request URL: {}", url)));
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        pairs.sort();
        url.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
    Ok(url)
}

fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| Error::signing(format!("Invalid HMAC key: {}", e)))?;
    mac.update(data);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}
