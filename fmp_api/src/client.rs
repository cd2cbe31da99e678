//! HTTP client for the Financial Modeling Prep API.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::{query::Query, Error};

/// Request timeout for every upstream call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Key used when none is configured. FMP serves a handful of symbols for it.
pub const DEMO_API_KEY: &str = "demo";

/// API family an endpoint belongs to. Each family has its own base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// The legacy `/api/v3` endpoints (quote, profile, search, intraday chart).
    V3,
    /// The `/stable` endpoints (end-of-day history).
    Stable,
    /// The keyless exchange-rate service.
    Fx,
}

/// Base URLs for each API family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    pub v3: String,
    pub stable: String,
    pub fx: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            v3: "https://financialmodelingprep.com/api/v3".to_string(),
            stable: "https://financialmodelingprep.com/stable".to_string(),
            fx: "https://api.exchangerate-api.com".to_string(),
        }
    }
}

impl BaseUrls {
    /// Points every family at one server, using the production path prefixes.
    /// Used for testing with wiremock.
    pub fn single(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            v3: format!("{}/api/v3", root),
            stable: format!("{}/stable", root),
            fx: root.to_string(),
        }
    }

    fn for_api(&self, api: Api) -> &str {
        match api {
            Api::V3 => &self.v3,
            Api::Stable => &self.stable,
            Api::Fx => &self.fx,
        }
    }
}

/// HTTP client for the FMP API.
///
/// Issues exactly one GET per call with a 10-second timeout. Retrying,
/// pacing, and caching are the caller's business.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_urls: BaseUrls,
}

impl Client {
    /// Creates a new client pointing at the production endpoints.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Self::with_base_urls(BaseUrls::default(), api_key)
    }

    /// Creates a new client with custom base URLs. Used for testing with wiremock.
    pub fn with_base_urls(base_urls: BaseUrls, api_key: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stratdesk/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed(e.to_string())
            })?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_urls,
        })
    }

    /// Whether a real API key (anything other than the demo key) is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != DEMO_API_KEY
    }

    fn get_url(&self, query: &impl Query) -> Result<Url, Error> {
        let base = self.base_urls.for_api(query.api()).trim_end_matches('/');
        let raw = format!("{}/{}", base, query.path());
        let url = Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed(format!("invalid url {}: {}", raw, e))
        })?;
        let mut url = query.add_to_url(&url);
        if query.api() != Api::Fx {
            url.query_pairs_mut().append_pair("apikey", &self.api_key);
        }
        Ok(url)
    }

    /// Sends one GET for `query` and returns the parsed JSON body.
    ///
    /// A 2xx body that is an object carrying `"Error Message"` (or `"error"`)
    /// is reported as [`Error::Provider`].
    pub async fn get<Q: Query>(&self, query: &Q) -> Result<Value, Error> {
        let url = self.get_url(query)?;
        tracing::debug!("GET {}/{}", self.base_urls.for_api(query.api()), query.path());

        let resp = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Failed to get resource: {}", e);
                Error::RequestFailed(e.without_url().to_string())
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::debug!("Failed to read response body: {}", e);
            Error::RequestFailed(e.without_url().to_string())
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<Value>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::debug!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::Parse(format!("{} | body: {}", e, snippet))
        })?;

        if let Some(message) = provider_error(&parsed) {
            return Err(Error::Provider(message));
        }

        Ok(parsed)
    }
}

/// Extracts the provider's in-band error message, if the body carries one.
fn provider_error(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    ["Error Message", "error"]
        .iter()
        .find_map(|field| obj.get(*field))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
