// Usage page HTTP client
//
// One GET per sampling cycle against the printer's dispatcher page. No
// retries: a failed fetch ends the cycle and the next scheduled run tries
// again.

use tracing::debug;
use url::Url;

use crate::endpoint::{self, Endpoint};
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::usage::{self, Counters, UsagePage};

/// HTTP client for a single printer's usage page.
pub struct UsageClient {
    http: reqwest::Client,
    url: Url,
}

impl UsageClient {
    /// Create a client pinned to the trust anchor in `transport`.
    pub fn new(endpoint: &Endpoint, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let url = endpoint.usage_url()?;
        Ok(Self { http, url })
    }

    /// Create a client with a pre-built `reqwest::Client` against an
    /// arbitrary root URL.
    ///
    /// Used by tests pointing at a plain-HTTP mock server.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Result<Self, Error> {
        Ok(Self {
            http,
            url: endpoint::usage_url(base_url)?,
        })
    }

    /// The usage page URL this client fetches.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// GET the usage page and return its body, which must be UTF-8.
    pub async fn fetch_usage_page(&self) -> Result<String, Error> {
        let body = self.fetch_body().await?;
        Ok(usage::decode(&body)?.to_owned())
    }

    /// Fetch the usage page and read both counters from it.
    pub async fn fetch_counters(&self) -> Result<Counters, Error> {
        let body = self.fetch_body().await?;
        UsagePage::from_bytes(&body)?.counters()
    }

    async fn fetch_body(&self) -> Result<Vec<u8>, Error> {
        debug!("GET {}", self.url);

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::from_send(e, &self.url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = resp.bytes().await.map_err(Error::Transport)?;
        debug!(bytes = body.len(), "fetched usage page");
        Ok(body.to_vec())
    }
}
