// Transport configuration for building the pinned reqwest::Client.
//
// The printer's certificate is validated against one operator-supplied
// anchor. Built-in roots are switched off so nothing else is trusted.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;

/// Where the pinned trust anchor comes from.
#[derive(Debug, Clone)]
pub enum TrustAnchor {
    /// PEM file on disk, read each time a client is built.
    PemFile(PathBuf),
    /// PEM bytes already in memory.
    Pem(Vec<u8>),
}

impl TrustAnchor {
    fn pem(&self) -> Result<Cow<'_, [u8]>, Error> {
        match self {
            Self::PemFile(path) => std::fs::read(path).map(Cow::Owned).map_err(|e| {
                Error::Tls(format!("failed to read CA cert {}: {e}", path.display()))
            }),
            Self::Pem(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

/// Transport configuration for the usage client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub trust_anchor: TrustAnchor,
    /// Whole-request timeout. `None` keeps reqwest's default (no timeout).
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Pin to the PEM file at `path`.
    pub fn pinned(path: impl Into<PathBuf>) -> Self {
        Self {
            trust_anchor: TrustAnchor::PemFile(path.into()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a `reqwest::Client` that trusts only the configured anchor.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let pem = self.trust_anchor.pem()?;
        let certs = reqwest::Certificate::from_pem_bundle(&pem)
            .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
        if certs.is_empty() {
            return Err(Error::Tls("no certificates found in CA bundle".into()));
        }
        debug!(anchors = certs.len(), "pinning trust anchor");

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .user_agent(concat!("hpmon/", env!("CARGO_PKG_VERSION")));

        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
