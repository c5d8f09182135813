use std::error::Error as StdError;

use thiserror::Error;

/// Top-level error type for the `hpmon-api` crate.
///
/// Covers the two halves of a sampling fetch: getting the usage page off the
/// printer (TLS, transport, HTTP status) and pulling the counters out of it.
/// `hpmon-core` maps these into its cycle-level taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Trust anchor could not be loaded, or the HTTP client could not be built.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The printer presented a certificate chain the pinned anchor does not accept.
    #[error("Server certificate for {url} rejected by the pinned trust anchor")]
    TlsVerification {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction failed (usually a malformed host).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The printer answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    // ── Markup ──────────────────────────────────────────────────────
    /// The body could not be turned into a document at all.
    #[error("Usage page could not be parsed: {0}")]
    Parse(String),

    /// A counter cell was not present at its structural path.
    #[error("Usage cell '{cell}' not found in page")]
    PathNotFound { cell: &'static str },

    /// A counter cell was present but did not hold a page count.
    #[error("Usage cell '{cell}' is not a page count: {text:?}")]
    NumericFormat { cell: &'static str, text: String },
}

impl Error {
    /// Classify a `send()` failure, splitting certificate rejections out of
    /// generic transport errors.
    pub(crate) fn from_send(err: reqwest::Error, url: &url::Url) -> Self {
        if is_certificate_rejection(&err) {
            Self::TlsVerification {
                url: url.to_string(),
                source: err,
            }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if the failure happened while talking to the printer
    /// rather than while reading its page.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Tls(_)
                | Self::TlsVerification { .. }
                | Self::Transport(_)
                | Self::InvalidUrl(_)
                | Self::HttpStatus { .. }
        )
    }

    /// Returns `true` if the page was fetched but the counters could not be read.
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::PathNotFound { .. } | Self::NumericFormat { .. }
        )
    }
}

/// Walk an error chain looking for a rustls certificate rejection.
///
/// hyper wraps the handshake failure in an `io::Error`, whose `source()`
/// skips the wrapped error itself, so `io::Error::get_ref` is checked too.
pub fn is_certificate_rejection(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(tls) = e.downcast_ref::<rustls::Error>() {
            if matches!(tls, rustls::Error::InvalidCertificate(_)) {
                return true;
            }
        }
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if let Some(inner) = io.get_ref() {
                if is_certificate_rejection(inner) {
                    return true;
                }
            }
        }
        current = e.source();
    }
    false
}
