use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Path of the embedded web server's dispatcher page.
pub const USAGE_PATH: &str = "/hp/device/this.LCDispatcher";

/// Query selecting the usage view on the dispatcher page.
pub const USAGE_QUERY: (&str, &str) = ("nav", "hp.Usage");

pub const DEFAULT_PORT: u16 = 443;

/// A printer's embedded web server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Root URL of the printer, `https://{host}[:{port}]/`.
    ///
    /// Port 443 is left implicit. Bare IPv6 literals are bracketed.
    pub fn base_url(&self) -> Result<Url, Error> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        let raw = if self.port == DEFAULT_PORT {
            format!("https://{host}/")
        } else {
            format!("https://{host}:{}/", self.port)
        };
        Ok(Url::parse(&raw)?)
    }

    /// Full URL of the usage page.
    pub fn usage_url(&self) -> Result<Url, Error> {
        usage_url(&self.base_url()?)
    }
}

/// Append the usage page path and query to a printer root URL.
pub fn usage_url(base: &Url) -> Result<Url, Error> {
    let mut url = base.join(USAGE_PATH)?;
    url.query_pairs_mut()
        .clear()
        .append_pair(USAGE_QUERY.0, USAGE_QUERY.1);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_implicit() {
        let endpoint = Endpoint::new("printer.lan", 443);
        assert_eq!(
            endpoint.usage_url().unwrap().as_str(),
            "https://printer.lan/hp/device/this.LCDispatcher?nav=hp.Usage"
        );
    }

    #[test]
    fn explicit_port_is_kept() {
        let endpoint = Endpoint::new("10.0.0.20", 8443);
        assert_eq!(
            endpoint.usage_url().unwrap().as_str(),
            "https://10.0.0.20:8443/hp/device/this.LCDispatcher?nav=hp.Usage"
        );
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let endpoint = Endpoint::new("fd00::20", 443);
        assert_eq!(
            endpoint.base_url().unwrap().as_str(),
            "https://[fd00::20]/"
        );
    }

    #[test]
    fn malformed_host_is_invalid_url() {
        let endpoint = Endpoint::new("bad host", 443);
        assert!(matches!(endpoint.usage_url(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn usage_url_joins_onto_mock_base() {
        let base = Url::parse("http://127.0.0.1:9000").unwrap();
        assert_eq!(
            usage_url(&base).unwrap().as_str(),
            "http://127.0.0.1:9000/hp/device/this.LCDispatcher?nav=hp.Usage"
        );
    }
}
