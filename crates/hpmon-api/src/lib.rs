// hpmon-api: Pinned-TLS client and markup extractor for HP printer usage pages

pub mod client;
pub mod endpoint;
pub mod error;
pub mod transport;
pub mod usage;

pub use client::UsageClient;
pub use endpoint::Endpoint;
pub use error::Error;
pub use transport::{TransportConfig, TrustAnchor};
pub use usage::{Cell, Counters, UsagePage};
