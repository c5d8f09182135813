// hpmon-core: Sampling cycle and page-count store between hpmon-api and the CLI.

pub mod clock;
pub mod config;
pub mod error;
pub mod rrd;
pub mod sampler;
pub mod store;
pub mod throttle;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SamplerConfig;
pub use error::CoreError;
pub use sampler::{CycleOutcome, CycleState, Sampler, SavedPage, UsageSource, probe};
pub use store::{Bootstrap, ensure_store, last_update, write_sample};
pub use throttle::{DEFAULT_MIN_INTERVAL, Decision, Throttle};

// Re-export the API types that appear in core signatures.
pub use hpmon_api::endpoint::DEFAULT_PORT;
pub use hpmon_api::{Counters, Endpoint, TransportConfig, TrustAnchor};
