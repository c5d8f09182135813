// ── Sampling cycle ──
//
// One cycle walks a fixed sequence of states:
//
//   Init → StoreReady → Fetched → Extracted → Decided → Updated | Skipped
//
// Any failing step moves straight to Failed and the cycle ends with that
// step's error. Nothing is retried within a cycle.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use hpmon_api::{Counters, UsageClient, usage};
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span};

use crate::clock::{Clock, SystemClock};
use crate::config::SamplerConfig;
use crate::error::CoreError;
use crate::store;
use crate::throttle::{Decision, Throttle};

// ── Page sources ─────────────────────────────────────────────────────

/// Where a cycle gets its usage page markup from.
pub trait UsageSource: Sync {
    fn fetch_page(&self) -> impl Future<Output = Result<String, CoreError>> + Send;
}

impl<T: UsageSource> UsageSource for &T {
    fn fetch_page(&self) -> impl Future<Output = Result<String, CoreError>> + Send {
        (**self).fetch_page()
    }
}

impl UsageSource for UsageClient {
    async fn fetch_page(&self) -> Result<String, CoreError> {
        Ok(self.fetch_usage_page().await?)
    }
}

/// A usage page saved to disk, for working without the printer.
#[derive(Debug, Clone)]
pub struct SavedPage {
    path: PathBuf,
}

impl SavedPage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UsageSource for SavedPage {
    async fn fetch_page(&self) -> Result<String, CoreError> {
        let bytes = std::fs::read(&self.path).map_err(|source| CoreError::PageRead {
            path: self.path.clone(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|e| CoreError::ParseFailure {
            message: format!("usage page is not valid UTF-8: {e}"),
        })
    }
}

// ── Cycle state ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Init,
    StoreReady,
    Fetched,
    Extracted,
    Decided,
    Updated,
    Skipped,
    Failed,
}

impl CycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Updated | Self::Skipped | Self::Failed)
    }

    fn advance(&mut self, next: Self) {
        debug!(from = %self, to = %next, "cycle state");
        *self = next;
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::StoreReady => "store-ready",
            Self::Fetched => "fetched",
            Self::Extracted => "extracted",
            Self::Decided => "decided",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a successful cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// A sample was written at `at`.
    Updated {
        counters: Counters,
        at: DateTime<Utc>,
    },
    /// The last sample is too recent; nothing was written.
    Skipped { counters: Counters, since_last: i64 },
}

impl CycleOutcome {
    pub fn counters(&self) -> Counters {
        match self {
            Self::Updated { counters, .. } | Self::Skipped { counters, .. } => *counters,
        }
    }

    pub fn state(&self) -> CycleState {
        match self {
            Self::Updated { .. } => CycleState::Updated,
            Self::Skipped { .. } => CycleState::Skipped,
        }
    }
}

// ── Sampler ──────────────────────────────────────────────────────────

/// Runs sampling cycles for one printer into one store.
pub struct Sampler<S, C = SystemClock> {
    source: S,
    clock: C,
    store_path: PathBuf,
    throttle: Throttle,
}

impl Sampler<UsageClient> {
    /// Build a sampler that fetches from the configured printer.
    pub fn from_config(config: &SamplerConfig) -> Result<Self, CoreError> {
        let client = UsageClient::new(&config.endpoint, &config.transport)?;
        Ok(Self::new(client, config.store_path.clone(), config.throttle()))
    }
}

impl<S: UsageSource> Sampler<S> {
    pub fn new(source: S, store_path: impl Into<PathBuf>, throttle: Throttle) -> Self {
        Self::with_clock(source, SystemClock, store_path, throttle)
    }
}

impl<S: UsageSource, C: Clock> Sampler<S, C> {
    pub fn with_clock(
        source: S,
        clock: C,
        store_path: impl Into<PathBuf>,
        throttle: Throttle,
    ) -> Self {
        Self {
            source,
            clock,
            store_path: store_path.into(),
            throttle,
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Bootstrap the store, fetch and extract the counters, and write them
    /// if the throttle allows.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CoreError> {
        let span = info_span!("cycle", store = %self.store_path.display());
        async {
            let mut state = CycleState::Init;
            match self.steps(&mut state).await {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    debug!(at = %state, operation = e.operation(), "cycle aborted");
                    state.advance(CycleState::Failed);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Fetch and extract only. The store is not touched.
    pub async fn probe(&self) -> Result<Counters, CoreError> {
        probe(&self.source).await
    }

    async fn steps(&self, state: &mut CycleState) -> Result<CycleOutcome, CoreError> {
        store::ensure_store(&self.store_path)?;
        state.advance(CycleState::StoreReady);

        let page = self.source.fetch_page().await?;
        state.advance(CycleState::Fetched);

        let counters = usage::extract(&page)?;
        drop(page);
        state.advance(CycleState::Extracted);

        let now = self.clock.now();
        let decision = self.throttle.decide(&self.store_path, now.timestamp())?;
        state.advance(CycleState::Decided);

        match decision {
            Decision::Update => {
                store::write_sample(&self.store_path, now.timestamp(), counters)?;
                state.advance(CycleState::Updated);
                info!(
                    simplex = counters.simplex,
                    duplex = counters.duplex,
                    "updated store"
                );
                Ok(CycleOutcome::Updated {
                    counters,
                    at: truncate_to_secs(now),
                })
            }
            Decision::Skip { since_last } => {
                state.advance(CycleState::Skipped);
                info!(since_last, "too soon, not updating");
                Ok(CycleOutcome::Skipped {
                    counters,
                    since_last,
                })
            }
        }
    }
}

/// Fetch a page from `source` and read both counters from it.
pub async fn probe<S: UsageSource>(source: &S) -> Result<Counters, CoreError> {
    let page = source.fetch_page().await?;
    let counters = usage::extract(&page)?;
    debug!(
        simplex = counters.simplex,
        duplex = counters.duplex,
        "counters extracted"
    );
    Ok(counters)
}

/// The store keeps whole seconds; report the instant actually recorded.
fn truncate_to_secs(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(at.timestamp(), 0).single().unwrap_or(at)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(CycleState::Updated.is_terminal());
        assert!(CycleState::Skipped.is_terminal());
        assert!(CycleState::Failed.is_terminal());
        assert!(!CycleState::Decided.is_terminal());
        assert_eq!(CycleState::StoreReady.to_string(), "store-ready");
    }

    #[test]
    fn advance_moves_state() {
        let mut state = CycleState::Init;
        state.advance(CycleState::StoreReady);
        assert_eq!(state, CycleState::StoreReady);
    }

    #[tokio::test]
    async fn saved_page_reads_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.html");
        std::fs::write(
            &path,
            r#"<table id="tbl-1851"><tr><th>Size</th></tr>
               <tr><td>Letter</td><td><div>2,048</div></td><td><div>16</div></td></tr></table>"#,
        )
        .unwrap();

        let counters = probe(&SavedPage::new(&path)).await.unwrap();
        assert_eq!(
            counters,
            Counters {
                simplex: 2_048,
                duplex: 16
            }
        );
    }

    #[tokio::test]
    async fn saved_page_must_be_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.html");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = probe(&SavedPage::new(&path)).await.unwrap_err();
        assert!(matches!(err, CoreError::ParseFailure { .. }));
    }

    #[tokio::test]
    async fn missing_saved_page_is_a_read_error() {
        let err = probe(&SavedPage::new("/nonexistent/usage.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PageRead { .. }));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = CycleOutcome::Skipped {
            counters: Counters {
                simplex: 1,
                duplex: 2,
            },
            since_last: 600,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["counters"]["duplex"], 2);
        assert_eq!(json["since_last"], 600);
        assert_eq!(outcome.state(), CycleState::Skipped);
    }
}
