//! The non-overlapping cycle scheduler.
//!
//! One scheduler task owns the in-flight flag and the interval. Ticks never
//! queue up: if a cycle is still running when its successor would start, the
//! tick is skipped and the next one is re-armed `interval` from now.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::time::MissedTickBehavior;

use esglens_core::AppConfig;
use esglens_search::NewsSearchClient;

use crate::error::PipelineError;
use crate::fanout::{run_fanout, FanoutSummary};
use crate::fetch::run_fetch_stage;
use crate::recognize::EntityMatcher;

/// Single in-flight flag guarding against overlapping cycles.
#[derive(Clone, Default)]
pub struct CycleGuard {
    in_flight: Arc<AtomicBool>,
}

/// RAII token for a running cycle; releases the guard on drop, including on
/// every error path.
pub struct CyclePermit {
    in_flight: Arc<AtomicBool>,
}

impl CycleGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to mark a cycle as in flight. `None` when one is already running.
    #[must_use]
    pub fn try_acquire(&self) -> Option<CyclePermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| CyclePermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for CyclePermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleSummary {
    /// Search terms fed into the fetch stage.
    pub terms: usize,
    /// Articles collected into the fetch queue.
    pub fetched: usize,
    pub fanout: FanoutSummary,
}

/// Run one full fetch + fan-out cycle.
///
/// # Errors
///
/// Returns [`PipelineError`] if the store cannot be read, the search client
/// cannot be built, or the fan-out aborts fail-fast.
pub async fn run_cycle(
    pool: &SqlitePool,
    config: &AppConfig,
) -> Result<CycleSummary, PipelineError> {
    let terms = esglens_db::search_terms(pool).await.map_err(PipelineError::Store)?;
    if terms.is_empty() {
        tracing::info!("no tracked organizations or synonyms; nothing to fetch");
        return Ok(CycleSummary::default());
    }
    let term_count = terms.len();

    let search = Arc::new(NewsSearchClient::new(
        &config.search_base_url,
        config.fetch_timeout_secs,
    )?);

    tracing::info!(terms = term_count, "starting news search");
    let fetched = run_fetch_stage(
        search,
        terms,
        config.max_fetch_threads,
        config.scrape_full_articles,
    )
    .await;

    let fetched_count = fetched.len();

    let matcher = Arc::new(
        EntityMatcher::from_store(pool)
            .await
            .map_err(PipelineError::Store)?,
    );

    let fanout = run_fanout(pool, config, matcher, fetched).await?;

    Ok(CycleSummary {
        terms: term_count,
        fetched: fetched_count,
        fanout,
    })
}

/// Run cycles forever at the configured interval.
///
/// Never returns under normal operation. A busy previous cycle causes the
/// tick to be skipped (logged), and an error inside a cycle is logged
/// without terminating the scheduler. The first cycle starts immediately.
pub async fn run_scheduler(pool: &SqlitePool, config: &AppConfig) {
    let guard = CycleGuard::new();
    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.cycle_interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        interval_secs = config.cycle_interval_secs,
        "cycle scheduler started"
    );

    loop {
        ticker.tick().await;

        let Some(permit) = guard.try_acquire() else {
            tracing::warn!("previous cycle still in flight; skipping this tick");
            continue;
        };

        match run_cycle(pool, config).await {
            Ok(summary) => {
                tracing::info!(
                    terms = summary.terms,
                    fetched = summary.fetched,
                    ingested = summary.fanout.ingested,
                    reused = summary.fanout.reused,
                    skipped = summary.fanout.skipped,
                    "cycle complete"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "cycle failed");
            }
        }

        drop(permit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_a_second_acquisition_while_held() {
        let guard = CycleGuard::new();
        let permit = guard.try_acquire().expect("first acquisition succeeds");
        assert!(guard.is_busy());
        assert!(guard.try_acquire().is_none(), "overlapping cycle must be rejected");
        drop(permit);
    }

    #[test]
    fn guard_is_released_on_permit_drop() {
        let guard = CycleGuard::new();
        {
            let _permit = guard.try_acquire().expect("acquisition succeeds");
        }
        assert!(!guard.is_busy());
        assert!(guard.try_acquire().is_some(), "guard must re-arm after release");
    }
}
