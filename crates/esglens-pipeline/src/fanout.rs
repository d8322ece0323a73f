//! The resource-aware classification fan-out stage.
//!
//! Sizes a bounded worker pool from the accelerator status reported by the
//! inference service, then drains the fetch queue through the ingestion
//! pipeline. Workers share no mutable state: each owns its own inference
//! client and pulls from one typed channel.

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use esglens_classify::{AcceleratorInfo, InferenceClient};
use esglens_core::AppConfig;

use crate::error::{IngestError, PipelineError};
use crate::fetch::FetchedArticle;
use crate::ingest::{ingest_article, IngestOutcome};
use crate::recognize::EntityMatcher;

/// Per-cycle fan-out counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanoutSummary {
    /// Articles newly classified and persisted.
    pub ingested: usize,
    /// Articles whose stored analysis was reused (dedup hits).
    pub reused: usize,
    /// Articles discarded because they mention no tracked organization.
    pub skipped: usize,
}

/// Size the classification worker pool.
///
/// Without an accelerator the pool is fixed at 1 — classification runs as a
/// single sequential unit of work to avoid oversubscribing a CPU-bound
/// model. With an accelerator of `M` GB and a per-worker budget of `P` GB
/// the pool is `max(1, M / P)`, a heuristic against out-of-memory failures
/// when several workers load model weights concurrently.
#[must_use]
pub fn worker_pool_size(
    use_accelerator: bool,
    accelerator: Option<AcceleratorInfo>,
    memory_gb_per_worker: u64,
) -> usize {
    if !use_accelerator {
        return 1;
    }

    match accelerator {
        Some(info) if info.available && info.memory_gb > 0 => {
            let per_worker = memory_gb_per_worker.max(1);
            usize::try_from((info.memory_gb / per_worker).max(1)).unwrap_or(1)
        }
        _ => 1,
    }
}

/// Drain the fetched articles through the ingestion pipeline.
///
/// A [`IngestError::NoRelevantEntity`] failure is caught, logged, and does
/// not abort sibling work. Any other error propagates and aborts the
/// remaining fan-out for this cycle (fail-fast), surfacing unanticipated
/// errors instead of silently dropping cycles.
///
/// # Errors
///
/// Returns [`PipelineError`] on the first unexpected per-article failure.
pub async fn run_fanout(
    pool: &SqlitePool,
    config: &AppConfig,
    matcher: Arc<EntityMatcher>,
    articles: Vec<FetchedArticle>,
) -> Result<FanoutSummary, PipelineError> {
    if articles.is_empty() {
        return Ok(FanoutSummary::default());
    }

    let accelerator = probe_accelerator(config).await;
    let pool_size = worker_pool_size(
        config.use_accelerator,
        accelerator,
        config.accelerator_memory_gb_per_worker,
    );
    tracing::info!(
        workers = pool_size,
        articles = articles.len(),
        "starting classification fan-out"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    for article in articles {
        // Receiver is alive until workers finish; the send cannot fail here.
        let _ = tx.send(article);
    }
    drop(tx);
    let rx = Arc::new(Mutex::new(rx));

    let mut workers: JoinSet<Result<FanoutSummary, IngestError>> = JoinSet::new();
    for worker_id in 0..pool_size {
        let pool = pool.clone();
        let rx = Arc::clone(&rx);
        let matcher = Arc::clone(&matcher);
        // Each worker owns its own inference client.
        let classifier = InferenceClient::new(&config.inference_url);

        workers.spawn(async move {
            let mut counters = FanoutSummary::default();
            loop {
                let next = { rx.lock().await.recv().await };
                let Some(article) = next else {
                    break;
                };

                match ingest_article(&pool, &classifier, &matcher, &article).await {
                    Ok(outcome) => {
                        log_outcome(worker_id, &article, &outcome);
                        if outcome.reused {
                            counters.reused += 1;
                        } else {
                            counters.ingested += 1;
                        }
                    }
                    Err(IngestError::NoRelevantEntity) => {
                        tracing::warn!(
                            worker = worker_id,
                            title = %article.title,
                            "skipping article: no tracked organization mentioned"
                        );
                        counters.skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(counters)
        });
    }

    let mut summary = FanoutSummary::default();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(counters)) => {
                summary.ingested += counters.ingested;
                summary.reused += counters.reused;
                summary.skipped += counters.skipped;
            }
            Ok(Err(e)) => {
                workers.abort_all();
                return Err(PipelineError::Ingest(e));
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                workers.abort_all();
                return Err(PipelineError::Worker(e.to_string()));
            }
        }
    }

    Ok(summary)
}

/// Query the inference service's accelerator status, degrading to "no
/// accelerator" when the probe fails or the feature is off.
async fn probe_accelerator(config: &AppConfig) -> Option<AcceleratorInfo> {
    if !config.use_accelerator {
        return None;
    }

    match InferenceClient::new(&config.inference_url)
        .accelerator_info()
        .await
    {
        Ok(info) => {
            tracing::info!(
                available = info.available,
                memory_gb = info.memory_gb,
                "accelerator probe"
            );
            Some(info)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "accelerator probe failed; running a single classification worker"
            );
            None
        }
    }
}

fn log_outcome(worker: usize, article: &FetchedArticle, outcome: &IngestOutcome) {
    let top_topics: Vec<String> = outcome
        .topics
        .iter()
        .take(3)
        .map(|t| format!("{} ({:.2})", t.label, t.probability))
        .collect();

    tracing::info!(
        worker,
        title = %article.title,
        organizations = ?outcome.organizations,
        sentiment = format!("{:.2}", outcome.sentiment),
        topics = ?top_topics,
        reused = outcome.reused,
        "article analyzed"
    );
}
