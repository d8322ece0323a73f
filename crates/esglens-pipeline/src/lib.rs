//! The esglens ingestion-and-analysis pipeline.
//!
//! Coordinates three concurrency regimes: the periodic cycle scheduler
//! ([`cycle`]), the I/O-bound concurrent fetch stage ([`fetch`]), and the
//! resource-aware classification fan-out ([`fanout`]). Per-article ingestion
//! logic lives in [`ingest`], organization recognition in [`recognize`].

pub mod cycle;
pub mod error;
pub mod fanout;
pub mod fetch;
pub mod ingest;
pub mod recognize;

pub use cycle::{run_cycle, run_scheduler, CycleGuard, CyclePermit, CycleSummary};
pub use error::{IngestError, PipelineError};
pub use fanout::{run_fanout, worker_pool_size, FanoutSummary};
pub use fetch::{partition_terms, run_fetch_stage, FetchedArticle};
pub use ingest::{ingest_article, IngestOutcome};
pub use recognize::EntityMatcher;
