use esglens_classify::ClassifyError;
use esglens_db::DbError;
use esglens_search::SearchError;
use thiserror::Error;

/// Per-article ingestion failure.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The article mentions no tracked organization. Caught by the fan-out
    /// worker: logged, counted, and the article discarded for this cycle.
    #[error("article mentions no tracked organization")]
    NoRelevantEntity,

    /// The classifier output lacks the distinguished "not relevant" label.
    /// A contract violation — fatal for the cycle's remaining fan-out.
    #[error("classifier output is missing the not-relevant label; got: {labels:?}")]
    ClassifierContract { labels: Vec<String> },

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Cycle-level failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("fan-out worker terminated abnormally: {0}")]
    Worker(String),
}
