//! Idempotent per-article ingestion.

use sqlx::SqlitePool;

use esglens_classify::{Classification, InferenceClient, TopicScore, NOT_RELEVANT_LABEL};
use esglens_db::{ArticleRow, DbError, NewArticle};

use crate::error::IngestError;
use crate::fetch::FetchedArticle;
use crate::recognize::EntityMatcher;

/// The result record of one ingestion: what was recognized, how the article
/// scored, and whether an earlier analysis was reused. For logging and
/// observability — not stored separately.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub article_id: i64,
    /// True when the text was already in the store and its stored
    /// classification was reused.
    pub reused: bool,
    pub organizations: Vec<String>,
    pub sentiment: f64,
    pub topics: Vec<TopicScore>,
}

/// Run one article through recognize → dedup → classify → persist.
///
/// Idempotent across cycles: identical text yields exactly one stored
/// article; re-ingestion only attaches newly recognized organizations. Two
/// concurrent attempts on identical text race on the store's unique text
/// constraint, and the loser takes the attach path.
///
/// # Errors
///
/// - [`IngestError::NoRelevantEntity`] — no tracked organization occurs in
///   the text; the article is discarded for this cycle.
/// - [`IngestError::ClassifierContract`] — the classifier omitted the
///   distinguished not-relevant label.
/// - [`IngestError::Classify`] / [`IngestError::Store`] — capability or
///   storage failure.
pub async fn ingest_article(
    pool: &SqlitePool,
    classifier: &InferenceClient,
    matcher: &EntityMatcher,
    article: &FetchedArticle,
) -> Result<IngestOutcome, IngestError> {
    let recognized = matcher.recognize(&article.body);
    if recognized.is_empty() {
        return Err(IngestError::NoRelevantEntity);
    }

    if let Some(existing) = esglens_db::get_article_by_text(pool, &article.body).await? {
        return reuse_existing(pool, &existing, recognized).await;
    }

    let classification = classifier.classify(&article.body).await?;
    let relevancy = relevancy_score(&classification).ok_or_else(|| {
        IngestError::ClassifierContract {
            labels: classification
                .topics
                .iter()
                .map(|t| t.label.clone())
                .collect(),
        }
    })?;

    let new_article = NewArticle {
        text: &article.body,
        title: &article.title,
        link: &article.link,
        sentiment: classification.sentiment,
        relevancy_score: relevancy,
        published_on: article.published_on,
    };

    match esglens_db::create_article(pool, &new_article, &recognized).await {
        Ok(row) => {
            // Labels outside the tracked catalog are silently ignored by the
            // insert-where-exists.
            for topic in &classification.topics {
                esglens_db::insert_article_topic(pool, row.id, &topic.label, topic.probability)
                    .await?;
            }
            Ok(IngestOutcome {
                article_id: row.id,
                reused: false,
                organizations: recognized,
                sentiment: classification.sentiment,
                topics: classification.topics,
            })
        }
        Err(DbError::Conflict { .. }) => {
            // Lost the dedup race: a sibling worker persisted identical text
            // between our lookup and insert. The store's unique constraint is
            // the tie-breaker; fall back to the attach path.
            let existing = esglens_db::get_article_by_text(pool, &article.body)
                .await?
                .ok_or_else(|| {
                    IngestError::Store(DbError::NotFound {
                        what: "article with identical text".to_string(),
                    })
                })?;
            reuse_existing(pool, &existing, recognized).await
        }
        Err(e) => Err(IngestError::Store(e)),
    }
}

/// Relevancy is derived from the distinguished not-relevant label:
/// `1 - P(not relevant)`. `None` when the label is absent.
fn relevancy_score(classification: &Classification) -> Option<f64> {
    classification
        .topics
        .iter()
        .find(|t| t.label == NOT_RELEVANT_LABEL)
        .map(|t| (1.0 - t.probability).clamp(0.0, 1.0))
}

async fn reuse_existing(
    pool: &SqlitePool,
    existing: &ArticleRow,
    recognized: Vec<String>,
) -> Result<IngestOutcome, IngestError> {
    let newly_attached = esglens_db::attach_organizations(pool, existing.id, &recognized).await?;
    if newly_attached > 0 {
        tracing::debug!(
            article_id = existing.id,
            attached = newly_attached,
            "attached organizations to an already-analyzed article"
        );
    }

    let topics = esglens_db::list_article_topics(pool, existing.id)
        .await?
        .into_iter()
        .map(|row| TopicScore {
            label: row.topic_name,
            probability: row.probability,
        })
        .collect();

    Ok(IngestOutcome {
        article_id: existing.id,
        reused: true,
        organizations: recognized,
        sentiment: existing.sentiment,
        topics,
    })
}
