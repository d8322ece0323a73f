//! The threshold-based query engine read by downstream consumers.
//!
//! Every filtered read applies the always-on predicates in conjunction with
//! the caller's filters: `sentiment <= max_sentiment`, `relevancy_score >=
//! relevancy_threshold`, and — when filtered through a topic —
//! `article_topics.probability >= indicator_membership_threshold`.
//! Non-aggregate results are ordered ascending by sentiment, most negative
//! first.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::articles::ArticleRow;
use crate::DbError;

/// Caller-supplied filters for news reads.
#[derive(Debug, Clone)]
pub struct NewsFilters<'a> {
    pub organization: &'a str,
    pub topic: Option<&'a str>,
    pub max_sentiment: f64,
    pub from_date: NaiveDate,
}

/// The configured always-on thresholds.
#[derive(Debug, Clone, Copy)]
pub struct QueryThresholds {
    pub relevancy: f64,
    pub indicator_membership: f64,
}

impl QueryThresholds {
    #[must_use]
    pub fn from_app_config(config: &esglens_core::AppConfig) -> Self {
        Self {
            relevancy: config.relevancy_threshold,
            indicator_membership: config.indicator_membership_threshold,
        }
    }
}

/// Sentiment aggregate over a filtered article set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    min_sentiment: Option<f64>,
    max_sentiment: Option<f64>,
    avg_sentiment: Option<f64>,
}

const FILTER_PREDICATES: &str = "ao.organization_name = ?1 \
       AND a.sentiment <= ?2 \
       AND a.relevancy_score >= ?3 \
       AND a.published_on >= ?4 \
       AND (?5 IS NULL OR EXISTS ( \
            SELECT 1 FROM article_topics t \
            WHERE t.article_id = a.id \
              AND t.topic_name = ?5 \
              AND t.probability >= ?6))";

/// Returns the articles matching the filters, ordered ascending by sentiment.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_news(
    pool: &SqlitePool,
    filters: &NewsFilters<'_>,
    thresholds: &QueryThresholds,
) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT a.id, a.public_id, a.text, a.title, a.link, a.sentiment, \
                a.relevancy_score, a.published_on, a.created_at \
         FROM articles a \
         JOIN article_organizations ao ON ao.article_id = a.id \
         WHERE {FILTER_PREDICATES} \
         ORDER BY a.sentiment ASC, a.id ASC"
    ))
    .bind(filters.organization)
    .bind(filters.max_sentiment)
    .bind(thresholds.relevancy)
    .bind(filters.from_date)
    .bind(filters.topic)
    .bind(thresholds.indicator_membership)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the article with the lowest sentiment in the filtered set, or
/// `None` if the set is empty.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn lowest_sentiment_news(
    pool: &SqlitePool,
    filters: &NewsFilters<'_>,
    thresholds: &QueryThresholds,
) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT a.id, a.public_id, a.text, a.title, a.link, a.sentiment, \
                a.relevancy_score, a.published_on, a.created_at \
         FROM articles a \
         JOIN article_organizations ao ON ao.article_id = a.id \
         WHERE {FILTER_PREDICATES} \
         ORDER BY a.sentiment ASC, a.id ASC \
         LIMIT 1"
    ))
    .bind(filters.organization)
    .bind(filters.max_sentiment)
    .bind(thresholds.relevancy)
    .bind(filters.from_date)
    .bind(filters.topic)
    .bind(thresholds.indicator_membership)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns `(min, max, avg)` of sentiment over the filtered set, or `None`
/// if the set is empty.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sentiment_stats(
    pool: &SqlitePool,
    filters: &NewsFilters<'_>,
    thresholds: &QueryThresholds,
) -> Result<Option<SentimentStats>, DbError> {
    let row = sqlx::query_as::<_, StatsRow>(&format!(
        "SELECT MIN(a.sentiment) AS min_sentiment, \
                MAX(a.sentiment) AS max_sentiment, \
                AVG(a.sentiment) AS avg_sentiment \
         FROM articles a \
         JOIN article_organizations ao ON ao.article_id = a.id \
         WHERE {FILTER_PREDICATES}"
    ))
    .bind(filters.organization)
    .bind(filters.max_sentiment)
    .bind(thresholds.relevancy)
    .bind(filters.from_date)
    .bind(filters.topic)
    .bind(thresholds.indicator_membership)
    .fetch_one(pool)
    .await?;

    match (row.min_sentiment, row.max_sentiment, row.avg_sentiment) {
        (Some(min), Some(max), Some(avg)) => Ok(Some(SentimentStats { min, max, avg })),
        _ => Ok(None),
    }
}

/// Whether any article matches the filters: `count(filtered set) > 0`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn news_exist(
    pool: &SqlitePool,
    filters: &NewsFilters<'_>,
    thresholds: &QueryThresholds,
) -> Result<bool, DbError> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) \
         FROM articles a \
         JOIN article_organizations ao ON ao.article_id = a.id \
         WHERE {FILTER_PREDICATES}"
    ))
    .bind(filters.organization)
    .bind(filters.max_sentiment)
    .bind(thresholds.relevancy)
    .bind(filters.from_date)
    .bind(filters.topic)
    .bind(thresholds.indicator_membership)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}
