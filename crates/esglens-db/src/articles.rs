//! Database operations for the `articles` table and its association tables.
//!
//! Articles are only ever created by the ingestion pipeline. After creation a
//! row is immutable except for gaining `article_organizations` rows when the
//! same text is re-encountered under a new search term.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{constraint_description, is_foreign_key_violation, is_unique_violation, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub public_id: String,
    pub text: String,
    pub title: String,
    pub link: String,
    pub sentiment: f64,
    pub relevancy_score: f64,
    pub published_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// A row from the `article_topics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleTopicRow {
    pub article_id: i64,
    pub topic_name: String,
    pub probability: f64,
}

/// Input for article creation.
#[derive(Debug, Clone)]
pub struct NewArticle<'a> {
    pub text: &'a str,
    pub title: &'a str,
    pub link: &'a str,
    pub sentiment: f64,
    pub relevancy_score: f64,
    pub published_on: NaiveDate,
}

const ARTICLE_COLUMNS: &str = "id, public_id, text, title, link, sentiment, relevancy_score, \
                               published_on, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all analyzed articles, ordered by publication date descending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles(pool: &SqlitePool) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY published_on DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Looks an article up by exact text equality — the dedup oracle.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_article_by_text(
    pool: &SqlitePool,
    text: &str,
) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE text = ?1"
    ))
    .bind(text)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates an article together with its organization associations in one
/// transaction.
///
/// An organization association that violates a constraint (e.g. the
/// organization was deleted mid-cycle) is logged and dropped; the article is
/// only kept if at least one association survives.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if `organizations` is empty, a score is
/// out of range, or no association could ultimately be attached;
/// [`DbError::Conflict`] if an article with identical text already exists
/// (callers treat this as "already ingested" and take the attach path).
pub async fn create_article(
    pool: &SqlitePool,
    article: &NewArticle<'_>,
    organizations: &[String],
) -> Result<ArticleRow, DbError> {
    if organizations.is_empty() {
        return Err(DbError::Validation(
            "an article must mention at least one tracked organization".to_string(),
        ));
    }
    if !(0.0..=10.0).contains(&article.sentiment) {
        return Err(DbError::Validation(format!(
            "sentiment must be in [0, 10], got {}",
            article.sentiment
        )));
    }
    if !(0.0..=1.0).contains(&article.relevancy_score) {
        return Err(DbError::Validation(format!(
            "relevancy score must be in [0, 1], got {}",
            article.relevancy_score
        )));
    }

    let mut tx = pool.begin().await?;

    let public_id = Uuid::new_v4().to_string();
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "INSERT INTO articles (public_id, text, title, link, sentiment, relevancy_score, published_on) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(&public_id)
    .bind(article.text)
    .bind(article.title)
    .bind(article.link)
    .bind(article.sentiment)
    .bind(article.relevancy_score)
    .bind(article.published_on)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::Conflict {
                what: "article with identical text".to_string(),
            }
        } else {
            DbError::Sqlx(e)
        }
    })?;

    let mut attached = 0usize;
    for organization in organizations {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO article_organizations (article_id, organization_name) \
             VALUES (?1, ?2)",
        )
        .bind(row.id)
        .bind(organization)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => attached += 1,
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                tracing::warn!(
                    organization = %organization,
                    constraint = %constraint_description(&e),
                    "dropping organization association"
                );
            }
            Err(e) => return Err(DbError::Sqlx(e)),
        }
    }

    if attached == 0 {
        tx.rollback().await?;
        return Err(DbError::Validation(
            "no organization association could be attached".to_string(),
        ));
    }

    tx.commit().await?;
    Ok(row)
}

/// Attaches organizations to an existing article.
///
/// Idempotent: re-attaching an already-attached organization is a no-op.
/// Constraint violations (e.g. organization deleted mid-cycle) are logged
/// and dropped. Returns the number of newly attached organizations.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on unexpected database failures.
pub async fn attach_organizations(
    pool: &SqlitePool,
    article_id: i64,
    organizations: &[String],
) -> Result<usize, DbError> {
    let mut attached = 0usize;

    for organization in organizations {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO article_organizations (article_id, organization_name) \
             VALUES (?1, ?2)",
        )
        .bind(article_id)
        .bind(organization)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => attached += 1,
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                tracing::warn!(
                    article_id,
                    organization = %organization,
                    constraint = %constraint_description(&e),
                    "dropping organization association"
                );
            }
            Err(e) => return Err(DbError::Sqlx(e)),
        }
    }

    Ok(attached)
}

/// Returns the organization names associated with an article, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn article_organizations(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<String>, DbError> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT organization_name FROM article_organizations \
         WHERE article_id = ?1 \
         ORDER BY organization_name",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Records one topic membership for an article.
///
/// Labels that are not part of the tracked catalog are silently ignored (the
/// insert-where-exists matches nothing). Returns whether a row was inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_article_topic(
    pool: &SqlitePool,
    article_id: i64,
    label: &str,
    probability: f64,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO article_topics (article_id, topic_name, probability) \
         SELECT ?1, name, ?3 FROM topics WHERE name = ?2",
    )
    .bind(article_id)
    .bind(label)
    .bind(probability)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns an article's topic memberships, ordered by probability descending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_article_topics(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<ArticleTopicRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleTopicRow>(
        "SELECT article_id, topic_name, probability FROM article_topics \
         WHERE article_id = ?1 \
         ORDER BY probability DESC, topic_name",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
