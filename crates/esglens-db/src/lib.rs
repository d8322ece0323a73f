//! SQLite store for esglens.
//!
//! The pool returned by [`connect_pool`] is the process-wide store handle:
//! constructed once at startup and passed by reference to every component.
//! All operations run through short-lived pool acquisitions; multi-statement
//! writes use explicit transactions that roll back on every error path.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

mod articles;
mod news;
mod organizations;
mod seed;
mod topics;

pub use articles::{
    article_organizations, attach_organizations, create_article, get_article_by_text,
    insert_article_topic, list_article_topics, list_articles, ArticleRow, ArticleTopicRow,
    NewArticle,
};
pub use news::{
    list_news, lowest_sentiment_news, news_exist, sentiment_stats, NewsFilters, QueryThresholds,
    SentimentStats,
};
pub use organizations::{
    create_organization, create_synonym, delete_organization, delete_synonym, get_organization,
    list_organizations, list_synonyms, list_synonyms_for, search_terms, OrganizationRow,
    SynonymRow,
};
pub use seed::{seed_organizations, seed_topics};
pub use topics::{get_topic, list_topics, TopicRow};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/esglens-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &esglens_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    /// Malformed caller input, rejected before the store is touched.
    #[error("{0}")]
    Validation(String),

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("already exists: {what}")]
    Conflict { what: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the SQLite store using an explicit URL and pool config.
///
/// The database file is created if missing and foreign-key enforcement is
/// switched on for every connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the URL is malformed or the connection cannot
/// be established.
pub async fn connect_pool(
    database_url: &str,
    config: PoolConfig,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::migrate::MigrateError> {
    // Count applied migrations before running. The _sqlx_migrations table may not
    // exist yet on a fresh database; treat absence as zero applied.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// True if the error is a unique-constraint violation from the database.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error
            .as_database_error()
            .map(sqlx::error::DatabaseError::kind),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}

/// True if the error is a foreign-key violation from the database.
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error
            .as_database_error()
            .map(sqlx::error::DatabaseError::kind),
        Some(sqlx::error::ErrorKind::ForeignKeyViolation)
    )
}

/// Human-readable description of a constraint violation, for logging
/// recovered writes.
pub(crate) fn constraint_description(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                format!("entry already exists ({})", db_error.message())
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                format!("referenced row is missing ({})", db_error.message())
            }
            sqlx::error::ErrorKind::CheckViolation => {
                format!("check constraint failed ({})", db_error.message())
            }
            _ => db_error.message().to_string(),
        },
        None => error.to_string(),
    }
}
