//! Database operations for the `topics` table.

use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `topics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicRow {
    pub name: String,
}

/// Returns the tracked sustainability-topic catalog, name descending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_topics(pool: &SqlitePool) -> Result<Vec<TopicRow>, DbError> {
    let rows = sqlx::query_as::<_, TopicRow>("SELECT name FROM topics ORDER BY name DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns a single catalog topic by name, or `None` if not tracked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_topic(pool: &SqlitePool, name: &str) -> Result<Option<TopicRow>, DbError> {
    let row = sqlx::query_as::<_, TopicRow>("SELECT name FROM topics WHERE name = ?1")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
