//! One-time topic-catalog seeding and watchlist bootstrapping.

use esglens_core::organizations::OrganizationConfig;
use esglens_core::{TOPIC_CATALOG, TOPIC_CATALOG_VERSION};
use sqlx::SqlitePool;

use crate::DbError;

/// Seed the sustainability-topic catalog.
///
/// Runs exactly once per store: if the `topics` table already has rows the
/// call is a no-op, so the catalog is written only at first-ever store
/// initialization. Returns the number of topics inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails; the whole
/// batch is rolled back.
pub async fn seed_topics(pool: &SqlitePool) -> Result<usize, DbError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM topics")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for name in TOPIC_CATALOG {
        sqlx::query("INSERT INTO topics (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(
        version = TOPIC_CATALOG_VERSION,
        topics = TOPIC_CATALOG.len(),
        "seeded sustainability-topic catalog"
    );

    Ok(TOPIC_CATALOG.len())
}

/// Upsert tracked organizations and their synonyms from the watchlist file.
///
/// Idempotent: organizations and synonyms that already exist are left
/// untouched. Returns the number of organizations processed. All writes run
/// inside a single transaction; if any operation fails the entire batch is
/// rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_organizations(
    pool: &SqlitePool,
    organizations: &[OrganizationConfig],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for org in organizations {
        sqlx::query("INSERT OR IGNORE INTO organizations (name) VALUES (?1)")
            .bind(&org.name)
            .execute(&mut *tx)
            .await?;

        for synonym in &org.synonyms {
            sqlx::query(
                "INSERT OR IGNORE INTO synonyms (organization_name, name) VALUES (?1, ?2)",
            )
            .bind(&org.name)
            .bind(synonym)
            .execute(&mut *tx)
            .await?;
        }

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
