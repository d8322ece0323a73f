//! Database operations for the `organizations` and `synonyms` tables.

use sqlx::SqlitePool;

use crate::{is_unique_violation, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `organizations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
    pub name: String,
}

/// A row from the `synonyms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SynonymRow {
    pub organization_name: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all tracked organizations, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_organizations(pool: &SqlitePool) -> Result<Vec<OrganizationRow>, DbError> {
    let rows = sqlx::query_as::<_, OrganizationRow>(
        "SELECT name FROM organizations ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single organization by name, or `None` if not tracked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_organization(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<OrganizationRow>, DbError> {
    let row = sqlx::query_as::<_, OrganizationRow>(
        "SELECT name FROM organizations WHERE name = ?1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new tracked organization.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for an empty name (rejected before the
/// store is touched) and [`DbError::Conflict`] if the organization already
/// exists.
pub async fn create_organization(
    pool: &SqlitePool,
    name: &str,
) -> Result<OrganizationRow, DbError> {
    if name.trim().is_empty() {
        return Err(DbError::Validation(
            "organization name must be non-empty".to_string(),
        ));
    }

    sqlx::query("INSERT INTO organizations (name) VALUES (?1)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict {
                    what: format!("organization '{name}'"),
                }
            } else {
                DbError::Sqlx(e)
            }
        })?;

    Ok(OrganizationRow {
        name: name.to_string(),
    })
}

/// Deletes an organization, cascading to its synonyms and article
/// associations.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the organization is not tracked.
pub async fn delete_organization(pool: &SqlitePool, name: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM organizations WHERE name = ?1")
        .bind(name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound {
            what: format!("organization '{name}'"),
        });
    }

    Ok(())
}

/// Returns every synonym of every organization, ordered by organization then
/// synonym name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_synonyms(pool: &SqlitePool) -> Result<Vec<SynonymRow>, DbError> {
    let rows = sqlx::query_as::<_, SynonymRow>(
        "SELECT organization_name, name FROM synonyms ORDER BY organization_name, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the synonyms of one organization, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_synonyms_for(
    pool: &SqlitePool,
    organization_name: &str,
) -> Result<Vec<SynonymRow>, DbError> {
    let rows = sqlx::query_as::<_, SynonymRow>(
        "SELECT organization_name, name FROM synonyms \
         WHERE organization_name = ?1 \
         ORDER BY name",
    )
    .bind(organization_name)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates a synonym for a tracked organization.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for an empty synonym name,
/// [`DbError::NotFound`] if the organization is not tracked, and
/// [`DbError::Conflict`] if the synonym already exists for it.
pub async fn create_synonym(
    pool: &SqlitePool,
    organization_name: &str,
    name: &str,
) -> Result<SynonymRow, DbError> {
    if name.trim().is_empty() {
        return Err(DbError::Validation(
            "synonym name must be non-empty".to_string(),
        ));
    }

    if get_organization(pool, organization_name).await?.is_none() {
        return Err(DbError::NotFound {
            what: format!("organization '{organization_name}'"),
        });
    }

    sqlx::query("INSERT INTO synonyms (organization_name, name) VALUES (?1, ?2)")
        .bind(organization_name)
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict {
                    what: format!("synonym '{name}' for organization '{organization_name}'"),
                }
            } else {
                DbError::Sqlx(e)
            }
        })?;

    Ok(SynonymRow {
        organization_name: organization_name.to_string(),
        name: name.to_string(),
    })
}

/// Deletes one synonym of an organization.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the synonym does not exist for the
/// organization.
pub async fn delete_synonym(
    pool: &SqlitePool,
    organization_name: &str,
    name: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "DELETE FROM synonyms WHERE organization_name = ?1 AND name = ?2",
    )
    .bind(organization_name)
    .bind(name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound {
            what: format!("synonym '{name}' for organization '{organization_name}'"),
        });
    }

    Ok(())
}

/// Returns the fetch-stage search terms: every organization name followed by
/// every synonym name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn search_terms(pool: &SqlitePool) -> Result<Vec<String>, DbError> {
    let mut terms: Vec<String> = sqlx::query_scalar::<_, String>(
        "SELECT name FROM organizations ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let synonyms: Vec<String> = sqlx::query_scalar::<_, String>(
        "SELECT name FROM synonyms ORDER BY organization_name, name",
    )
    .fetch_all(pool)
    .await?;

    terms.extend(synonyms);
    Ok(terms)
}
