//! Organization recognition by plain substring matching.

use sqlx::SqlitePool;

use esglens_db::DbError;

struct MatcherEntry {
    name: String,
    synonyms: Vec<String>,
}

/// Matches known organization names and synonyms against article text.
///
/// Matching is plain substring containment, case-sensitive, no stemming or
/// fuzzy matching. Built once per cycle from the store and shared read-only
/// across fan-out workers.
pub struct EntityMatcher {
    entries: Vec<MatcherEntry>,
}

impl EntityMatcher {
    #[must_use]
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, synonyms)| MatcherEntry { name, synonyms })
                .collect(),
        }
    }

    /// Build a matcher from the store's organizations and synonyms.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if either listing fails.
    pub async fn from_store(pool: &SqlitePool) -> Result<Self, DbError> {
        let organizations = esglens_db::list_organizations(pool).await?;
        let synonyms = esglens_db::list_synonyms(pool).await?;

        let entries = organizations
            .into_iter()
            .map(|org| {
                let org_synonyms = synonyms
                    .iter()
                    .filter(|s| s.organization_name == org.name)
                    .map(|s| s.name.clone())
                    .collect();
                (org.name, org_synonyms)
            })
            .collect();

        Ok(Self::new(entries))
    }

    /// Returns the names of every organization whose name or synonym occurs
    /// in the text. Each organization appears at most once.
    #[must_use]
    pub fn recognize(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| {
                text.contains(entry.name.as_str())
                    || entry.synonyms.iter().any(|s| text.contains(s.as_str()))
            })
            .map(|entry| entry.name.clone())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
