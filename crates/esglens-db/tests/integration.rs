//! Store behavior tests against an in-memory SQLite database.
//!
//! Each test builds its own single-connection in-memory store, runs the
//! embedded migrations, and seeds the topic catalog.

use chrono::NaiveDate;
use esglens_db::{DbError, NewArticle, NewsFilters, PoolConfig, QueryThresholds};
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    let config = PoolConfig {
        max_connections: 1,
        min_connections: 1,
        acquire_timeout_secs: 5,
    };
    let pool = esglens_db::connect_pool("sqlite::memory:", config)
        .await
        .expect("in-memory pool should connect");
    esglens_db::run_migrations(&pool)
        .await
        .expect("migrations should apply");
    esglens_db::seed_topics(&pool)
        .await
        .expect("catalog should seed");
    pool
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn new_article<'a>(text: &'a str, sentiment: f64, relevancy: f64) -> NewArticle<'a> {
    NewArticle {
        text,
        title: "title",
        link: "https://example.com/a",
        sentiment,
        relevancy_score: relevancy,
        published_on: date(2024, 6, 1),
    }
}

fn thresholds() -> QueryThresholds {
    QueryThresholds {
        relevancy: 0.3,
        indicator_membership: 0.5,
    }
}

#[tokio::test]
async fn topics_are_seeded_exactly_once() {
    let pool = test_pool().await;

    let first = esglens_db::list_topics(&pool).await.unwrap();
    assert_eq!(first.len(), esglens_core::TOPIC_CATALOG.len());

    // A second seed run against an initialized store is a no-op.
    let seeded_again = esglens_db::seed_topics(&pool).await.unwrap();
    assert_eq!(seeded_again, 0);
    let second = esglens_db::list_topics(&pool).await.unwrap();
    assert_eq!(second.len(), first.len());
}

#[tokio::test]
async fn topics_are_listed_name_descending() {
    let pool = test_pool().await;
    let topics = esglens_db::list_topics(&pool).await.unwrap();
    let mut sorted: Vec<String> = topics.iter().map(|t| t.name.clone()).collect();
    sorted.sort_by(|a, b| b.cmp(a));
    let listed: Vec<String> = topics.into_iter().map(|t| t.name).collect();
    assert_eq!(listed, sorted);
}

#[tokio::test]
async fn create_organization_rejects_empty_name() {
    let pool = test_pool().await;
    let result = esglens_db::create_organization(&pool, "").await;
    assert!(
        matches!(result, Err(DbError::Validation(_))),
        "expected Validation, got: {result:?}"
    );
    // Nothing reached the store.
    assert!(esglens_db::list_organizations(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_organization_conflicts_on_duplicate() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    let result = esglens_db::create_organization(&pool, "Acme").await;
    assert!(
        matches!(result, Err(DbError::Conflict { .. })),
        "expected Conflict, got: {result:?}"
    );
}

#[tokio::test]
async fn delete_organization_reports_not_found() {
    let pool = test_pool().await;
    let result = esglens_db::delete_organization(&pool, "Ghost").await;
    assert!(
        matches!(result, Err(DbError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn delete_organization_cascades_to_synonyms_and_associations() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    esglens_db::create_synonym(&pool, "Acme", "Acme Corp")
        .await
        .unwrap();
    let article = esglens_db::create_article(
        &pool,
        &new_article("Acme did a thing.", 5.0, 0.9),
        &["Acme".to_string()],
    )
    .await
    .unwrap();

    esglens_db::delete_organization(&pool, "Acme").await.unwrap();

    assert!(esglens_db::list_synonyms(&pool).await.unwrap().is_empty());
    assert!(esglens_db::article_organizations(&pool, article.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn create_synonym_requires_tracked_organization() {
    let pool = test_pool().await;
    let result = esglens_db::create_synonym(&pool, "Ghost", "Ghost Corp").await;
    assert!(
        matches!(result, Err(DbError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn create_synonym_conflicts_on_duplicate() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    esglens_db::create_synonym(&pool, "Acme", "Acme Corp")
        .await
        .unwrap();
    let result = esglens_db::create_synonym(&pool, "Acme", "Acme Corp").await;
    assert!(
        matches!(result, Err(DbError::Conflict { .. })),
        "expected Conflict, got: {result:?}"
    );
}

#[tokio::test]
async fn delete_synonym_reports_not_found() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    let result = esglens_db::delete_synonym(&pool, "Acme", "Acme Corp").await;
    assert!(
        matches!(result, Err(DbError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn search_terms_combine_organization_and_synonym_names() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    esglens_db::create_organization(&pool, "Globex").await.unwrap();
    esglens_db::create_synonym(&pool, "Acme", "Acme Corp")
        .await
        .unwrap();

    let terms = esglens_db::search_terms(&pool).await.unwrap();
    assert_eq!(terms, vec!["Acme", "Globex", "Acme Corp"]);
}

#[tokio::test]
async fn create_article_requires_at_least_one_organization() {
    let pool = test_pool().await;
    let result =
        esglens_db::create_article(&pool, &new_article("Some text.", 5.0, 0.9), &[]).await;
    assert!(
        matches!(result, Err(DbError::Validation(_))),
        "expected Validation, got: {result:?}"
    );
    assert!(esglens_db::list_articles(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_article_rejects_out_of_range_scores() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();

    let result = esglens_db::create_article(
        &pool,
        &new_article("Text A.", 11.0, 0.9),
        &["Acme".to_string()],
    )
    .await;
    assert!(matches!(result, Err(DbError::Validation(_))));

    let result = esglens_db::create_article(
        &pool,
        &new_article("Text B.", 5.0, 1.5),
        &["Acme".to_string()],
    )
    .await;
    assert!(matches!(result, Err(DbError::Validation(_))));
}

#[tokio::test]
async fn create_article_conflicts_on_duplicate_text() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    esglens_db::create_article(
        &pool,
        &new_article("Identical text.", 5.0, 0.9),
        &["Acme".to_string()],
    )
    .await
    .unwrap();

    let result = esglens_db::create_article(
        &pool,
        &new_article("Identical text.", 2.0, 0.8),
        &["Acme".to_string()],
    )
    .await;
    assert!(
        matches!(result, Err(DbError::Conflict { .. })),
        "expected Conflict, got: {result:?}"
    );
    assert_eq!(esglens_db::list_articles(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn attach_organizations_is_idempotent() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    esglens_db::create_organization(&pool, "Globex").await.unwrap();
    let article = esglens_db::create_article(
        &pool,
        &new_article("Shared text.", 5.0, 0.9),
        &["Acme".to_string()],
    )
    .await
    .unwrap();

    let first = esglens_db::attach_organizations(
        &pool,
        article.id,
        &["Acme".to_string(), "Globex".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(first, 1, "only Globex is newly attached");

    let second = esglens_db::attach_organizations(&pool, article.id, &["Globex".to_string()])
        .await
        .unwrap();
    assert_eq!(second, 0, "re-attaching is a no-op");

    let attached = esglens_db::article_organizations(&pool, article.id)
        .await
        .unwrap();
    assert_eq!(attached, vec!["Acme", "Globex"]);
}

#[tokio::test]
async fn attach_organizations_drops_missing_references() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    let article = esglens_db::create_article(
        &pool,
        &new_article("Text.", 5.0, 0.9),
        &["Acme".to_string()],
    )
    .await
    .unwrap();

    // "Ghost" is not tracked; the violating write is dropped, not fatal.
    let attached =
        esglens_db::attach_organizations(&pool, article.id, &["Ghost".to_string()])
            .await
            .unwrap();
    assert_eq!(attached, 0);
    assert_eq!(
        esglens_db::article_organizations(&pool, article.id)
            .await
            .unwrap(),
        vec!["Acme"]
    );
}

#[tokio::test]
async fn insert_article_topic_ignores_unknown_labels() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    let article = esglens_db::create_article(
        &pool,
        &new_article("Text.", 5.0, 0.9),
        &["Acme".to_string()],
    )
    .await
    .unwrap();

    let inserted =
        esglens_db::insert_article_topic(&pool, article.id, "Greenhouse Gas Emissions", 0.8)
            .await
            .unwrap();
    assert!(inserted);

    // Not part of the tracked catalog: silently ignored.
    let inserted =
        esglens_db::insert_article_topic(&pool, article.id, "Not Relevant to ESG", 0.1)
            .await
            .unwrap();
    assert!(!inserted);

    let topics = esglens_db::list_article_topics(&pool, article.id)
        .await
        .unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].topic_name, "Greenhouse Gas Emissions");
}

#[tokio::test]
async fn article_topics_are_listed_by_probability_descending() {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    let article = esglens_db::create_article(
        &pool,
        &new_article("Text.", 5.0, 0.9),
        &["Acme".to_string()],
    )
    .await
    .unwrap();

    esglens_db::insert_article_topic(&pool, article.id, "Biodiversity", 0.2)
        .await
        .unwrap();
    esglens_db::insert_article_topic(&pool, article.id, "Climate Risks", 0.9)
        .await
        .unwrap();
    esglens_db::insert_article_topic(&pool, article.id, "Air Pollution", 0.5)
        .await
        .unwrap();

    let topics = esglens_db::list_article_topics(&pool, article.id)
        .await
        .unwrap();
    let names: Vec<&str> = topics.iter().map(|t| t.topic_name.as_str()).collect();
    assert_eq!(names, vec!["Climate Risks", "Air Pollution", "Biodiversity"]);
}

/// Builds a store with a spread of articles for the filter tests:
///
/// | text | sentiment | relevancy | date       | orgs        | topic (prob)        |
/// |------|-----------|-----------|------------|-------------|---------------------|
/// | a    | 2.0       | 0.9       | 2024-06-10 | Acme        | Climate Risks (0.9) |
/// | b    | 8.0       | 0.9       | 2024-06-10 | Acme        | Climate Risks (0.2) |
/// | c    | 4.0       | 0.1       | 2024-06-10 | Acme        | Climate Risks (0.9) |
/// | d    | 1.0       | 0.9       | 2020-01-01 | Acme        | Climate Risks (0.9) |
/// | e    | 3.0       | 0.9       | 2024-06-10 | Globex      | Climate Risks (0.9) |
async fn filter_fixture() -> SqlitePool {
    let pool = test_pool().await;
    esglens_db::create_organization(&pool, "Acme").await.unwrap();
    esglens_db::create_organization(&pool, "Globex").await.unwrap();

    let rows: &[(&str, f64, f64, NaiveDate, &str, f64)] = &[
        ("a", 2.0, 0.9, date(2024, 6, 10), "Acme", 0.9),
        ("b", 8.0, 0.9, date(2024, 6, 10), "Acme", 0.2),
        ("c", 4.0, 0.1, date(2024, 6, 10), "Acme", 0.9),
        ("d", 1.0, 0.9, date(2020, 1, 1), "Acme", 0.9),
        ("e", 3.0, 0.9, date(2024, 6, 10), "Globex", 0.9),
    ];

    for (text, sentiment, relevancy, published_on, org, probability) in rows {
        let article = esglens_db::create_article(
            &pool,
            &NewArticle {
                text: *text,
                title: "title",
                link: "https://example.com",
                sentiment: *sentiment,
                relevancy_score: *relevancy,
                published_on: *published_on,
            },
            &[(*org).to_string()],
        )
        .await
        .unwrap();
        esglens_db::insert_article_topic(&pool, article.id, "Climate Risks", *probability)
            .await
            .unwrap();
    }

    pool
}

#[tokio::test]
async fn list_news_applies_every_predicate_and_orders_by_sentiment() {
    let pool = filter_fixture().await;

    let filters = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 10.0,
        from_date: date(2024, 1, 1),
    };
    let rows = esglens_db::list_news(&pool, &filters, &thresholds())
        .await
        .unwrap();

    // "c" is below the relevancy threshold, "d" is before the from-date,
    // "e" belongs to another organization. Ascending sentiment: a then b.
    let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}

#[tokio::test]
async fn list_news_honors_the_sentiment_ceiling() {
    let pool = filter_fixture().await;

    let filters = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 5.0,
        from_date: date(2024, 1, 1),
    };
    let rows = esglens_db::list_news(&pool, &filters, &thresholds())
        .await
        .unwrap();
    let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["a"]);
}

#[tokio::test]
async fn topic_filter_requires_membership_above_threshold() {
    let pool = filter_fixture().await;

    let filters = NewsFilters {
        organization: "Acme",
        topic: Some("Climate Risks"),
        max_sentiment: 10.0,
        from_date: date(2024, 1, 1),
    };
    let rows = esglens_db::list_news(&pool, &filters, &thresholds())
        .await
        .unwrap();

    // "b" has membership 0.2 < 0.5 and drops out once the topic is joined.
    let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["a"]);
}

#[tokio::test]
async fn lowest_sentiment_news_returns_most_negative_article() {
    let pool = filter_fixture().await;

    let filters = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 10.0,
        from_date: date(2020, 1, 1),
    };
    let row = esglens_db::lowest_sentiment_news(&pool, &filters, &thresholds())
        .await
        .unwrap()
        .expect("should find a match");
    assert_eq!(row.text, "d");
}

#[tokio::test]
async fn sentiment_stats_aggregate_the_filtered_set() {
    let pool = filter_fixture().await;

    let filters = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 10.0,
        from_date: date(2024, 1, 1),
    };
    let stats = esglens_db::sentiment_stats(&pool, &filters, &thresholds())
        .await
        .unwrap()
        .expect("should aggregate");
    assert!((stats.min - 2.0).abs() < f64::EPSILON);
    assert!((stats.max - 8.0).abs() < f64::EPSILON);
    assert!((stats.avg - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn sentiment_stats_are_none_for_an_empty_set() {
    let pool = filter_fixture().await;

    let filters = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 0.5,
        from_date: date(2024, 1, 1),
    };
    let stats = esglens_db::sentiment_stats(&pool, &filters, &thresholds())
        .await
        .unwrap();
    assert!(stats.is_none());
}

#[tokio::test]
async fn news_exist_is_count_greater_than_zero() {
    let pool = filter_fixture().await;

    let matching = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 10.0,
        from_date: date(2024, 1, 1),
    };
    assert!(esglens_db::news_exist(&pool, &matching, &thresholds())
        .await
        .unwrap());

    let empty = NewsFilters {
        organization: "Acme",
        topic: None,
        max_sentiment: 0.5,
        from_date: date(2024, 1, 1),
    };
    assert!(!esglens_db::news_exist(&pool, &empty, &thresholds())
        .await
        .unwrap());
}

#[tokio::test]
async fn seed_organizations_is_idempotent() {
    let pool = test_pool().await;
    let watchlist = vec![
        esglens_core::organizations::OrganizationConfig {
            name: "Acme".to_string(),
            synonyms: vec!["Acme Corp".to_string()],
        },
        esglens_core::organizations::OrganizationConfig {
            name: "Globex".to_string(),
            synonyms: vec![],
        },
    ];

    let first = esglens_db::seed_organizations(&pool, &watchlist).await.unwrap();
    assert_eq!(first, 2);
    let second = esglens_db::seed_organizations(&pool, &watchlist).await.unwrap();
    assert_eq!(second, 2);

    assert_eq!(esglens_db::list_organizations(&pool).await.unwrap().len(), 2);
    assert_eq!(esglens_db::list_synonyms(&pool).await.unwrap().len(), 1);
}
