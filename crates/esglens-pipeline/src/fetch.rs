//! The concurrent multi-source fetch stage.
//!
//! Search terms are partitioned across at most `max_fetch_threads` workers;
//! every worker searches its slice of terms independently and pushes results
//! into one shared channel. The stage joins on "all workers have returned"
//! and never fails: per-term search errors and scrape failures are logged
//! and degraded.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use esglens_search::{FoundArticle, NewsSearchClient};

/// One fetched article on its way into the fan-out stage.
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    pub title: String,
    /// The analysis text: scraped full text when enabled and available,
    /// else the provider's body snippet, else the headline.
    pub body: String,
    pub link: String,
    pub published_on: NaiveDate,
}

/// Split `terms` into `min(terms.len(), max_workers)` contiguous chunks.
///
/// Each worker `i` receives `[i*chunk, (i+1)*chunk)` with `chunk = n / k`
/// (integer division); the last worker absorbs the remainder. Concatenating
/// the chunks in worker order reproduces the input exactly — no term is
/// duplicated or dropped.
#[must_use]
pub fn partition_terms(terms: &[String], max_workers: usize) -> Vec<Vec<String>> {
    let n = terms.len();
    let k = n.min(max_workers);
    if k == 0 {
        return Vec::new();
    }

    let chunk = n / k;
    let mut chunks = Vec::with_capacity(k);
    for i in 0..k {
        let start = i * chunk;
        let end = if i == k - 1 { n } else { (i + 1) * chunk };
        chunks.push(terms[start..end].to_vec());
    }
    chunks
}

/// Run the fetch stage: search every term, collect all results.
///
/// Returns the unordered contents of the fetch queue, duplicates across
/// search terms included — dedup is the ingestion pipeline's job.
pub async fn run_fetch_stage(
    search: Arc<NewsSearchClient>,
    terms: Vec<String>,
    max_workers: usize,
    scrape_full_articles: bool,
) -> Vec<FetchedArticle> {
    let chunks = partition_terms(&terms, max_workers);
    if chunks.is_empty() {
        return Vec::new();
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut workers = JoinSet::new();

    for (worker_id, chunk) in chunks.into_iter().enumerate() {
        let search = Arc::clone(&search);
        let tx = tx.clone();

        workers.spawn(async move {
            for term in chunk {
                match search.search(&term).await {
                    Ok(found) => {
                        tracing::info!(
                            worker = worker_id,
                            term = %term,
                            count = found.len(),
                            "search returned candidate articles"
                        );
                        for article in found {
                            let fetched =
                                build_article(&search, article, scrape_full_articles).await;
                            if tx.send(fetched).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            worker = worker_id,
                            term = %term,
                            error = %e,
                            "search failed; skipping term"
                        );
                    }
                }
            }
        });
    }
    drop(tx);

    // Join point: all workers have returned.
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "fetch worker terminated abnormally");
        }
    }

    let mut articles = Vec::new();
    while let Some(article) = rx.recv().await {
        articles.push(article);
    }
    articles
}

/// Turn a search hit into a fetch-queue entry, optionally enriched with the
/// scraped full text. Scrape failures never fail the fetch: the fallback
/// body is retained.
async fn build_article(
    search: &NewsSearchClient,
    found: FoundArticle,
    scrape_full_articles: bool,
) -> FetchedArticle {
    let mut body = found
        .body
        .clone()
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| found.title.clone());

    if scrape_full_articles {
        match search.fetch_full_text(&found.link).await {
            Ok(text) => body = text,
            Err(e) => {
                tracing::debug!(
                    link = %found.link,
                    error = %e,
                    "full-text scrape unavailable; keeping fallback body"
                );
            }
        }
    }

    FetchedArticle {
        title: found.title,
        body,
        link: found.link,
        published_on: found.published_on,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("term-{i}")).collect()
    }

    #[test]
    fn partitioning_reproduces_the_input_exactly() {
        for n in 0..=7 {
            for max_workers in 0..=5 {
                let input = terms(n);
                let chunks = partition_terms(&input, max_workers);

                let expected_chunks = n.min(max_workers);
                assert_eq!(
                    chunks.len(),
                    expected_chunks,
                    "n={n} T={max_workers}: wrong chunk count"
                );

                let rejoined: Vec<String> = chunks.into_iter().flatten().collect();
                assert_eq!(
                    rejoined, input,
                    "n={n} T={max_workers}: concatenation must reproduce the input"
                );
            }
        }
    }

    #[test]
    fn no_terms_or_no_workers_produce_no_chunks() {
        assert!(partition_terms(&[], 4).is_empty());
        assert!(partition_terms(&terms(3), 0).is_empty());
    }

    #[test]
    fn last_worker_absorbs_the_remainder() {
        let chunks = partition_terms(&terms(7), 3);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        // chunk = 7 / 3 = 2; the last worker takes the rest.
        assert_eq!(sizes, vec![2, 2, 3]);
    }

    #[test]
    fn more_workers_than_terms_uses_one_term_per_worker() {
        let chunks = partition_terms(&terms(3), 10);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1, 1]);
    }
}
