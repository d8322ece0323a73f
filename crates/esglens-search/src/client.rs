//! HTTP client for the news-search RSS endpoint.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::SearchError;
use crate::extract::extract_article_text;
use crate::feed::parse_feed;
use crate::types::FoundArticle;

/// News-search client.
///
/// `base_url` points at the search provider (overridable for tests); the
/// search route and query parameters follow the Google News RSS shape.
pub struct NewsSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl NewsSearchClient {
    /// Create a new `NewsSearchClient` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search for news about one term.
    ///
    /// Returns every parsable candidate article from the result feed.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] on network failure,
    /// [`SearchError::UnexpectedStatus`] on a non-success response, or
    /// [`SearchError::Xml`] on a malformed feed.
    pub async fn search(&self, term: &str) -> Result<Vec<FoundArticle>, SearchError> {
        let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}/rss/search?q={encoded}&hl=en-US&gl=US&ceid=US:en",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        parse_feed(&body)
    }

    /// Download an article page and extract its full text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] / [`SearchError::UnexpectedStatus`] on
    /// fetch failure and [`SearchError::EmptyExtraction`] if no readable text
    /// was found — callers fall back to the headline in both cases.
    pub async fn fetch_full_text(&self, url: &str) -> Result<String, SearchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        let text = extract_article_text(&html);
        if text.is_empty() {
            return Err(SearchError::EmptyExtraction {
                url: url.to_string(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <item>
      <title>Acme fined over wastewater discharge</title>
      <link>https://example.com/acme-fine</link>
      <description>Regulators fined Acme on Monday.</description>
      <pubDate>Mon, 10 Jun 2024 08:30:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn search_parses_the_result_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .and(query_param("q", "Acme Corp"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_RSS))
            .mount(&server)
            .await;

        let client = NewsSearchClient::new(&server.uri(), 5).unwrap();
        let articles = client.search("Acme Corp").await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://example.com/acme-fine");
    }

    #[tokio::test]
    async fn search_maps_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = NewsSearchClient::new(&server.uri(), 5).unwrap();
        let result = client.search("Acme").await;
        assert!(
            matches!(result, Err(SearchError::UnexpectedStatus { status: 503, .. })),
            "expected UnexpectedStatus, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn fetch_full_text_extracts_paragraphs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><p>Full story text.</p><p>More detail.</p></body></html>",
            ))
            .mount(&server)
            .await;

        let client = NewsSearchClient::new(&server.uri(), 5).unwrap();
        let text = client
            .fetch_full_text(&format!("{}/story", server.uri()))
            .await
            .unwrap();
        assert_eq!(text, "Full story text.\n\nMore detail.");
    }

    #[tokio::test]
    async fn fetch_full_text_reports_empty_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><div>nothing readable</div></body></html>"),
            )
            .mount(&server)
            .await;

        let client = NewsSearchClient::new(&server.uri(), 5).unwrap();
        let result = client
            .fetch_full_text(&format!("{}/story", server.uri()))
            .await;
        assert!(
            matches!(result, Err(SearchError::EmptyExtraction { .. })),
            "expected EmptyExtraction, got: {result:?}"
        );
    }
}
