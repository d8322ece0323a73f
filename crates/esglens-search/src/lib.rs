//! News Search Capability client for esglens.
//!
//! Talks to an RSS news-search endpoint (Google News shaped) and optionally
//! scrapes full article bodies. Scrape failures are expected and degrade to
//! the headline upstream; they never abort a fetch cycle.

mod client;
mod error;
mod extract;
mod feed;
mod types;

pub use client::NewsSearchClient;
pub use error::SearchError;
pub use extract::extract_article_text;
pub use feed::parse_feed;
pub use types::FoundArticle;
