use chrono::NaiveDate;

/// One candidate article returned by the search capability.
#[derive(Debug, Clone)]
pub struct FoundArticle {
    pub title: String,
    /// Provider-supplied body snippet; `None` when the feed item carries only
    /// a headline.
    pub body: Option<String>,
    pub link: String,
    /// Parsed publication date of the feed item.
    pub published_on: NaiveDate,
}
