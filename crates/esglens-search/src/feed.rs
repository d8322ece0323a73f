//! RSS search-result parsing.

use chrono::DateTime;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::SearchError;
use crate::extract::strip_html;
use crate::types::FoundArticle;

/// Parse an RSS feed XML body into `FoundArticle`s.
///
/// Each `<item>` becomes one article: title, link, description (HTML
/// stripped) as the body snippet, and the RFC 2822 `pubDate` as the
/// publication date. Items without a link or with an unparsable date are
/// skipped with a warning — a malformed feed item must not take down the
/// fetch worker handling it.
///
/// # Errors
///
/// Returns [`SearchError::Xml`] if the XML itself is malformed.
pub fn parse_feed(xml: &str) -> Result<Vec<FoundArticle>, SearchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut current_title = String::new();
    let mut current_link = String::new();
    let mut current_description = String::new();
    let mut current_pub_date = String::new();
    let mut in_item = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                match name.as_str() {
                    "item" => {
                        in_item = true;
                        current_title.clear();
                        current_link.clear();
                        current_description.clear();
                        current_pub_date.clear();
                    }
                    _ => {
                        current_tag = name;
                    }
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if let Some(article) = finish_item(
                        &current_title,
                        &current_link,
                        &current_description,
                        &current_pub_date,
                    ) {
                        articles.push(article);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_pub_date,
                    );
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_pub_date,
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SearchError::Xml(e)),
            _ => {}
        }
    }

    Ok(articles)
}

fn assign_field(
    tag: &str,
    text: String,
    title: &mut String,
    link: &mut String,
    description: &mut String,
    pub_date: &mut String,
) {
    match tag {
        "title" => *title = text,
        "link" => *link = text,
        "description" => *description = strip_html(&text),
        "pubDate" => *pub_date = text,
        _ => {}
    }
}

fn finish_item(
    title: &str,
    link: &str,
    description: &str,
    pub_date: &str,
) -> Option<FoundArticle> {
    if link.is_empty() {
        tracing::warn!(title = %title, "skipping feed item without a link");
        return None;
    }

    let published_on = match DateTime::parse_from_rfc2822(pub_date) {
        Ok(parsed) => parsed.date_naive(),
        Err(e) => {
            tracing::warn!(
                link = %link,
                pub_date = %pub_date,
                error = %e,
                "skipping feed item with unparsable publication date"
            );
            return None;
        }
    };

    let body = if description.is_empty() {
        None
    } else {
        Some(description.to_string())
    };

    Some(FoundArticle {
        title: title.to_string(),
        body,
        link: link.to_string(),
        published_on,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Search results</title>
    <item>
      <title>Acme fined over wastewater discharge</title>
      <link>https://example.com/acme-fine</link>
      <description>&lt;p&gt;Regulators fined Acme on Monday.&lt;/p&gt;</description>
      <pubDate>Mon, 10 Jun 2024 08:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Globex announces renewables push</title>
      <link>https://example.com/globex-renewables</link>
      <description>Globex will invest heavily in solar.</description>
      <pubDate>Tue, 11 Jun 2024 09:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_with_dates_and_bodies() {
        let articles = parse_feed(SAMPLE_RSS).expect("should parse valid RSS");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Acme fined over wastewater discharge");
        assert_eq!(articles[0].link, "https://example.com/acme-fine");
        assert_eq!(
            articles[0].body.as_deref(),
            Some("Regulators fined Acme on Monday.")
        );
        assert_eq!(
            articles[0].published_on,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
    }

    #[test]
    fn empty_feed_returns_empty_vec() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        let articles = parse_feed(xml).expect("should parse empty RSS");
        assert!(articles.is_empty());
    }

    #[test]
    fn items_with_unparsable_dates_are_skipped() {
        let xml = r#"<rss version="2.0"><channel>
          <item>
            <title>Undated</title>
            <link>https://example.com/undated</link>
            <pubDate>last Tuesday</pubDate>
          </item>
          <item>
            <title>Dated</title>
            <link>https://example.com/dated</link>
            <pubDate>Wed, 12 Jun 2024 10:00:00 GMT</pubDate>
          </item>
        </channel></rss>"#;
        let articles = parse_feed(xml).expect("should parse");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Dated");
    }

    #[test]
    fn items_without_links_are_skipped() {
        let xml = r#"<rss version="2.0"><channel>
          <item>
            <title>No link</title>
            <pubDate>Wed, 12 Jun 2024 10:00:00 GMT</pubDate>
          </item>
        </channel></rss>"#;
        let articles = parse_feed(xml).expect("should parse");
        assert!(articles.is_empty());
    }

    #[test]
    fn headline_only_items_have_no_body() {
        let xml = r#"<rss version="2.0"><channel>
          <item>
            <title>Headline only</title>
            <link>https://example.com/h</link>
            <pubDate>Wed, 12 Jun 2024 10:00:00 GMT</pubDate>
          </item>
        </channel></rss>"#;
        let articles = parse_feed(xml).expect("should parse");
        assert_eq!(articles.len(), 1);
        assert!(articles[0].body.is_none());
    }
}
