//! Plain-text extraction from scraped article pages.

/// Extract readable article text from an HTML page.
///
/// Collects the inner text of every `<p>` element and joins the paragraphs
/// with blank lines. Deliberately unsophisticated: the fetch stage treats an
/// empty result as "scrape unavailable" and falls back to the headline.
#[must_use]
pub fn extract_article_text(html: &str) -> String {
    let mut paragraphs = Vec::new();
    let mut cursor = 0usize;

    while let Some(tag_start) = find_ascii_ci(html, "<p", cursor) {
        // Reject partial matches like <pre> or <picture>.
        let after = html.as_bytes().get(tag_start + 2);
        if !matches!(after, Some(b'>' | b' ' | b'\t' | b'\r' | b'\n')) {
            cursor = tag_start + 2;
            continue;
        }

        let Some(open_end) = find_ascii_ci(html, ">", tag_start) else {
            break;
        };
        let content_start = open_end + 1;
        let Some(content_end) = find_ascii_ci(html, "</p>", content_start) else {
            break;
        };

        let paragraph = strip_html(&html[content_start..content_end]);
        if !paragraph.is_empty() {
            paragraphs.push(paragraph);
        }

        cursor = content_end + "</p>".len();
    }

    paragraphs.join("\n\n")
}

/// ASCII-case-insensitive substring search starting at a byte offset.
///
/// Needles start with an ASCII byte, so every returned offset is a valid
/// char boundary in the haystack.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || from >= h.len() || h.len() < n.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Strip HTML tags from a string and decode the common entities,
/// returning plain text.
#[must_use]
pub(crate) fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    let decoded = result
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");

    decoded.trim().to_string()
}
