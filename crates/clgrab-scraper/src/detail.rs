//! Detail-page enrichment: free-text description and best-effort phone.
//!
//! Postings disappear between the search fetch and the detail fetch; an
//! absent content element therefore yields an empty [`Detail`], never an
//! error. Text extraction slices the raw HTML directly; the pages are
//! template-generated and the content element's id is stable.

use regex::Regex;

use crate::client::ScrapeClient;
use crate::error::ScraperError;

/// Attribute marker of the posting's free-text content element.
const POSTING_BODY_MARKER: &str = "id=\"postingbody\"";

/// Attribute marker of the print/QR sub-block embedded inside the content
/// element. Its text is boilerplate, not posting content.
const QR_BLOCK_MARKER: &str = "class=\"print-information print-qrcode-container\"";

/// US phone pattern: optional country code, `-`/`.`/space separators,
/// optional parentheses around the area code. First match wins.
const PHONE_PATTERN: &str = r"[\+]?[\d]?[\s]?[(]?\d{3}[\s\-)]?[\s\.]?\d{3}[\s\-\.]?\d{4}";

/// What a detail page contributes to a listing.
#[derive(Debug, Clone, Default)]
pub struct Detail {
    pub description: Option<String>,
    pub phone: Option<String>,
}

/// Fetches a listing's detail page and extracts description and phone.
///
/// # Errors
///
/// Propagates the page fetch error. A fetched page without the content
/// element yields `Ok` with both fields absent.
pub async fn enrich(client: &ScrapeClient, service_url: &str) -> Result<Detail, ScraperError> {
    tracing::debug!(service_url, "fetching detail page");
    let page = client.fetch_html(service_url).await?;
    Ok(extract_detail(&page))
}

/// Pure extraction over an already-fetched detail page.
#[must_use]
pub fn extract_detail(page: &str) -> Detail {
    let Some(description) = extract_description(page) else {
        return Detail::default();
    };
    let phone = extract_phone(&description);
    Detail {
        description: Some(description),
        phone,
    }
}

/// Extracts the posting body as newline-joined, whitespace-trimmed plain
/// text. Returns `None` when the content element is absent or its text is
/// empty.
fn extract_description(page: &str) -> Option<String> {
    let body = element_inner(page, POSTING_BODY_MARKER)?;
    let body = strip_qr_block(body);
    let text = flatten_text(&body);
    if text.is_empty() {
        return None;
    }
    Some(text)
}

/// Attempts to cut the print/QR sub-block out of the content; on any
/// structural failure the unmodified content is used; the surrounding text
/// is still usable.
fn strip_qr_block(body: &str) -> String {
    match element_span(body, QR_BLOCK_MARKER) {
        Some((start, end)) => {
            let mut stripped = String::with_capacity(body.len() - (end - start));
            stripped.push_str(&body[..start]);
            stripped.push_str(&body[end..]);
            stripped
        }
        None => body.to_owned(),
    }
}

/// Returns the first phone-pattern match in `text`, trimmed. Absence of a
/// match is `None`, never an error. Idempotent: extracting from an already
/// extracted value returns it unchanged.
#[must_use]
pub fn extract_phone(text: &str) -> Option<String> {
    let re = Regex::new(PHONE_PATTERN).expect("valid phone regex");
    re.find(text).map(|m| m.as_str().trim().to_owned())
}

/// Inner text span of the element carrying `attr_marker`, handling nested
/// elements of the same tag name by depth tracking.
fn element_inner<'a>(html: &'a str, attr_marker: &str) -> Option<&'a str> {
    let (_, open_end, close_start, _) = element_bounds(html, attr_marker)?;
    Some(&html[open_end..close_start])
}

/// Full byte span (opening `<` through closing tag) of the element carrying
/// `attr_marker`.
fn element_span(html: &str, attr_marker: &str) -> Option<(usize, usize)> {
    let (tag_start, _, _, close_end) = element_bounds(html, attr_marker)?;
    Some((tag_start, close_end))
}

fn element_bounds(html: &str, attr_marker: &str) -> Option<(usize, usize, usize, usize)> {
    let attr_pos = html.find(attr_marker)?;
    let tag_start = html[..attr_pos].rfind('<')?;
    let name_end = html[tag_start + 1..]
        .find(|c: char| c.is_whitespace() || c == '>')?
        + tag_start
        + 1;
    let name = &html[tag_start + 1..name_end];
    if name.is_empty() || name.starts_with('/') {
        return None;
    }
    let open_end = html[attr_pos..].find('>')? + attr_pos + 1;

    let open_marker = format!("<{name}");
    let close_marker = format!("</{name}>");
    let mut depth = 1usize;
    let mut pos = open_end;

    loop {
        let next_close = html[pos..].find(&close_marker)?;
        match html[pos..].find(&open_marker) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                pos += next_open + open_marker.len();
            }
            _ => {
                depth -= 1;
                let close_start = pos + next_close;
                if depth == 0 {
                    return Some((tag_start, open_end, close_start, close_start + close_marker.len()));
                }
                pos = close_start + close_marker.len();
            }
        }
    }
}

/// Flattens markup to plain text: tags become segment boundaries, segments
/// are entity-decoded and trimmed, empties dropped, the rest newline-joined.
fn flatten_text(html: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    segments.push(decode_entities(trimmed));
                }
                current.clear();
            }
            '>' if in_tag => in_tag = false,
            c if !in_tag => current.push(c),
            _ => {}
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        segments.push(decode_entities(trimmed));
    }

    segments.join("\n")
}

/// Decodes the handful of entities the detail pages actually emit. `&amp;`
/// goes last so escaped entity text (`&amp;lt;`) decodes to the literal
/// `&lt;` rather than being decoded twice.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
        <html><body>
        <header><a href="/">back to results</a></header>
        <section id="postingbody">
            Experienced math tutor available.
            <br>
            Call 555-123-4567 or email me.
            <div class="print-information print-qrcode-container">
                <p class="print-qrcode-label">QR Code Link to This Post</p>
                <div class="print-qrcode"></div>
            </div>
        </section>
        <footer>posting id: 105</footer>
        </body></html>
    "#;

    #[test]
    fn extracts_description_without_qr_boilerplate() {
        let detail = extract_detail(DETAIL_PAGE);
        let description = detail.description.unwrap();
        assert!(description.contains("Experienced math tutor available."));
        assert!(description.contains("Call 555-123-4567 or email me."));
        assert!(!description.contains("QR Code"));
        assert!(!description.contains("posting id"));
    }

    #[test]
    fn description_segments_are_newline_joined() {
        let detail = extract_detail(DETAIL_PAGE);
        let description = detail.description.unwrap();
        assert_eq!(
            description,
            "Experienced math tutor available.\nCall 555-123-4567 or email me."
        );
    }

    #[test]
    fn phone_pulled_from_description() {
        let detail = extract_detail(DETAIL_PAGE);
        assert_eq!(detail.phone.as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn missing_posting_body_yields_empty_detail() {
        let detail = extract_detail("<html><body>This posting has been deleted.</body></html>");
        assert!(detail.description.is_none());
        assert!(detail.phone.is_none());
    }

    #[test]
    fn unbalanced_qr_block_falls_back_to_unmodified_content() {
        // The QR container never closes; removal must fail and the
        // surrounding text must still come through.
        let page = r#"<section id="postingbody">Great lessons.
            <div class="print-information print-qrcode-container"><p>QR Code</p>
            </section>"#;
        let detail = extract_detail(page);
        let description = detail.description.unwrap();
        assert!(description.contains("Great lessons."));
        assert!(description.contains("QR Code"));
    }

    #[test]
    fn entities_are_decoded() {
        let page = r#"<section id="postingbody">Algebra &amp; Geometry &#39;19</section>"#;
        let detail = extract_detail(page);
        assert_eq!(detail.description.as_deref(), Some("Algebra & Geometry '19"));
    }

    #[test]
    fn escaped_entities_decode_once_not_twice() {
        assert_eq!(decode_entities("grades &amp;lt; 9"), "grades &lt; 9");
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn phone_with_country_code_and_parens() {
        assert_eq!(
            extract_phone("reach me at +1 (555) 123 4567 anytime").as_deref(),
            Some("+1 (555) 123 4567")
        );
    }

    #[test]
    fn phone_with_dot_separators() {
        assert_eq!(
            extract_phone("call 555.123.4567").as_deref(),
            Some("555.123.4567")
        );
    }

    #[test]
    fn first_of_multiple_phones_wins() {
        assert_eq!(
            extract_phone("cell 555-111-2222, office 555-333-4444").as_deref(),
            Some("555-111-2222")
        );
    }

    #[test]
    fn no_digit_run_yields_none() {
        assert_eq!(extract_phone("no contact info in this posting"), None);
        assert_eq!(extract_phone("posted 12/24/2022"), None);
    }

    #[test]
    fn phone_extraction_is_idempotent() {
        let first = extract_phone("call me: (555) 123-4567 after 5pm").unwrap();
        let second = extract_phone(&first).unwrap();
        assert_eq!(first, second);
    }
}
