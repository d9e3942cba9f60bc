//! Location resolution: free-text place name → site URL → area id.
//!
//! The area id is not exposed anywhere structured; it lives in serialized
//! script state on each site's front page, so extraction is a literal marker
//! scan. The marker's exact casing and quoting (`areaid: "` after
//! lowercasing, closed by `",`) is load-bearing: tolerant of surrounding
//! HTML, brittle to the marker itself.

use regex::Regex;

use crate::client::ScrapeClient;
use crate::error::ScraperError;
use crate::types::{Location, Site, SuggestResponse};
use crate::urls;

/// Marker preceding the area id in the lowercased front page.
const AREA_ID_MARKER: &str = "areaid: \"";
const AREA_ID_CLOSE: &str = "\",";

/// Resolves a free-text city name to a [`Location`].
///
/// Takes the FIRST suggested item as the match, no fuzzy ranking. Returns
/// `Ok(None)` when the suggest endpoint has no candidates or the front page
/// carries no area-id marker; both are diagnostics, not failures.
///
/// # Errors
///
/// Propagates fetch errors from the suggest call or the front-page fetch.
pub async fn resolve_location(
    client: &ScrapeClient,
    city_name: &str,
) -> Result<Option<Location>, ScraperError> {
    let url = urls::suggest_url(&client.api_base, city_name)?;
    let response: SuggestResponse = client.fetch_json(&url, "location suggestions").await?;

    let Some(item) = response.data.items.first() else {
        tracing::info!(city = city_name, "no location suggestion returned");
        return Ok(None);
    };

    let site_url = urls::site_url(&item.url);
    let Some(area_id) = area_id_for_site(client, &site_url).await? else {
        return Ok(None);
    };

    Ok(Some(Location {
        name: city_name.to_owned(),
        site_url,
        area_id,
    }))
}

/// Fetches a site's front page and scans out its area id.
///
/// # Errors
///
/// Propagates the front-page fetch error.
pub async fn area_id_for_site(
    client: &ScrapeClient,
    site_url: &str,
) -> Result<Option<String>, ScraperError> {
    let page = client.fetch_html(site_url).await?;
    let area_id = extract_area_id(&page);
    if area_id.is_none() {
        tracing::warn!(site_url, "front page carries no area-id marker");
    }
    Ok(area_id)
}

/// Scans serialized page content for the area-id marker and returns the
/// token up to the closing `",`.
fn extract_area_id(page: &str) -> Option<String> {
    let lowered = page.to_lowercase();
    let start = lowered.find(AREA_ID_MARKER)? + AREA_ID_MARKER.len();
    let end = lowered[start..].find(AREA_ID_CLOSE)? + start;
    let token = &lowered[start..end];
    if token.is_empty() {
        return None;
    }
    Some(token.to_owned())
}

/// Fetches the regional directory page and returns every site anchor inside
/// the `geo-site-list` container, in document order. No dedup, no
/// pagination; the single page is authoritative.
///
/// # Errors
///
/// Propagates the directory fetch error.
pub async fn resolve_all_locations(
    client: &ScrapeClient,
    region: &str,
) -> Result<Vec<Site>, ScraperError> {
    let url = urls::geo_directory_url(&client.geo_base, region);
    let page = client.fetch_html(&url).await?;
    let sites = extract_directory_sites(&page);
    tracing::info!(region, count = sites.len(), "resolved regional directory");
    Ok(sites)
}

/// Extracts `(name, href)` anchor pairs from the `geo-site-list` container.
fn extract_directory_sites(page: &str) -> Vec<Site> {
    let Some(container) = isolate_site_list(page) else {
        return Vec::new();
    };

    let re = Regex::new(r#"(?is)<a[^>]*href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
        .expect("valid anchor regex");
    re.captures_iter(container)
        .filter_map(|cap| {
            let href = cap.get(1)?.as_str().trim();
            let name = strip_inner_tags(cap.get(2)?.as_str());
            if href.is_empty() || name.is_empty() {
                return None;
            }
            Some(Site {
                name,
                url: urls::site_url(href),
            })
        })
        .collect()
}

/// Slices the page down to the `geo-site-list` element's contents so anchors
/// elsewhere on the page (navigation, footer) are not picked up.
fn isolate_site_list(page: &str) -> Option<&str> {
    let marker = page.find("geo-site-list")?;
    let open_end = page[marker..].find('>')? + marker + 1;
    let close = page[open_end..].find("</ul>")? + open_end;
    Some(&page[open_end..close])
}

fn strip_inner_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_owned()
}
