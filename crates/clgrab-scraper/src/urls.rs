//! URL builders for every endpoint the pipeline touches.
//!
//! The marketplace API is versioned but undocumented; the exact path and
//! query shape of each endpoint is load-bearing and preserved verbatim:
//!
//! - suggest: `/web/v7/suggest/location?cc=US&lang=en&query={q}`
//! - category tree: `/web/v7/categories/count?areaId={id}&cc=US&lang=en&query={label}`
//! - search: `/web/v7/postings/search/full?batch={areaId}-0-360-0-0&cc=US&lang=en&searchPath={token}`
//!
//! `{areaId}-0-360-0-0` is the batch window encoding: page 0, window of 360
//! results, no filters.

use crate::error::ScraperError;

/// Production API host. Tests substitute a local server via
/// [`crate::client::ScrapeClient::with_bases`].
pub(crate) const API_BASE: &str = "https://sapi.craigslist.org";

/// Production host for the regional directory pages.
pub(crate) const GEO_BASE: &str = "https://geo.craigslist.org";

const IMAGE_CDN: &str = "https://images.craigslist.org";

/// Thumbnail size interpolated into every image URL.
const IMAGE_SIZE: &str = "300x300";

fn build(base: &str, path: &str, params: &[(&str, &str)]) -> Result<String, ScraperError> {
    let joined = format!("{}{path}", base.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&joined).map_err(|e| ScraperError::InvalidUrl {
        url: joined.clone(),
        reason: e.to_string(),
    })?;
    for (key, value) in params {
        url.query_pairs_mut().append_pair(key, value);
    }
    Ok(url.to_string())
}

pub(crate) fn suggest_url(api_base: &str, query: &str) -> Result<String, ScraperError> {
    build(
        api_base,
        "/web/v7/suggest/location",
        &[("cc", "US"), ("lang", "en"), ("query", query)],
    )
}

pub(crate) fn category_count_url(
    api_base: &str,
    area_id: &str,
    label: &str,
) -> Result<String, ScraperError> {
    build(
        api_base,
        "/web/v7/categories/count",
        &[
            ("areaId", area_id),
            ("cc", "US"),
            ("lang", "en"),
            ("query", label),
        ],
    )
}

pub(crate) fn search_url(
    api_base: &str,
    area_id: &str,
    category_token: &str,
) -> Result<String, ScraperError> {
    let batch = format!("{area_id}-0-360-0-0");
    build(
        api_base,
        "/web/v7/postings/search/full",
        &[
            ("batch", &batch),
            ("cc", "US"),
            ("lang", "en"),
            ("searchPath", category_token),
        ],
    )
}

pub(crate) fn geo_directory_url(geo_base: &str, region: &str) -> String {
    format!("{}/iso/{region}", geo_base.trim_end_matches('/'))
}

/// Normalizes a suggestion or directory host into a fetchable site URL.
/// Suggest items carry bare hosts (`newyork.craigslist.org`); directory
/// anchors carry full URLs. Already-schemed values pass through.
pub(crate) fn site_url(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    }
}

/// Builds a listing's canonical detail-page URL.
///
/// The payload's location table carries bare site hosts (`newyork`) that get
/// the `.craigslist.org` suffix appended; an entry that already names a full
/// host (contains a dot) is used as-is. The sub-area path segment appears
/// only when the location entry carried one.
pub(crate) fn service_url(
    hostname: &str,
    sub_area_abbr: Option<&str>,
    category_token: &str,
    posting_id: &str,
) -> String {
    let host = if hostname.contains('.') {
        hostname.to_owned()
    } else {
        format!("{hostname}.craigslist.org")
    };
    match sub_area_abbr {
        Some(sub) => format!("https://{host}/{sub}/{category_token}/{posting_id}.html"),
        None => format!("https://{host}/{category_token}/{posting_id}.html"),
    }
}

/// Builds a thumbnail URL from the tail of an image slug (the portion after
/// the slug's own `:`).
pub(crate) fn image_url(slug_tail: &str) -> String {
    format!("{IMAGE_CDN}/{slug_tail}_{IMAGE_SIZE}.jpg")
}
