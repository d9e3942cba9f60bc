//! Wire types for the marketplace's internal `web/v7` API.
//!
//! ## Observed shapes
//!
//! Every endpoint wraps its payload in a `data` object. Fields the server
//! omits on empty results (`totalResultCount`, `items`) default rather than
//! fail deserialization.
//!
//! ### Search payload
//! The search response is compact and positional. `data.decode` carries the
//! anchors every item is delta-encoded against: `minPostingId`,
//! `minPostedDate` (epoch seconds), and a `locations` lookup table of 2- or
//! 3-element arrays, `[display, host]` or `[display, host, subAreaAbbr]`.
//! `data.items` is an array of heterogeneous tuples whose element types vary
//! by position, so both stay as [`serde_json::Value`] here and go through the
//! typed accessors in [`crate::decode`].
//!
//! ### Category tree
//! `data.items` nests arbitrarily via each node's own `items` array. Observed
//! depth is at most 3, but nothing in the format promises that, so the node
//! type is recursive.

use serde::Deserialize;

/// Response from the location-suggestion endpoint.
#[derive(Debug, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub data: SuggestData,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestData {
    #[serde(default)]
    pub items: Vec<SuggestItem>,
}

/// One suggested location. `url` is a bare site host such as
/// `newyork.craigslist.org`.
#[derive(Debug, Deserialize)]
pub struct SuggestItem {
    pub url: String,
}

/// Response from the category-count endpoint.
#[derive(Debug, Deserialize)]
pub struct CategoryResponse {
    #[serde(default)]
    pub data: CategoryData,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub items: Vec<CategoryNode>,
}

/// One node of the area-scoped category tree.
#[derive(Debug, Deserialize)]
pub struct CategoryNode {
    pub label: String,
    /// The category path token. Absent on grouping-only nodes.
    #[serde(default)]
    pub abbreviation: Option<String>,
    /// Child categories. Empty at leaves.
    #[serde(default)]
    pub items: Vec<CategoryNode>,
}

/// Response from the full-search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: SearchData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    /// Omitted entirely when an area has no listings for the category.
    #[serde(default)]
    pub total_result_count: u64,
    /// Delta-decode anchors. Required whenever `total_result_count > 0`.
    #[serde(default)]
    pub decode: Option<DecodeBlock>,
    /// Positional item tuples, one per listing.
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

/// The shared base values every item's fields are deltas against.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeBlock {
    pub min_posting_id: i64,
    /// Epoch seconds.
    pub min_posted_date: i64,
    /// Index-addressed location table; entries are 2- or 3-element arrays.
    pub locations: Vec<serde_json::Value>,
}

/// One entry of a regional directory page: site display name and URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub name: String,
    pub url: String,
}

/// A resolved location: the inputs every category and search call needs.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: String,
    pub site_url: String,
    /// Opaque token scraped out of the site front page's embedded script
    /// state. Required before any category or search call.
    pub area_id: String,
}
