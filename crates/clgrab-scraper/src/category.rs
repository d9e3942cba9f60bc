//! Category resolution: free-text label → category path token.
//!
//! Category trees are area-scoped, so a label must be re-resolved for every
//! area. A label absent from a given area's tree is a normal outcome, not an
//! error; the category simply isn't offered there.

use crate::client::ScrapeClient;
use crate::error::ScraperError;
use crate::types::{CategoryNode, CategoryResponse};
use crate::urls;

/// Resolves `label` against the category tree of `area_id`.
///
/// Exact string match (case-sensitive, no fuzzing), depth-first, first match
/// wins. The traversal is recursive over arbitrary depth; observed trees
/// never exceed three levels but the format makes no such promise.
///
/// Returns `Ok(None)` when no node carries the label.
///
/// # Errors
///
/// Propagates fetch errors from the category-count call.
pub async fn resolve_category(
    client: &ScrapeClient,
    label: &str,
    area_id: &str,
) -> Result<Option<String>, ScraperError> {
    let url = urls::category_count_url(&client.api_base, area_id, label)?;
    let response: CategoryResponse = client.fetch_json(&url, "category tree").await?;
    Ok(find_token(&response.data.items, label))
}

/// Depth-first search for the first node whose label matches exactly,
/// returning its abbreviation. A matching node without an abbreviation is a
/// grouping-only node; the search continues past it.
fn find_token(nodes: &[CategoryNode], label: &str) -> Option<String> {
    for node in nodes {
        if node.label == label {
            if let Some(token) = &node.abbreviation {
                return Some(token.clone());
            }
        }
        if let Some(token) = find_token(&node.items, label) {
            return Some(token);
        }
    }
    None
}
