//! Typed decoding of the compact search payload.
//!
//! Each item is a fixed-position heterogeneous tuple, delta-encoded against
//! the payload's `decode` block. The positions below are undocumented and
//! order-dependent; decoding goes through named accessors with explicit
//! bounds and type checks so a shape violation is detected per item instead
//! of silently corrupting the record.
//!
//! Failure policy: a missing or malformed `decode` block fails the whole
//! page; any per-item violation (short tuple, wrong element type,
//! unparseable meta segment, out-of-range location index) skips that item,
//! logs a warning, and increments the page's skip counter. One uniform
//! policy: no silent drops, no aborts on a single bad item.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ScraperError;
use crate::types::{DecodeBlock, SearchData};
use crate::urls;

/// Tuple position of the posting-id delta (added to `minPostingId`).
const IDX_POSTING_ID_DELTA: usize = 0;
/// Tuple position of the posted-date delta in seconds (added to `minPostedDate`).
const IDX_POSTED_DATE_DELTA: usize = 1;
/// Tuple position of the `~`-delimited meta string whose first `:`-field is
/// the index into the payload's location table.
const IDX_ENCODED_META: usize = 4;
/// Offset from the tuple's end to the optional image-slug array.
const IMAGES_FROM_END: usize = 3;
/// Smallest tuple in which every addressed position is distinct.
const MIN_TUPLE_LEN: usize = 6;

/// A listing decoded from the search payload, before detail enrichment.
#[derive(Debug, Clone)]
pub struct DecodedListing {
    pub posting_id: String,
    pub posted_at: DateTime<Utc>,
    pub service_url: String,
    pub title: String,
    pub image_urls: Vec<String>,
}

/// Result of decoding one search page: listings in payload order plus the
/// number of items skipped for shape violations.
#[derive(Debug, Default)]
pub struct DecodedPage {
    pub listings: Vec<DecodedListing>,
    pub skipped: usize,
}

/// One parsed entry of the payload's location table.
#[derive(Debug)]
struct LocationEntry {
    hostname: String,
    /// Present only when the wire entry had exactly three elements.
    sub_area_abbr: Option<String>,
}

/// Decodes a search payload into listings, truncated to `totalResultCount`
/// entries in original order.
///
/// A zero or absent `totalResultCount` yields an empty page; "no listings"
/// is a valid terminal outcome, not an error.
///
/// # Errors
///
/// Returns [`ScraperError::Decode`] when the payload claims results but the
/// `decode` block is missing: without its anchors no item can be decoded.
pub fn decode_page(
    data: &SearchData,
    category_token: &str,
) -> Result<DecodedPage, ScraperError> {
    if data.total_result_count == 0 {
        return Ok(DecodedPage::default());
    }

    let decode = data.decode.as_ref().ok_or_else(|| ScraperError::Decode {
        context: format!("search page for \"{category_token}\""),
        reason: format!(
            "payload claims {} results but has no decode block",
            data.total_result_count
        ),
    })?;

    let locations: Vec<Option<LocationEntry>> = decode
        .locations
        .iter()
        .map(parse_location_entry)
        .collect();

    let take = usize::try_from(data.total_result_count).unwrap_or(usize::MAX);
    let mut page = DecodedPage::default();

    for (index, item) in data.items.iter().take(take).enumerate() {
        match decode_item(item, decode, &locations, category_token) {
            Ok(listing) => page.listings.push(listing),
            Err(reason) => {
                tracing::warn!(index, reason, "skipping malformed search item");
                page.skipped += 1;
            }
        }
    }

    Ok(page)
}

fn decode_item(
    item: &Value,
    decode: &DecodeBlock,
    locations: &[Option<LocationEntry>],
    category_token: &str,
) -> Result<DecodedListing, String> {
    let tuple = item.as_array().ok_or("item is not an array")?;
    if tuple.len() < MIN_TUPLE_LEN {
        return Err(format!(
            "tuple has {} elements, expected at least {MIN_TUPLE_LEN}",
            tuple.len()
        ));
    }

    let id_delta = tuple_i64(tuple, IDX_POSTING_ID_DELTA, "posting id delta")?;
    let date_delta = tuple_i64(tuple, IDX_POSTED_DATE_DELTA, "posted date delta")?;
    let meta = tuple_str(tuple, IDX_ENCODED_META, "encoded meta")?;
    let location_index = parse_location_index(meta)?;

    let title = tuple
        .last()
        .and_then(Value::as_str)
        .ok_or("title (last element) is not a string")?;

    let posted_epoch = decode
        .min_posted_date
        .checked_add(date_delta)
        .ok_or("posted date delta overflows the anchor")?;
    let posted_at = DateTime::from_timestamp(posted_epoch, 0)
        .ok_or("posted date out of calendar range")?;
    let posting_id = decode
        .min_posting_id
        .checked_add(id_delta)
        .ok_or("posting id delta overflows the anchor")?
        .to_string();

    let entry = locations
        .get(location_index)
        .ok_or_else(|| {
            format!(
                "location index {location_index} out of range for {} entries",
                locations.len()
            )
        })?
        .as_ref()
        .ok_or_else(|| format!("location entry {location_index} is malformed"))?;

    let image_urls = decode_images(&tuple[tuple.len() - IMAGES_FROM_END]);

    let service_url = urls::service_url(
        &entry.hostname,
        entry.sub_area_abbr.as_deref(),
        category_token,
        &posting_id,
    );

    Ok(DecodedListing {
        posting_id,
        posted_at,
        service_url,
        title: title.to_owned(),
        image_urls,
    })
}

fn tuple_i64(tuple: &[Value], index: usize, field: &str) -> Result<i64, String> {
    tuple
        .get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("{field} (element {index}) is not an integer"))
}

fn tuple_str<'a>(tuple: &'a [Value], index: usize, field: &str) -> Result<&'a str, String> {
    tuple
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{field} (element {index}) is not a string"))
}

/// The meta string is `~`-delimited; its first segment is `:`-delimited and
/// opens with the location index.
fn parse_location_index(meta: &str) -> Result<usize, String> {
    let first_segment = meta.split('~').next().unwrap_or("");
    let first_field = first_segment.split(':').next().unwrap_or("");
    first_field
        .parse::<usize>()
        .map_err(|_| format!("meta \"{meta}\" does not open with a location index"))
}

/// Wire entries are `[display, host]` or `[display, host, subAreaAbbr]`.
/// Anything else is malformed; items referencing it are skipped.
fn parse_location_entry(entry: &Value) -> Option<LocationEntry> {
    let fields = entry.as_array()?;
    let hostname = fields.get(1)?.as_str()?.to_owned();
    let sub_area_abbr = if fields.len() == 3 {
        Some(fields.get(2)?.as_str()?.to_owned())
    } else {
        None
    };
    Some(LocationEntry {
        hostname,
        sub_area_abbr,
    })
}

/// The third-from-last element is an image-slug array when the listing has
/// photos; every element after its first is a slug whose portion after `:`
/// feeds the CDN URL template. A scalar there means no images, not an error.
fn decode_images(field: &Value) -> Vec<String> {
    let Value::Array(slugs) = field else {
        return Vec::new();
    };
    slugs
        .iter()
        .skip(1)
        .filter_map(Value::as_str)
        .filter_map(|slug| slug.split_once(':'))
        .map(|(_, tail)| urls::image_url(tail))
        .collect()
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod tests;
