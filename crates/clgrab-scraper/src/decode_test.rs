use super::*;
use crate::types::SearchData;
use serde_json::json;

fn search_data(value: serde_json::Value) -> SearchData {
    serde_json::from_value(value).expect("test payload deserializes")
}

/// One well-formed tuple: id delta 5, date delta 60, meta pointing at
/// location 0, no images, title last.
fn basic_item() -> serde_json::Value {
    json!([5, 60, 0, 0, "0:2:3~1", 0, 0, "Math tutor"])
}

fn basic_payload() -> SearchData {
    search_data(json!({
        "totalResultCount": 1,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [basic_item()]
    }))
}

#[test]
fn scenario_single_item_decodes_id_date_and_url() {
    let page = decode_page(&basic_payload(), "lss").unwrap();
    assert_eq!(page.skipped, 0);
    assert_eq!(page.listings.len(), 1);

    let listing = &page.listings[0];
    assert_eq!(listing.posting_id, "105");
    assert_eq!(listing.posted_at.timestamp(), 1_700_000_060);
    assert_eq!(listing.service_url, "https://example.craigslist.org/lss/105.html");
    assert_eq!(listing.title, "Math tutor");
    assert!(listing.image_urls.is_empty());
}

#[test]
fn zero_results_is_empty_not_error() {
    let data = search_data(json!({ "totalResultCount": 0 }));
    let page = decode_page(&data, "lss").unwrap();
    assert!(page.listings.is_empty());
    assert_eq!(page.skipped, 0);
}

#[test]
fn absent_total_count_is_empty_not_error() {
    let data = search_data(json!({}));
    let page = decode_page(&data, "lss").unwrap();
    assert!(page.listings.is_empty());
}

#[test]
fn missing_decode_block_with_results_is_hard_failure() {
    let data = search_data(json!({
        "totalResultCount": 3,
        "items": [basic_item()]
    }));
    let err = decode_page(&data, "lss").unwrap_err();
    assert!(matches!(err, ScraperError::Decode { .. }), "got: {err:?}");
}

#[test]
fn items_truncated_to_total_result_count() {
    let data = search_data(json!({
        "totalResultCount": 1,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [5, 60, 0, 0, "0:2", 0, 0, "First"],
            [6, 61, 0, 0, "0:2", 0, 0, "Second"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.listings.len(), 1);
    assert_eq!(page.listings[0].title, "First");
}

#[test]
fn total_count_beyond_item_count_decodes_what_exists() {
    let data = search_data(json!({
        "totalResultCount": 360,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [5, 60, 0, 0, "0:2", 0, 0, "First"],
            [6, 61, 0, 0, "0:2", 0, 0, "Second"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.listings.len(), 2);
}

#[test]
fn output_order_matches_item_order_and_ids_are_unique() {
    let data = search_data(json!({
        "totalResultCount": 3,
        "decode": {
            "minPostingId": 1000,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [30, 1, 0, 0, "0:2", 0, 0, "c"],
            [10, 2, 0, 0, "0:2", 0, 0, "a"],
            [20, 3, 0, 0, "0:2", 0, 0, "b"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    let titles: Vec<&str> = page.listings.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "a", "b"]);

    let mut ids: Vec<&str> = page.listings.iter().map(|l| l.posting_id.as_str()).collect();
    assert_eq!(ids, vec!["1030", "1010", "1020"]);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn sub_area_segment_present_iff_entry_has_three_fields() {
    let data = search_data(json!({
        "totalResultCount": 2,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [
                ["New York", "newyork", "brk"],
                ["City", "example.craigslist.org"]
            ]
        },
        "items": [
            [1, 0, 0, 0, "0:2", 0, 0, "with sub-area"],
            [2, 0, 0, 0, "1:2", 0, 0, "without"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(
        page.listings[0].service_url,
        "https://newyork.craigslist.org/brk/lss/101.html"
    );
    assert_eq!(
        page.listings[1].service_url,
        "https://example.craigslist.org/lss/102.html"
    );
}

#[test]
fn image_array_skips_header_slug_and_builds_cdn_urls() {
    let data = search_data(json!({
        "totalResultCount": 1,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [5, 60, 0, 0, "0:2", ["head:x", "3:00a0a_abc", "3:00b0b_def"], 0, "With pics"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(
        page.listings[0].image_urls,
        vec![
            "https://images.craigslist.org/00a0a_abc_300x300.jpg",
            "https://images.craigslist.org/00b0b_def_300x300.jpg"
        ]
    );
}

#[test]
fn out_of_range_location_index_skips_only_that_item() {
    let data = search_data(json!({
        "totalResultCount": 2,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [1, 0, 0, 0, "7:2", 0, 0, "bad index"],
            [2, 0, 0, 0, "0:2", 0, 0, "good"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.skipped, 1);
    assert_eq!(page.listings.len(), 1);
    assert_eq!(page.listings[0].title, "good");
}

#[test]
fn short_tuple_and_bad_meta_are_skipped_and_counted() {
    let data = search_data(json!({
        "totalResultCount": 3,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [1, 0, "too short"],
            [2, 0, 0, 0, "not-a-number:2", 0, 0, "bad meta"],
            [3, 0, 0, 0, "0:2", 0, 0, "good"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.skipped, 2);
    assert_eq!(page.listings.len(), 1);
    assert_eq!(page.listings[0].posting_id, "103");
}

#[test]
fn malformed_location_entry_skips_referencing_item() {
    let data = search_data(json!({
        "totalResultCount": 1,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["only-display"]]
        },
        "items": [[1, 0, 0, 0, "0:2", 0, 0, "orphan"]]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.skipped, 1);
    assert!(page.listings.is_empty());
}

#[test]
fn non_array_item_is_skipped() {
    let data = search_data(json!({
        "totalResultCount": 1,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": ["not a tuple"]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.skipped, 1);
}

#[test]
fn negative_deltas_decode_below_the_anchors() {
    let data = search_data(json!({
        "totalResultCount": 1,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [[-5, -60, 0, 0, "0:2", 0, 0, "early"]]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.listings[0].posting_id, "95");
    assert_eq!(page.listings[0].posted_at.timestamp(), 1_699_999_940);
}

#[test]
fn overflowing_deltas_are_skipped_and_counted() {
    let data = search_data(json!({
        "totalResultCount": 3,
        "decode": {
            "minPostingId": 100,
            "minPostedDate": 1_700_000_000,
            "locations": [["City", "example.craigslist.org"]]
        },
        "items": [
            [i64::MAX, 60, 0, 0, "0:2", 0, 0, "id overflow"],
            [5, i64::MAX, 0, 0, "0:2", 0, 0, "date overflow"],
            [5, 60, 0, 0, "0:2", 0, 0, "good"]
        ]
    }));
    let page = decode_page(&data, "lss").unwrap();
    assert_eq!(page.skipped, 2);
    assert_eq!(page.listings.len(), 1);
    assert_eq!(page.listings[0].title, "good");
}
