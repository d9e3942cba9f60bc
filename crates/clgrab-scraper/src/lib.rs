//! Extraction pipeline for classified-listing records.
//!
//! Resolves a free-text location and category into the marketplace's
//! internal identifiers, decodes the delta-encoded search payload into
//! normalized listings, and enriches each listing from its detail page.

pub mod catalog;
pub mod category;
pub mod client;
pub mod decode;
pub mod detail;
pub mod error;
pub mod location;
mod retry;
pub mod types;
mod urls;

pub use catalog::{Catalog, ScrapeOutcome};
pub use client::ScrapeClient;
pub use decode::{decode_page, DecodedListing, DecodedPage};
pub use detail::Detail;
pub use error::ScraperError;
pub use types::{Location, Site};
