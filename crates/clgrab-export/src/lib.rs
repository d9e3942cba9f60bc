//! Persistence writers for a scrape run's listing sequence.
//!
//! Two interchangeable encodings of the same flat record: a CSV table (image
//! URLs joined into one delimited cell, leading 1-based row index) and a
//! JSON array of objects (image URLs kept as an array). An empty run still
//! yields a well-formed artifact: one placeholder row with every field
//! empty, so downstream consumers always see the full header/key set.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use clgrab_core::Listing;

/// Timestamp rendering used in both encodings.
const DATE_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

/// Delimiter for the CSV form's image-URL cell.
const IMAGE_JOIN: &str = ", ";

const CSV_HEADER: [&str; 10] = [
    "",
    "location_name",
    "category_name",
    "posting_id",
    "posted_at",
    "service_url",
    "title",
    "phone",
    "image_urls",
    "description",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// One record of the JSON encoding. The placeholder row for empty runs uses
/// empty strings and an empty array.
#[derive(Debug, Serialize)]
struct JsonRecord {
    location_name: String,
    category_name: String,
    posting_id: String,
    posted_at: String,
    service_url: String,
    title: String,
    phone: String,
    image_urls: Vec<String>,
    description: String,
}

impl JsonRecord {
    fn from_listing(listing: &Listing) -> Self {
        Self {
            location_name: listing.location_name.clone(),
            category_name: listing.category_name.clone(),
            posting_id: listing.posting_id.clone(),
            posted_at: listing.posted_at.format(DATE_FORMAT).to_string(),
            service_url: listing.service_url.clone(),
            title: listing.title.clone(),
            phone: listing.phone.clone().unwrap_or_default(),
            image_urls: listing.image_urls.clone(),
            description: listing.description.clone().unwrap_or_default(),
        }
    }

    fn placeholder() -> Self {
        Self {
            location_name: String::new(),
            category_name: String::new(),
            posting_id: String::new(),
            posted_at: String::new(),
            service_url: String::new(),
            title: String::new(),
            phone: String::new(),
            image_urls: Vec::new(),
            description: String::new(),
        }
    }
}

/// Output filename for a run: `{location_or_all}_{category}.{ext}` with
/// spaces removed.
#[must_use]
pub fn output_filename(location: Option<&str>, category: &str, format: OutputFormat) -> String {
    let stem = format!(
        "{}_{category}.{}",
        location.unwrap_or("all"),
        format.extension()
    );
    stem.replace(' ', "")
}

/// Writes `listings` under `dir` in the chosen encoding and returns the
/// written path.
///
/// # Errors
///
/// Returns [`ExportError`] on any filesystem or encoding failure.
pub fn write_listings(
    listings: &[Listing],
    format: OutputFormat,
    dir: &Path,
    location: Option<&str>,
    category: &str,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(output_filename(location, category, format));
    match format {
        OutputFormat::Csv => write_csv(listings, &path)?,
        OutputFormat::Json => write_json(listings, &path)?,
    }
    tracing::info!(path = %path.display(), records = listings.len(), "wrote export file");
    Ok(path)
}

fn write_csv(listings: &[Listing], path: &Path) -> Result<(), ExportError> {
    let to_csv_err = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(to_csv_err)?;
    writer.write_record(CSV_HEADER).map_err(to_csv_err)?;

    if listings.is_empty() {
        writer
            .write_record(vec![""; CSV_HEADER.len()])
            .map_err(to_csv_err)?;
    } else {
        for (index, listing) in listings.iter().enumerate() {
            writer
                .write_record([
                    (index + 1).to_string(),
                    listing.location_name.clone(),
                    listing.category_name.clone(),
                    listing.posting_id.clone(),
                    listing.posted_at.format(DATE_FORMAT).to_string(),
                    listing.service_url.clone(),
                    listing.title.clone(),
                    listing.phone.clone().unwrap_or_default(),
                    listing.image_urls.join(IMAGE_JOIN),
                    listing.description.clone().unwrap_or_default(),
                ])
                .map_err(to_csv_err)?;
        }
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json(listings: &[Listing], path: &Path) -> Result<(), ExportError> {
    let records: Vec<JsonRecord> = if listings.is_empty() {
        vec![JsonRecord::placeholder()]
    } else {
        listings.iter().map(JsonRecord::from_listing).collect()
    };

    let body = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
