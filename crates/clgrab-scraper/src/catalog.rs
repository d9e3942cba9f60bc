//! Run orchestration: resolvers, decoder, and enricher across one or many
//! locations. A multi-location sweep accumulates listings from every site.

use futures::stream::{self, StreamExt};

use clgrab_core::{AppConfig, Listing, ScrapeSummary};

use crate::category::resolve_category;
use crate::client::ScrapeClient;
use crate::decode::decode_page;
use crate::detail::{self, Detail};
use crate::error::ScraperError;
use crate::location::{area_id_for_site, resolve_all_locations, resolve_location};
use crate::types::{Location, SearchResponse};
use crate::urls;

/// Listings plus the run counters the CLI reports and keys its exit code on.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub listings: Vec<Listing>,
    pub summary: ScrapeSummary,
}

/// Drives the full pipeline for a scrape run.
pub struct Catalog {
    client: ScrapeClient,
    config: AppConfig,
}

impl Catalog {
    /// Creates a catalog against the production hosts.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, ScraperError> {
        let client = ScrapeClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Creates a catalog around an existing client. Tests use this with a
    /// client pointed at a local server.
    #[must_use]
    pub fn with_client(client: ScrapeClient, config: AppConfig) -> Self {
        Self { client, config }
    }

    /// Scrapes `category_name` in one named location, or in every site of
    /// the configured region when `location_name` is `None`.
    ///
    /// Absent locations and unavailable categories are diagnostics plus an
    /// empty outcome, never errors. In the multi-location sweep a hard
    /// failure for one site is logged and counted while the sweep continues;
    /// `summary.is_total_failure()` reports whether every site failed.
    ///
    /// # Errors
    ///
    /// Single-location mode propagates hard fetch/decode failures. The
    /// multi-location sweep fails only when the regional directory itself
    /// cannot be fetched.
    pub async fn scrape(
        &self,
        location_name: Option<&str>,
        category_name: &str,
    ) -> Result<ScrapeOutcome, ScraperError> {
        match location_name {
            Some(name) => self.scrape_named_location(name, category_name).await,
            None => self.scrape_all_locations(category_name).await,
        }
    }

    async fn scrape_named_location(
        &self,
        location_name: &str,
        category_name: &str,
    ) -> Result<ScrapeOutcome, ScraperError> {
        let mut outcome = ScrapeOutcome {
            listings: Vec::new(),
            summary: ScrapeSummary {
                locations_attempted: 1,
                ..ScrapeSummary::default()
            },
        };

        let Some(location) = resolve_location(&self.client, location_name).await? else {
            outcome.summary.locations_succeeded = 1;
            return Ok(outcome);
        };

        let listings = self.scrape_location(&location, category_name, &mut outcome.summary).await?;
        outcome.summary.locations_succeeded = 1;
        outcome.listings = listings;
        Ok(outcome)
    }

    async fn scrape_all_locations(
        &self,
        category_name: &str,
    ) -> Result<ScrapeOutcome, ScraperError> {
        let sites = resolve_all_locations(&self.client, &self.config.region).await?;
        let mut outcome = ScrapeOutcome::default();

        for site in sites {
            outcome.summary.locations_attempted += 1;

            let location = match area_id_for_site(&self.client, &site.url).await {
                Ok(Some(area_id)) => Location {
                    name: site.name.clone(),
                    site_url: site.url.clone(),
                    area_id,
                },
                Ok(None) => {
                    outcome.summary.locations_succeeded += 1;
                    continue;
                }
                Err(err) => {
                    tracing::warn!(site = %site.name, error = %err, "skipping site after fetch failure");
                    continue;
                }
            };

            match self
                .scrape_location(&location, category_name, &mut outcome.summary)
                .await
            {
                Ok(listings) => {
                    outcome.summary.locations_succeeded += 1;
                    outcome.listings.extend(listings);
                }
                Err(err) => {
                    tracing::warn!(site = %location.name, error = %err, "skipping site after pipeline failure");
                }
            }
        }

        Ok(outcome)
    }

    /// Category resolution + search decode + ordered detail enrichment for
    /// one resolved location.
    async fn scrape_location(
        &self,
        location: &Location,
        category_name: &str,
        summary: &mut ScrapeSummary,
    ) -> Result<Vec<Listing>, ScraperError> {
        tracing::info!(location = %location.name, category = category_name, "scraping");

        let Some(token) =
            resolve_category(&self.client, category_name, &location.area_id).await?
        else {
            tracing::info!(
                location = %location.name,
                category = category_name,
                "category not available in this location"
            );
            return Ok(Vec::new());
        };

        let url = urls::search_url(&self.client.api_base, &location.area_id, &token)?;
        let response: SearchResponse = self.client.fetch_json(&url, "search page").await?;
        tracing::info!(
            total = response.data.total_result_count,
            location = %location.name,
            "found results"
        );

        let page = decode_page(&response.data, &token)?;
        summary.items_decoded += page.listings.len();
        summary.items_skipped += page.skipped;

        // Listings are independent once decoded; details fetch with bounded
        // concurrency. `buffered` keeps completion order equal to decode
        // order, which the output must preserve.
        let details: Vec<Detail> = stream::iter(page.listings.iter().map(|listing| {
            let service_url = listing.service_url.clone();
            async move {
                match detail::enrich(&self.client, &service_url).await {
                    Ok(detail) => detail,
                    Err(err) => {
                        tracing::warn!(
                            url = %service_url,
                            error = %err,
                            "detail enrichment failed, keeping listing without description"
                        );
                        Detail::default()
                    }
                }
            }
        }))
        .buffered(self.config.detail_concurrency.max(1))
        .collect()
        .await;

        let listings = page
            .listings
            .into_iter()
            .zip(details)
            .map(|(decoded, detail)| Listing {
                location_name: location.name.clone(),
                category_name: category_name.to_owned(),
                posting_id: decoded.posting_id,
                posted_at: decoded.posted_at,
                service_url: decoded.service_url,
                title: decoded.title,
                phone: detail.phone,
                image_urls: decoded.image_urls,
                description: detail.description,
            })
            .collect();

        Ok(listings)
    }
}
