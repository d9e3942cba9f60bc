//! HTTP client with the fixed browser header profile and retry policy.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use clgrab_core::AppConfig;

use crate::error::ScraperError;
use crate::retry::retry_fixed_delay;
use crate::urls::{API_BASE, GEO_BASE};

/// Static browser-like header profile sent with every request. The
/// marketplace serves bot-filtered responses to bare clients; these values
/// are configuration, not something the pipeline's semantics depend on.
const HEADER_PROFILE: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Cache-Control", "max-age=0"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Upgrade-Insecure-Requests", "1"),
    (
        "sec-ch-ua",
        "\"Not?A_Brand\";v=\"8\", \"Chromium\";v=\"108\", \"Google Chrome\";v=\"108\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
];

/// HTTP fetcher for the marketplace API and HTML pages.
///
/// Every fetch runs through the fixed-delay retry wrapper. Non-2xx responses
/// are tolerated whenever the body is still usable (the marketplace is
/// observed to serve real content on redirect statuses) and reported as
/// [`ScraperError::UnexpectedStatus`] only when the body does not parse.
///
/// No caching, no cookies, no state beyond the outbound request.
pub struct ScrapeClient {
    client: Client,
    retry_attempts: u32,
    retry_delay_secs: u64,
    pub(crate) api_base: String,
    pub(crate) geo_base: String,
}

impl ScrapeClient {
    /// Creates a client against the production hosts.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::with_bases(config, API_BASE, GEO_BASE)
    }

    /// Creates a client with overridden API and directory hosts. Used by
    /// tests to point the pipeline at a local server.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_bases(
        config: &AppConfig,
        api_base: &str,
        geo_base: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            retry_attempts: config.retry_attempts,
            retry_delay_secs: config.retry_delay_secs,
            api_base: api_base.trim_end_matches('/').to_owned(),
            geo_base: geo_base.trim_end_matches('/').to_owned(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        for (name, value) in HEADER_PROFILE {
            request = request.header(*name, *value);
        }
        request
    }

    /// Fetches `url` and deserializes the body as JSON, retrying transient
    /// failures on the fixed-delay schedule.
    ///
    /// The body is parsed regardless of status; a failed parse on a non-2xx
    /// response surfaces the status, a failed parse on a 2xx surfaces the
    /// JSON error. `context` names the payload in diagnostics.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`]: network or TLS failure after all attempts.
    /// - [`ScraperError::UnexpectedStatus`]: non-2xx with an unusable body.
    /// - [`ScraperError::Deserialize`]: 2xx body that is not valid JSON.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<T, ScraperError> {
        retry_fixed_delay(self.retry_attempts, self.retry_delay_secs, || async {
            let response = self.get(url).send().await?;
            let status = response.status();
            let body = response.text().await?;

            match serde_json::from_str::<T>(&body) {
                Ok(parsed) => Ok(parsed),
                Err(_) if !status.is_success() => Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                }),
                Err(source) => Err(ScraperError::Deserialize {
                    context: context.to_owned(),
                    source,
                }),
            }
        })
        .await
    }

    /// Fetches `url` and returns the raw HTML body, retrying transient
    /// failures on the fixed-delay schedule.
    ///
    /// A non-2xx response with a non-empty body is accepted; an empty body is
    /// treated as a failed fetch whatever the status.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`]: network or TLS failure after all attempts.
    /// - [`ScraperError::UnexpectedStatus`]: non-2xx with an empty body.
    /// - [`ScraperError::EmptyBody`]: 2xx with an empty body.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        retry_fixed_delay(self.retry_attempts, self.retry_delay_secs, || async {
            let response = self.get(url).send().await?;
            let status = response.status();
            let body = response.text().await?;

            if body.trim().is_empty() {
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }
                return Err(ScraperError::EmptyBody {
                    url: url.to_owned(),
                });
            }
            Ok(body)
        })
        .await
    }
}
