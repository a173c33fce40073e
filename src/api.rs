use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{RequestBuilder, header::HeaderMap};

use crate::{
    config::{BackendConfig, NetworkConfig},
    error::AvailabilityError,
    model::{Venue, VenueSnapshot},
    traits::VenueSource,
};

/// Read-only client for the hosted backend's REST interface.
#[derive(Clone, Debug)]
pub struct VenueApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VenueApiClient {
    /// Create a new API client with configurable timeouts.
    pub fn new(backend: &BackendConfig, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: backend.url.trim_end_matches('/').to_string(),
            api_key: backend.api_key.clone(),
        })
    }

    /// Build a GET against a REST table. Filter values are passed as
    /// query pairs so reqwest percent-encodes them.
    fn get(&self, table: &str, query: &[(&str, String)]) -> RequestBuilder {
        self.client
            .get(format!("{}/rest/v1/{}", self.base_url, table))
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Fetch a single venue row, including hours, windows and caps.
    pub async fn fetch_venue(&self, venue_id: &str) -> Result<Venue> {
        let response = self
            .get(
                "venues",
                &[("id", format!("eq.{venue_id}")), ("select", "*".into())],
            )
            .send()
            .await
            .context("Failed to send venue request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Venue request returned error status: {}", status);
        }

        let mut rows: Vec<Venue> = response
            .json()
            .await
            .context("Failed to parse venue response")?;

        if rows.is_empty() {
            return Err(AvailabilityError::VenueNotFound(venue_id.to_string()).into());
        }
        Ok(rows.swap_remove(0))
    }

    /// Count redemptions at the venue since local midnight of `today`.
    pub async fn count_redemptions_today(&self, venue_id: &str, today: NaiveDate) -> Result<u32> {
        let response = self
            .get(
                "redemptions",
                &[
                    ("venue_id", format!("eq.{venue_id}")),
                    ("created_at", format!("gte.{today}T00:00:00")),
                    ("select", "id".into()),
                ],
            )
            .header("Prefer", "count=exact")
            .send()
            .await
            .context("Failed to send redemption count request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Redemption count request returned error status: {}", status);
        }

        parse_content_range_total(response.headers())
    }
}

/// Extract the total from a `Content-Range` header such as `0-0/42` or `*/0`.
fn parse_content_range_total(headers: &HeaderMap) -> Result<u32> {
    let raw = headers
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AvailabilityError::MissingCount("no Content-Range header".into()))?;

    let total = raw
        .rsplit_once('/')
        .map(|(_, total)| total)
        .and_then(|total| total.parse::<u32>().ok())
        .ok_or_else(|| AvailabilityError::MissingCount(raw.to_string()))?;

    Ok(total)
}

impl VenueSource for VenueApiClient {
    async fn fetch_snapshot(&self, venue_id: &str, today: NaiveDate) -> Result<VenueSnapshot> {
        let venue = self.fetch_venue(venue_id).await?;
        let redemptions_today = self.count_redemptions_today(venue_id, today).await?;
        tracing::debug!(
            venue_id,
            redemptions_today,
            windows = venue.windows().len(),
            "Fetched venue snapshot"
        );
        Ok(VenueSnapshot {
            venue,
            redemptions_today,
        })
    }
}
