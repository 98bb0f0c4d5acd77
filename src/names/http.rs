//! HTTP names service client.
//!
//! Thin reqwest wrapper around `GET {base_url}/names`, which answers with a
//! JSON array of `{ "name", "id" }` records. Parsing lives in
//! [`parse_roster`] so it can be tested without a server.

use std::time::Duration;

use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use super::{ANONYMOUS_NAME, NameError, NameProvider, NameRecord};
use crate::config::NamesConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpNameProvider {
    http: reqwest::Client,
    roster_url: String,
}

impl HttpNameProvider {
    /// Build a client from a parsed names config.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &NamesConfig) -> Result<Self, NameError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| NameError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, roster_url: roster_url(&config.base_url) })
    }

    /// Fetch the full roster from the names service.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] on transport failure, non-200 status, or a
    /// body that is not a roster.
    pub async fn fetch_roster(&self) -> Result<Vec<NameRecord>, NameError> {
        let response = self
            .http
            .get(&self.roster_url)
            .send()
            .await
            .map_err(|e| NameError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| NameError::Request(e.to_string()))?;

        if status != 200 {
            return Err(NameError::Response { status, body: text });
        }

        let roster = parse_roster(&text)?;
        debug!(count = roster.len(), "names roster fetched");
        Ok(roster)
    }

    /// Fetch the roster, answering with an empty list when the service fails.
    pub async fn list_names(&self) -> Vec<NameRecord> {
        match self.fetch_roster().await {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, "names roster unavailable");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl NameProvider for HttpNameProvider {
    async fn request_name(&self) -> Result<String, NameError> {
        let roster = self.fetch_roster().await?;
        Ok(pick_name(&roster))
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn roster_url(base_url: &str) -> String {
    format!("{}/names", base_url.trim_end_matches('/'))
}

pub(crate) fn parse_roster(json: &str) -> Result<Vec<NameRecord>, NameError> {
    serde_json::from_str(json).map_err(|e| NameError::Parse(e.to_string()))
}

/// Random roster entry, or [`ANONYMOUS_NAME`] when the roster is empty.
pub(crate) fn pick_name(roster: &[NameRecord]) -> String {
    roster
        .choose(&mut rand::rng())
        .map_or_else(|| ANONYMOUS_NAME.to_string(), |record| record.name.clone())
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
