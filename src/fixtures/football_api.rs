use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::provider::{FixtureSource, StandingsSource};
use crate::catalog::find_league;
use crate::db::models::Fixture;

const DEFAULT_PROVIDER: &str = "fd";

/// Fixtures and standings backend (`/api/v1/fixtures`, `/api/v1/standings`).
pub struct FootballApi {
    http: Client,
    /// Base URL, overridable in tests
    base_url: String,
}

impl FootballApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FootballApi {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str, league: &str, season: u16) -> Result<Url> {
        let provider = find_league(league).map_or(DEFAULT_PROVIDER, |l| l.provider);
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("Invalid API base URL {}", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("league", league)
            .append_pair("season", &season.to_string())
            .append_pair("provider", provider);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        debug!("Fetching {}", url);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("Football API request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Football API error: {}", resp.status());
        }

        resp.json()
            .await
            .context("Failed to parse Football API response")
    }
}

#[async_trait]
impl FixtureSource for FootballApi {
    fn name(&self) -> &str {
        "FootballApi"
    }

    async fn fetch(&self, league: &str, season: u16) -> Result<Vec<Fixture>> {
        let url = self.endpoint("/api/v1/fixtures", league, season)?;
        let raw = self.get_json(url).await?;
        Ok(parse_fixtures_response(&raw))
    }
}

#[async_trait]
impl StandingsSource for FootballApi {
    async fn fetch_standings(&self, league: &str, season: u16) -> Result<Vec<Value>> {
        let url = self.endpoint("/api/v1/standings", league, season)?;
        let raw = self.get_json(url).await?;
        Ok(parse_standings_response(&raw))
    }
}

/// `{ "data": { "matches": [...] } }`. Matches that do not parse are dropped.
pub fn parse_fixtures_response(raw: &Value) -> Vec<Fixture> {
    let Some(matches) = raw["data"]["matches"].as_array() else {
        return vec![];
    };

    matches
        .iter()
        .filter_map(|item| match serde_json::from_value::<Fixture>(item.clone()) {
            Ok(fixture) => Some(fixture),
            Err(e) => {
                debug!("Skipping malformed fixture {}: {}", item["id"], e);
                None
            }
        })
        .collect()
}

/// `{ "data": { "table": [...] } }`
pub fn parse_standings_response(raw: &Value) -> Vec<Value> {
    raw["data"]["table"].as_array().cloned().unwrap_or_default()
}
