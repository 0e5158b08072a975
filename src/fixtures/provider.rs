use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::db::models::Fixture;

/// Remote source of a league season's fixture list.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Every fixture of the season, played or not.
    async fn fetch(&self, league: &str, season: u16) -> Result<Vec<Fixture>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Remote source of the provider's own league table, passed through as is.
#[async_trait]
pub trait StandingsSource: Send + Sync {
    async fn fetch_standings(&self, league: &str, season: u16) -> Result<Vec<Value>>;
}
