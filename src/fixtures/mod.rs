pub mod football_api;
pub mod provider;

pub use football_api::FootballApi;
pub use provider::{FixtureSource, StandingsSource};

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::cache;
use crate::db::models::Fixture;
use crate::db::KeyValueStore;

/// A league season kept warm by the background refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTarget {
    pub league: String,
    pub season: u16,
}

/// Fetch a fresh fixture list and cache it. When the source fails, the
/// cached copy is served instead; only a failure with nothing cached is an error.
pub async fn load_fixtures(
    source: &dyn FixtureSource,
    store: &dyn KeyValueStore,
    league: &str,
    season: u16,
) -> Result<Vec<Fixture>> {
    match source.fetch(league, season).await {
        Ok(fresh) => {
            cache::store_fixtures(store, league, season, &fresh);
            Ok(fresh)
        }
        Err(e) => match cache::cached_fixtures(store, league, season) {
            Some(cached) => {
                warn!(
                    "{} fetch failed for {} {}, serving {} cached fixtures: {}",
                    source.name(),
                    league,
                    season,
                    cached.len(),
                    e
                );
                Ok(cached)
            }
            None => Err(e),
        },
    }
}

/// Cached fixtures while they are younger than `max_age`, otherwise a fetch
/// through `load_fixtures` (which still serves the stale copy if the source fails).
pub async fn cached_or_load_fixtures(
    source: &dyn FixtureSource,
    store: &dyn KeyValueStore,
    league: &str,
    season: u16,
    max_age: Duration,
) -> Result<Vec<Fixture>> {
    if cache::fixtures_are_fresh(store, league, season, max_age) {
        if let Some(cached) = cache::cached_fixtures(store, league, season) {
            return Ok(cached);
        }
    }
    load_fixtures(source, store, league, season).await
}

/// The provider's own table, with the same cache fallback as fixtures.
pub async fn load_official_standings(
    source: &dyn StandingsSource,
    store: &dyn KeyValueStore,
    league: &str,
    season: u16,
) -> Result<Vec<Value>> {
    match source.fetch_standings(league, season).await {
        Ok(table) => {
            cache::store_standings(store, league, season, &table);
            Ok(table)
        }
        Err(e) => match cache::cached_standings(store, league, season) {
            Some(cached) => {
                warn!("Standings fetch failed for {} {}, serving cache: {}", league, season, e);
                Ok(cached)
            }
            None => Err(e),
        },
    }
}

/// Spawns a background task that refreshes the cached fixtures of every
/// target at the configured interval. All targets are fetched concurrently;
/// a failing target is logged and retried on the next tick.
pub fn start_fixture_refresh(
    source: Arc<dyn FixtureSource>,
    store: Arc<dyn KeyValueStore>,
    targets: Vec<RefreshTarget>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Fixture refresh started ({} targets via {}, interval={:?})",
            targets.len(),
            source.name(),
            interval
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let refreshes: Vec<_> = targets
                .iter()
                .map(|t| {
                    let source = Arc::clone(&source);
                    let store = Arc::clone(&store);
                    async move {
                        let res = source.fetch(&t.league, t.season).await;
                        if let Ok(fixtures) = &res {
                            cache::store_fixtures(store.as_ref(), &t.league, t.season, fixtures);
                        }
                        (t, res)
                    }
                })
                .collect();

            for (target, result) in futures_util::future::join_all(refreshes).await {
                match result {
                    Ok(fixtures) => info!(
                        "Refreshed {} fixtures for {} {}",
                        fixtures.len(),
                        target.league,
                        target.season
                    ),
                    Err(e) => warn!(
                        "Fixture refresh failed for {} {}: {}",
                        target.league, target.season, e
                    ),
                }
            }
        }
    })
}
