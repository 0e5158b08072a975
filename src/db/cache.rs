//! Typed, best-effort access to the key-value store.
//!
//! Reads fall back to "nothing cached" and writes are dropped with a warning
//! when the store or the stored JSON is unusable; a broken cache must never
//! take a standings view down with it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use super::models::{Fixture, PredictionBook};
use super::{EntityKind, KeyValueStore, StoreError, StoreKey};

fn read<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &StoreKey) -> Option<T> {
    let value = match store.get(key) {
        Ok(value) => value?,
        Err(e) => {
            warn!("Cache read failed for {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring unreadable cache entry {}: {}", key, e);
            None
        }
    }
}

fn write<T: Serialize>(store: &dyn KeyValueStore, key: &StoreKey, value: &T) {
    let json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(e) => {
            warn!("Cache encode failed for {}: {}", key, e);
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        warn!("Cache write failed for {}: {}", key, e);
    }
}

pub fn cached_fixtures(store: &dyn KeyValueStore, league: &str, season: u16) -> Option<Vec<Fixture>> {
    read(store, &StoreKey::new(EntityKind::Fixtures, league, season))
}

pub fn store_fixtures(store: &dyn KeyValueStore, league: &str, season: u16, fixtures: &[Fixture]) {
    write(store, &StoreKey::new(EntityKind::Fixtures, league, season), &fixtures);
}

/// Whether cached fixtures exist and were written less than `max_age` ago.
pub fn fixtures_are_fresh(store: &dyn KeyValueStore, league: &str, season: u16, max_age: Duration) -> bool {
    let key = StoreKey::new(EntityKind::Fixtures, league, season);
    match store.updated_at(&key) {
        Ok(Some(written)) => {
            let age = (Utc::now() - written).to_std().unwrap_or(Duration::ZERO);
            age < max_age
        }
        Ok(None) => false,
        Err(e) => {
            warn!("Cache timestamp read failed for {}: {}", key, e);
            false
        }
    }
}

pub fn cached_standings(store: &dyn KeyValueStore, league: &str, season: u16) -> Option<Vec<Value>> {
    read(store, &StoreKey::new(EntityKind::Standings, league, season))
}

pub fn store_standings(store: &dyn KeyValueStore, league: &str, season: u16, table: &[Value]) {
    write(store, &StoreKey::new(EntityKind::Standings, league, season), &table);
}

/// The user's predictions for a league season; empty when none are stored.
pub fn fixture_predictions(store: &dyn KeyValueStore, league: &str, season: u16) -> PredictionBook {
    read(store, &StoreKey::new(EntityKind::FixtureSelections, league, season)).unwrap_or_default()
}

/// Strict variant of `fixture_predictions` for read-modify-write: a book that
/// exists but cannot be read is an error, not an empty book.
pub fn try_fixture_predictions(
    store: &dyn KeyValueStore,
    league: &str,
    season: u16,
) -> Result<PredictionBook, StoreError> {
    match store.get(&StoreKey::new(EntityKind::FixtureSelections, league, season))? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(PredictionBook::new()),
    }
}

pub fn try_store_fixture_predictions(
    store: &dyn KeyValueStore,
    league: &str,
    season: u16,
    book: &PredictionBook,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(book)?;
    store.set(&StoreKey::new(EntityKind::FixtureSelections, league, season), &value)
}
