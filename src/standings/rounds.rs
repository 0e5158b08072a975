use std::collections::BTreeSet;

use crate::db::models::Fixture;

/// Distinct matchdays present in the fixture list, ascending.
pub fn list_rounds(fixtures: &[Fixture]) -> Vec<u32> {
    fixtures
        .iter()
        .map(|f| f.round)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The matchday to show when nothing else was chosen, also used by
/// "jump to current round".
///
/// For the latest season of a league this is the next round to be played
/// (the first one before anything is played, the last finished one once the
/// season is over). For older seasons it is the last finished round, or the
/// last round when no result is known.
///
/// `is_latest_season` comes from the league catalog, not the calendar.
pub fn resolve_default_round(
    fixtures: &[Fixture],
    rounds: &[u32],
    is_latest_season: bool,
) -> Option<u32> {
    let (&first, &last) = (rounds.first()?, rounds.last()?);
    let max_finished = fixtures
        .iter()
        .filter(|f| f.is_finished())
        .map(|f| f.round)
        .max();

    if !is_latest_season {
        return Some(max_finished.unwrap_or(last));
    }

    let Some(max_finished) = max_finished else {
        return Some(first);
    };
    match rounds.iter().position(|&r| r == max_finished) {
        Some(idx) if idx + 1 < rounds.len() => Some(rounds[idx + 1]),
        _ => Some(max_finished),
    }
}

/// Keep the requested round while it still exists, otherwise fall back.
pub fn select_round(requested: Option<u32>, rounds: &[u32], fallback: Option<u32>) -> Option<u32> {
    if rounds.is_empty() {
        return None;
    }
    match requested {
        Some(r) if rounds.contains(&r) => Some(r),
        _ => fallback,
    }
}

pub fn fixtures_in_round(fixtures: &[Fixture], round: Option<u32>) -> Vec<Fixture> {
    fixtures
        .iter()
        .filter(|f| round.map_or(true, |r| f.round == r))
        .cloned()
        .collect()
}
