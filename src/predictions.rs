//! Editing a league season's prediction book.
//!
//! A fixture holds either a 1/X/2 pick or a scoreline guess. Setting one
//! replaces the other, and entries left with nothing in them are dropped.

use serde::{Deserialize, Serialize};

use crate::db::models::{FixtureId, Outcome, Prediction, PredictionBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSide {
    Home,
    Away,
}

/// Pick `outcome` for a fixture. Picking the outcome that is already
/// selected clears it.
pub fn select_outcome(book: &mut PredictionBook, fixture_id: &FixtureId, outcome: Outcome) {
    let already_selected = matches!(
        book.get(fixture_id),
        Some(Prediction::Outcome(current)) if *current == outcome
    );
    if already_selected {
        book.remove(fixture_id);
    } else {
        book.insert(fixture_id.clone(), Prediction::Outcome(outcome));
    }
}

/// Set one side of a scoreline guess. Any 1/X/2 pick on the fixture is dropped.
pub fn set_score_guess(
    book: &mut PredictionBook,
    fixture_id: &FixtureId,
    side: ScoreSide,
    value: Option<u32>,
) {
    let (mut home, mut away) = match book.get(fixture_id) {
        Some(Prediction::Score { home, away }) => (*home, *away),
        _ => (None, None),
    };
    match side {
        ScoreSide::Home => home = value,
        ScoreSide::Away => away = value,
    }

    let next = Prediction::Score { home, away };
    if next.is_empty() {
        book.remove(fixture_id);
    } else {
        book.insert(fixture_id.clone(), next);
    }
}

/// Read a typed score. Blank or non-numeric text means "no score"; a leading
/// `+` is accepted, trailing junk after the digits is ignored and absurdly
/// long numbers saturate instead of being dropped.
pub fn parse_score_input(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: Vec<u32> = unsigned.chars().map_while(|c| c.to_digit(10)).collect();
    if digits.is_empty() {
        return None;
    }
    Some(
        digits
            .into_iter()
            .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d)),
    )
}

pub fn clear(book: &mut PredictionBook) {
    book.clear();
}
