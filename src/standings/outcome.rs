use crate::db::models::Outcome;

/// Outcome of a scoreline. `None` when either side is unknown.
pub fn resolve_outcome(home: Option<u32>, away: Option<u32>) -> Option<Outcome> {
    let (home, away) = (home?, away?);
    Some(if home > away {
        Outcome::HomeWin
    } else if home < away {
        Outcome::AwayWin
    } else {
        Outcome::Draw
    })
}

impl Outcome {
    /// League points awarded for this result as (home, away), 3/1/0 scoring.
    pub fn points(self) -> (u32, u32) {
        match self {
            Outcome::HomeWin => (3, 0),
            Outcome::Draw => (1, 1),
            Outcome::AwayWin => (0, 3),
        }
    }
}

/// Points for an optional outcome; no result means no points.
pub fn outcome_points(outcome: Option<Outcome>) -> (u32, u32) {
    outcome.map_or((0, 0), Outcome::points)
}
