use serde::Serialize;
use std::collections::HashMap;

use crate::db::models::TeamTableRow;

/// A team's 1-based position in the actual and in the predicted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "MovementView")]
pub struct RankMovement {
    pub actual_rank: usize,
    pub predicted_rank: usize,
}

#[derive(Serialize)]
struct MovementView {
    actual_rank: usize,
    predicted_rank: usize,
    movement: i64,
    direction: Direction,
}

impl From<RankMovement> for MovementView {
    fn from(m: RankMovement) -> Self {
        MovementView {
            actual_rank: m.actual_rank,
            predicted_rank: m.predicted_rank,
            movement: m.movement(),
            direction: m.direction(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Same,
}

impl RankMovement {
    /// Places moved; negative means the team climbs in the predicted table.
    pub fn movement(&self) -> i64 {
        self.predicted_rank as i64 - self.actual_rank as i64
    }

    pub fn direction(&self) -> Direction {
        match self.predicted_rank.cmp(&self.actual_rank) {
            std::cmp::Ordering::Less => Direction::Up,
            std::cmp::Ordering::Greater => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Same,
        }
    }
}

/// Pair up each team's position in two independently sorted tables.
/// Teams missing from either table are left out.
pub fn compute_rank_movement(
    actual_ranked: &[TeamTableRow],
    predicted_ranked: &[TeamTableRow],
) -> HashMap<String, RankMovement> {
    let actual: HashMap<&str, usize> = actual_ranked
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.team.as_str(), idx + 1))
        .collect();

    predicted_ranked
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let actual_rank = *actual.get(row.team.as_str())?;
            Some((
                row.team.clone(),
                RankMovement {
                    actual_rank,
                    predicted_rank: idx + 1,
                },
            ))
        })
        .collect()
}

/// Whether a movement column is worth showing: some prediction changed
/// points and at least one team changed place because of it.
pub fn has_meaningful_movement(
    deltas: &HashMap<String, i32>,
    movement: &HashMap<String, RankMovement>,
) -> bool {
    !deltas.is_empty() && movement.values().any(|m| m.actual_rank != m.predicted_rank)
}
