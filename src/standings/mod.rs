//! Prediction-adjusted league tables.
//!
//! Everything in here is a pure function of the fixtures and predictions it
//! is handed: no I/O, no shared state, no failure path. Callers recompute on
//! every change of round, season or prediction.

pub mod movement;
pub mod outcome;
pub mod rounds;
pub mod table;

pub use movement::{compute_rank_movement, has_meaningful_movement, RankMovement};
pub use rounds::{fixtures_in_round, list_rounds, resolve_default_round, select_round};
pub use table::{
    build_predicted_table, compute_actual_table, compute_prediction_deltas, rank_table,
    PointsField,
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::models::{Fixture, PredictionBook, TeamTableRow};

/// Which of the two tables a viewer is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingsMode {
    Actual,
    Predicted,
}

impl StandingsMode {
    /// Predicted as soon as the user has entered anything, actual otherwise.
    pub fn default_for(predictions: &PredictionBook) -> Self {
        if predictions.is_empty() {
            StandingsMode::Actual
        } else {
            StandingsMode::Predicted
        }
    }
}

/// Both rankings of one league season at one cutoff, with movement between them.
#[derive(Debug, Clone, Serialize)]
pub struct Standings {
    pub round: Option<u32>,
    pub actual: Vec<TeamTableRow>,
    pub predicted: Vec<TeamTableRow>,
    pub deltas: HashMap<String, i32>,
    pub movement: HashMap<String, RankMovement>,
    pub show_movement: bool,
}

impl Standings {
    pub fn rows(&self, mode: StandingsMode) -> &[TeamTableRow] {
        match mode {
            StandingsMode::Actual => &self.actual,
            StandingsMode::Predicted => &self.predicted,
        }
    }
}

pub fn compute_standings(
    fixtures: &[Fixture],
    predictions: &PredictionBook,
    cutoff: Option<u32>,
) -> Standings {
    let actual_table = compute_actual_table(fixtures, cutoff);
    let deltas = compute_prediction_deltas(fixtures, predictions, cutoff);
    let predicted_table = build_predicted_table(&actual_table, &deltas);

    // Two independent sorts over the same rows, so positions are comparable.
    let actual = rank_table(&actual_table, PointsField::Actual);
    let predicted = rank_table(&predicted_table, PointsField::Predicted);

    let movement = compute_rank_movement(&actual, &predicted);
    let show_movement = has_meaningful_movement(&deltas, &movement);

    Standings {
        round: cutoff,
        actual,
        predicted,
        deltas,
        movement,
        show_movement,
    }
}
