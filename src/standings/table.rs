use std::collections::HashMap;

use crate::db::models::{Fixture, PredictionBook, TeamTableRow};
use super::outcome::outcome_points;

/// Which points column a table is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsField {
    Actual,
    /// `predicted_points`, or `points` on rows that carry no prediction.
    Predicted,
}

impl PointsField {
    fn value(self, row: &TeamTableRow) -> i64 {
        match self {
            PointsField::Actual => i64::from(row.points),
            PointsField::Predicted => row
                .predicted_points
                .map_or(i64::from(row.points), i64::from),
        }
    }
}

/// League table from finished results up to `cutoff` (every round when `None`).
///
/// Every team named anywhere in `fixtures` gets a row, even with nothing
/// played yet. Rows keep the order in which teams first appear. Fixtures
/// without both team names, or finished without both scores, are ignored.
pub fn compute_actual_table(fixtures: &[Fixture], cutoff: Option<u32>) -> Vec<TeamTableRow> {
    let mut rows: Vec<TeamTableRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for team in fixtures
        .iter()
        .flat_map(|f| [f.home_team(), f.away_team()])
        .flatten()
    {
        if !index.contains_key(team) {
            index.insert(team.to_string(), rows.len());
            rows.push(TeamTableRow::new(team));
        }
    }

    for fx in fixtures {
        if !fx.in_cutoff(cutoff) {
            continue;
        }
        let Some(outcome) = fx.actual_outcome() else {
            continue;
        };
        let (Some(home), Some(away)) = (fx.home_team(), fx.away_team()) else {
            continue;
        };
        let Some((home_goals, away_goals)) = fx.full_time_score() else {
            continue;
        };
        let (Some(&hi), Some(&ai)) = (index.get(home), index.get(away)) else {
            continue;
        };

        let (home_pts, away_pts) = outcome.points();
        credit(&mut rows[hi], home_goals, away_goals, home_pts);
        credit(&mut rows[ai], away_goals, home_goals, away_pts);
    }

    rows
}

fn credit(row: &mut TeamTableRow, scored: u32, conceded: u32, points: u32) {
    row.played += 1;
    row.goals_for += scored;
    row.goals_against += conceded;
    row.goal_diff = row.goals_for as i32 - row.goals_against as i32;
    row.points += points;
    match points {
        3 => row.won += 1,
        1 => row.draw += 1,
        _ => row.lost += 1,
    }
}

/// Per-team points difference between the user's predictions and reality,
/// up to `cutoff`.
///
/// Unplayed fixtures count as zero actual points, so predicting them adds
/// points; a wrong pick on a decided match takes points away. Teams whose
/// fixtures contributed nothing are absent from the map.
pub fn compute_prediction_deltas(
    fixtures: &[Fixture],
    predictions: &PredictionBook,
    cutoff: Option<u32>,
) -> HashMap<String, i32> {
    let mut totals: HashMap<String, i32> = HashMap::new();

    for fx in fixtures {
        if !fx.in_cutoff(cutoff) {
            continue;
        }
        let Some(predicted) = predictions.get(&fx.id).and_then(|p| p.predicted_outcome()) else {
            continue;
        };

        let (pred_home, pred_away) = predicted.points();
        let (actual_home, actual_away) = outcome_points(fx.actual_outcome());
        // A side without a name is skipped; the named side is still credited.
        if let Some(home) = fx.home_team() {
            add_delta(&mut totals, home, pred_home as i32 - actual_home as i32);
        }
        if let Some(away) = fx.away_team() {
            add_delta(&mut totals, away, pred_away as i32 - actual_away as i32);
        }
    }

    totals
}

fn add_delta(totals: &mut HashMap<String, i32>, team: &str, delta: i32) {
    if delta == 0 {
        return;
    }
    *totals.entry(team.to_string()).or_insert(0) += delta;
}

/// Copy of `actual_rows` with `predicted_points` filled in. Only points move;
/// goals and results stay as played.
pub fn build_predicted_table(
    actual_rows: &[TeamTableRow],
    deltas: &HashMap<String, i32>,
) -> Vec<TeamTableRow> {
    actual_rows
        .iter()
        .map(|row| {
            let delta = deltas.get(&row.team).copied().unwrap_or(0);
            TeamTableRow {
                predicted_points: Some(row.points as i32 + delta),
                ..row.clone()
            }
        })
        .collect()
}

/// Sort by points, then goal difference, then goals scored, all descending.
/// Rows level on all three keep their input order.
pub fn rank_table(rows: &[TeamTableRow], field: PointsField) -> Vec<TeamTableRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| {
        field
            .value(b)
            .cmp(&field.value(a))
            .then_with(|| b.goal_diff.cmp(&a.goal_diff))
            .then_with(|| b.goals_for.cmp(&a.goals_for))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{FixtureId, Outcome, Prediction};
    use crate::standings::test_support::{finished, scheduled};

    fn row<'a>(rows: &'a [TeamTableRow], team: &str) -> &'a TeamTableRow {
        rows.iter().find(|r| r.team == team).unwrap()
    }

    fn sample_season() -> Vec<Fixture> {
        vec![
            finished(1, 1, "Arsenal", "Chelsea", 2, 1),
            finished(2, 1, "Liverpool", "Everton", 0, 0),
            finished(3, 2, "Chelsea", "Liverpool", 1, 3),
            finished(4, 2, "Everton", "Arsenal", 2, 2),
            scheduled(5, 3, "Arsenal", "Liverpool"),
            scheduled(6, 3, "Chelsea", "Everton"),
        ]
    }

    #[test]
    fn test_actual_table_counts_results() {
        let rows = compute_actual_table(&sample_season(), None);
        assert_eq!(rows.len(), 4);

        let arsenal = row(&rows, "Arsenal");
        assert_eq!((arsenal.played, arsenal.won, arsenal.draw, arsenal.lost), (2, 1, 1, 0));
        assert_eq!((arsenal.goals_for, arsenal.goals_against, arsenal.goal_diff), (4, 3, 1));
        assert_eq!(arsenal.points, 4);

        let chelsea = row(&rows, "Chelsea");
        assert_eq!((chelsea.played, chelsea.lost, chelsea.points), (2, 2, 0));
        assert_eq!(chelsea.goal_diff, -3);

        let liverpool = row(&rows, "Liverpool");
        assert_eq!(liverpool.points, 4);
        assert!(rows.iter().all(|r| r.predicted_points.is_none()));
    }

    #[test]
    fn test_actual_table_keeps_first_appearance_order() {
        let rows = compute_actual_table(&sample_season(), None);
        let names: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(names, vec!["Arsenal", "Chelsea", "Liverpool", "Everton"]);
    }

    #[test]
    fn test_cutoff_keeps_all_teams() {
        let rows = compute_actual_table(&sample_season(), Some(1));
        assert_eq!(rows.len(), 4);
        assert_eq!(row(&rows, "Arsenal").played, 1);
        assert_eq!(row(&rows, "Everton").points, 1);

        let none_played = compute_actual_table(&sample_season(), Some(0));
        assert_eq!(none_played.len(), 4);
        assert!(none_played.iter().all(|r| r.played == 0 && r.points == 0));
    }

    #[test]
    fn test_cutoff_is_monotonic() {
        let fixtures = sample_season();
        let early = compute_actual_table(&fixtures, Some(1));
        let late = compute_actual_table(&fixtures, Some(2));
        for r in &early {
            let l = row(&late, &r.team);
            assert!(r.played <= l.played);
            assert!(r.points <= l.points);
            assert!(r.goals_for <= l.goals_for);
        }
    }

    #[test]
    fn test_actual_table_is_deterministic() {
        let fixtures = sample_season();
        assert_eq!(
            compute_actual_table(&fixtures, Some(2)),
            compute_actual_table(&fixtures, Some(2))
        );
    }

    #[test]
    fn test_points_per_fixture_are_three_or_two() {
        for fx in sample_season().iter().filter(|f| f.is_finished()) {
            let rows = compute_actual_table(std::slice::from_ref(fx), None);
            let total: u32 = rows.iter().map(|r| r.points).sum();
            if fx.actual_outcome() == Some(Outcome::Draw) {
                assert_eq!(total, 2);
            } else {
                assert_eq!(total, 3);
            }
        }
    }

    #[test]
    fn test_finished_without_score_is_skipped() {
        let mut fx = finished(1, 1, "A", "B", 1, 0);
        fx.score.full_time.away = None;
        let rows = compute_actual_table(&[fx], None);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.played == 0 && r.goals_for == 0));
    }

    #[test]
    fn test_missing_team_name_is_tolerated() {
        let mut broken = finished(1, 1, "A", "B", 3, 0);
        broken.away = None;
        let fixtures = vec![broken, finished(2, 1, "C", "D", 1, 1)];
        let rows = compute_actual_table(&fixtures, None);
        let names: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
        assert_eq!(row(&rows, "A").played, 0);
        assert_eq!(row(&rows, "C").points, 1);
    }

    #[test]
    fn test_delta_credits_named_side_only() {
        let mut half_named = scheduled(1, 1, "A", "B");
        half_named.away = None;
        let mut blank_home = finished(2, 1, "C", "D", 0, 1);
        blank_home.home = Some("  ".to_string());
        let mut book = PredictionBook::new();
        book.insert(FixtureId::from("1"), Prediction::Outcome(Outcome::HomeWin));
        book.insert(FixtureId::from("2"), Prediction::Outcome(Outcome::HomeWin));

        let deltas = compute_prediction_deltas(&[half_named, blank_home], &book, None);
        assert_eq!(deltas.get("A"), Some(&3));
        assert_eq!(deltas.get("D"), Some(&-3));
        assert_eq!(deltas.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_actual_table(&[], None).is_empty());
        assert!(compute_prediction_deltas(&[], &PredictionBook::new(), None).is_empty());
    }

    #[test]
    fn test_delta_for_wrong_draw_pick() {
        let fixtures = vec![finished(1, 1, "Team A", "Team B", 2, 1)];
        let mut book = PredictionBook::new();
        book.insert(FixtureId::from("1"), Prediction::Outcome(Outcome::Draw));
        let deltas = compute_prediction_deltas(&fixtures, &book, None);
        assert_eq!(deltas.get("Team A"), Some(&-2));
        assert_eq!(deltas.get("Team B"), Some(&1));
    }

    #[test]
    fn test_delta_for_unplayed_fixture_from_score_guess() {
        let fixtures = vec![scheduled(7, 3, "A", "B")];
        let mut book = PredictionBook::new();
        book.insert(
            FixtureId::from("7"),
            Prediction::Score {
                home: Some(0),
                away: Some(2),
            },
        );
        let deltas = compute_prediction_deltas(&fixtures, &book, None);
        assert_eq!(deltas.get("B"), Some(&3));
        assert_eq!(deltas.get("A"), None);
    }

    #[test]
    fn test_correct_pick_adds_no_delta() {
        let fixtures = vec![finished(1, 1, "A", "B", 2, 0)];
        let mut book = PredictionBook::new();
        book.insert(FixtureId::from("1"), Prediction::Outcome(Outcome::HomeWin));
        assert!(compute_prediction_deltas(&fixtures, &book, None).is_empty());
    }

    #[test]
    fn test_incomplete_predictions_are_ignored() {
        let fixtures = vec![scheduled(1, 1, "A", "B"), scheduled(2, 1, "C", "D")];
        let mut book = PredictionBook::new();
        book.insert(
            FixtureId::from("1"),
            Prediction::Score {
                home: Some(1),
                away: None,
            },
        );
        book.insert(
            FixtureId::from("2"),
            Prediction::Score {
                home: None,
                away: None,
            },
        );
        book.insert(FixtureId::from("99"), Prediction::Outcome(Outcome::HomeWin));
        assert!(compute_prediction_deltas(&fixtures, &book, None).is_empty());
    }

    #[test]
    fn test_deltas_respect_cutoff_and_accumulate() {
        let fixtures = vec![
            scheduled(1, 1, "A", "B"),
            scheduled(2, 2, "A", "C"),
            scheduled(3, 3, "A", "D"),
        ];
        let mut book = PredictionBook::new();
        for id in ["1", "2", "3"] {
            book.insert(FixtureId::from(id), Prediction::Outcome(Outcome::HomeWin));
        }
        assert_eq!(compute_prediction_deltas(&fixtures, &book, Some(2)).get("A"), Some(&6));
        assert_eq!(compute_prediction_deltas(&fixtures, &book, None).get("A"), Some(&9));
    }

    #[test]
    fn test_predicted_table_only_moves_points() {
        let actual = compute_actual_table(&sample_season(), None);
        let deltas = HashMap::from([("Chelsea".to_string(), 6), ("Arsenal".to_string(), -1)]);
        let predicted = build_predicted_table(&actual, &deltas);
        assert_eq!(predicted.len(), actual.len());
        for (a, p) in actual.iter().zip(&predicted) {
            let expected = a.points as i32 + deltas.get(&a.team).copied().unwrap_or(0);
            assert_eq!(p.predicted_points, Some(expected));
            assert_eq!(
                TeamTableRow {
                    predicted_points: None,
                    ..p.clone()
                },
                *a
            );
        }
    }

    #[test]
    fn test_predicted_points_can_go_negative() {
        let actual = vec![TeamTableRow::new("A")];
        let deltas = HashMap::from([("A".to_string(), -3)]);
        assert_eq!(build_predicted_table(&actual, &deltas)[0].predicted_points, Some(-3));
    }

    #[test]
    fn test_rank_table_tie_breaks() {
        let mut a = TeamTableRow::new("A");
        a.points = 10;
        a.goal_diff = 2;
        a.goals_for = 8;
        let mut b = TeamTableRow::new("B");
        b.points = 10;
        b.goal_diff = 5;
        b.goals_for = 7;
        let mut c = TeamTableRow::new("C");
        c.points = 10;
        c.goal_diff = 2;
        c.goals_for = 9;
        let mut d = TeamTableRow::new("D");
        d.points = 12;

        let ranked = rank_table(&[a, b, c, d], PointsField::Actual);
        let names: Vec<&str> = ranked.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(names, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_rank_table_is_stable_for_full_ties() {
        let rows: Vec<TeamTableRow> = ["X", "Y", "Z"].iter().map(|t| TeamTableRow::new(t)).collect();
        let ranked = rank_table(&rows, PointsField::Actual);
        let names: Vec<&str> = ranked.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);

        let reversed: Vec<TeamTableRow> = rows.iter().rev().cloned().collect();
        let ranked = rank_table(&reversed, PointsField::Actual);
        let names: Vec<&str> = ranked.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(names, vec!["Z", "Y", "X"]);
    }

    #[test]
    fn test_rank_by_predicted_points() {
        let mut a = TeamTableRow::new("A");
        a.points = 10;
        a.predicted_points = Some(10);
        let mut b = TeamTableRow::new("B");
        b.points = 9;
        b.predicted_points = Some(12);
        let by_actual = rank_table(&[a.clone(), b.clone()], PointsField::Actual);
        let by_predicted = rank_table(&[a, b], PointsField::Predicted);
        assert_eq!(by_actual[0].team, "A");
        assert_eq!(by_predicted[0].team, "B");
    }
}
